use anyhow::{Context, Result};
use std::path::Path;

/// Decoded RGBA8 image, row-major from the top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ImageData {
    /// 1x1 opaque black: samples like an unbound texture
    pub fn fallback() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
        }
    }

    pub fn from_dynamic(image: image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            data: rgba.into_raw(),
        }
    }

    /// Expand tightly packed 1, 2 or 3 channel pixels to RGBA
    pub fn from_channels(width: u32, height: u32, channels: usize, pixels: &[u8]) -> Option<Self> {
        let data = match channels {
            4 => pixels.to_vec(),
            3 => pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            // two-channel data is usually packed normals or metal/rough, keep R and G
            2 => pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[1], 0, 255])
                .collect(),
            1 => pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
            _ => return None,
        };

        if data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }

        Some(Self {
            width,
            height,
            data,
        })
    }
}

pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData> {
    let path = path.as_ref();
    let image = image::open(path).with_context(|| format!("Failed to decode image: {:?}", path))?;
    Ok(ImageData::from_dynamic(image))
}

/// Texture loads never abort the scene; failures render black
pub fn load_image_or_fallback(path: impl AsRef<Path>) -> ImageData {
    let path = path.as_ref();
    match load_image(path) {
        Ok(image) => {
            log::debug!("Loaded texture {:?} ({}x{})", path, image.width, image.height);
            image
        }
        Err(e) => {
            log::warn!("Texture failed to load at path: {} ({:#})", path.display(), e);
            ImageData::fallback()
        }
    }
}

/// Sampled GPU texture
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// `srgb` selects an sRGB-decoding format, used when the render target encodes sRGB
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        label: &str,
        srgb: bool,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &image.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Depth attachment sized to the surface
    pub fn create_depth(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}
