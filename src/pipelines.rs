//! Render pipelines and their bind group layouts.
//!
//! Group 0 is always the scene block (camera, fog, lights). Group 1 is the
//! material textures for the lit pipeline and the control grid for the surface.

use crate::loaders::texture::GpuTexture;
use crate::mesh::{InstanceRaw, ModelVertex, SurfaceVertex, Vertex};

pub struct Pipelines {
    pub scene_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
    pub surface_layout: wgpu::BindGroupLayout,
    /// Textured Phong/Blinn objects: cubes, map, car
    pub lit: wgpu::RenderPipeline,
    /// Unlit white lamp cubes
    pub lamp: wgpu::RenderPipeline,
    /// Bezier patch evaluated in the vertex stage
    pub surface: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let scene_layout = uniform_layout(device, "scene_bind_group_layout");
        let surface_layout = uniform_layout(device, "surface_bind_group_layout");
        let material_layout = material_layout(device);

        let lit = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lit Pipeline Layout"),
                bind_group_layouts: &[&scene_layout, &material_layout],
                push_constant_ranges: &[],
            });
            mk_render_pipeline(
                device,
                "Lit Pipeline",
                &layout,
                color_format,
                &[ModelVertex::desc(), InstanceRaw::desc()],
                scene_shader("Lighting Shader", include_str!("lighting.wgsl")),
            )
        };

        let lamp = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lamp Pipeline Layout"),
                bind_group_layouts: &[&scene_layout],
                push_constant_ranges: &[],
            });
            mk_render_pipeline(
                device,
                "Lamp Pipeline",
                &layout,
                color_format,
                &[ModelVertex::desc(), InstanceRaw::desc()],
                scene_shader("Light Cube Shader", include_str!("light_cube.wgsl")),
            )
        };

        let surface = {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Surface Pipeline Layout"),
                bind_group_layouts: &[&scene_layout, &surface_layout],
                push_constant_ranges: &[],
            });
            mk_render_pipeline(
                device,
                "Surface Pipeline",
                &layout,
                color_format,
                &[SurfaceVertex::desc()],
                scene_shader("Bezier Surface Shader", include_str!("bezier_surface.wgsl")),
            )
        };

        Self {
            scene_layout,
            material_layout,
            surface_layout,
            lit,
            lamp,
            surface,
        }
    }

    pub fn uniform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    pub fn material_bind_group(
        &self,
        device: &wgpu::Device,
        diffuse: &GpuTexture,
        specular: &GpuTexture,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&specular.sampler),
                },
            ],
        })
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };
    let sampler = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material_bind_group_layout"),
        entries: &[texture(0), sampler(1), texture(2), sampler(3)],
    })
}

/// Prefixes a shader body with the shared scene block from `scene.wgsl`.
fn scene_shader<'a>(label: &'a str, body: &str) -> wgpu::ShaderModuleDescriptor<'a> {
    let source = format!("{}\n{}", include_str!("scene.wgsl"), body);
    wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }
}

/// Depth-tested triangle list pipeline with `vs_main`/`fs_main` entry points.
/// Culling is off: imported models and the flag are seen from both sides.
fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: GpuTexture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
