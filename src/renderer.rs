use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::SceneConfig;
use crate::lighting::{LightSet, UniformSink, CAR_POINT_DIFFUSE, POINT_LIGHT_POSITIONS, SHININESS};
use crate::loaders::texture::GpuTexture;
use crate::loaders::{self, load_image_or_fallback, ImageData, ModelData, TextureSource};
use crate::math::{clear_color, surface_color};
use crate::mesh::{cube_transforms, cube_vertices, lamp_transforms, GpuMesh, InstanceBuffer, SurfaceVertex};
use crate::overlay;
use crate::pipelines::Pipelines;
use crate::state::SceneState;
use crate::surface::{flag_matrix, TessellationMesh, DEGREE};
use crate::types::{SceneUniforms, SurfaceUniforms, SURFACE_MATERIAL};

/// Imported model ready to draw with the lit pipeline
struct SceneModel {
    meshes: Vec<GpuMesh>,
    /// One per material in the source model, indexed by `GpuMesh::material`
    materials: Vec<wgpu::BindGroup>,
    instances: InstanceBuffer,
}

impl SceneModel {
    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
        name: &str,
        data: &ModelData,
        model: Mat4,
        srgb: bool,
    ) -> Self {
        let materials = data
            .materials
            .iter()
            .map(|material| {
                let texture = |source: &Option<TextureSource>, kind: &str| {
                    let image = source
                        .as_ref()
                        .map_or_else(ImageData::fallback, TextureSource::resolve);
                    let label = format!("{name}/{} {kind}", material.name);
                    GpuTexture::from_image(device, queue, &image, &label, srgb)
                };
                let diffuse = texture(&material.diffuse, "diffuse");
                let specular = texture(&material.specular, "specular");
                pipelines.material_bind_group(
                    device,
                    &diffuse,
                    &specular,
                    &format!("{name}/{} Material", material.name),
                )
            })
            .collect::<Vec<_>>();

        let meshes = data
            .meshes
            .iter()
            .map(|mesh| {
                GpuMesh::new(
                    device,
                    &mesh.name,
                    &mesh.vertices,
                    Some(mesh.indices.as_slice()),
                    mesh.material.min(materials.len().saturating_sub(1)),
                )
            })
            .collect();

        let instances = InstanceBuffer::new(device, &format!("{name} Instance Buffer"), &[model]);

        Self {
            meshes,
            materials,
            instances,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(1, self.instances.buffer.slice(..));
        for mesh in &self.meshes {
            if let Some(material) = self.materials.get(mesh.material) {
                pass.set_bind_group(1, material, &[]);
                mesh.draw(pass, 0..self.instances.count);
            }
        }
    }
}

/// Bezier flag: parameter lattice plus the uniform block carrying the control grid
struct FlagSurface {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FlagSurface {
    fn new(device: &wgpu::Device, pipelines: &Pipelines, level: u32) -> Self {
        let lattice = TessellationMesh::new(level);
        let vertices: Vec<SurfaceVertex> = lattice
            .vertices
            .iter()
            .map(|&uv| SurfaceVertex { uv })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Flag Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Flag Index Buffer"),
            contents: bytemuck::cast_slice(&lattice.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Flag Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SurfaceUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = Pipelines::uniform_bind_group(
            device,
            &pipelines.surface_layout,
            &uniform_buffer,
            "flag_bind_group",
        );

        log::debug!(
            "Flag lattice: level {}, {} vertices, {} triangles",
            lattice.level,
            vertices.len(),
            lattice.indices.len() / 3
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: lattice.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }
}

/// Scene block buffer with its group 0 bind group
struct SceneBlock {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SceneBlock {
    fn new(device: &wgpu::Device, pipelines: &Pipelines, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[SceneUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group =
            Pipelines::uniform_bind_group(device, &pipelines.scene_layout, &buffer, label);
        Self { buffer, bind_group }
    }
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth: GpuTexture,
    pipelines: Pipelines,
    /// Lights as seen by everything except the car
    world: SceneBlock,
    /// Same lights with dimmed point diffuse, used only for the car
    car_block: SceneBlock,
    cube_mesh: GpuMesh,
    cube_material: wgpu::BindGroup,
    cube_instances: InstanceBuffer,
    lamp_instances: InstanceBuffer,
    map: Option<SceneModel>,
    car: Option<SceneModel>,
    flag: FlagSurface,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &SceneConfig) -> Result<Self> {
        let inner = window.inner_size();
        let size = winit::dpi::PhysicalSize::new(inner.width.max(1), inner.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create window surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size, config.window.vsync)?;
        surface.configure(&device, &surface_config);
        let srgb = surface_config.format.is_srgb();
        log::info!(
            "Surface: {:?}, {:?}, {}x{}",
            surface_config.format,
            surface_config.present_mode,
            size.width,
            size.height
        );

        let depth = GpuTexture::create_depth(&device, size.width, size.height);
        let pipelines = Pipelines::new(&device, surface_config.format);

        let world = SceneBlock::new(&device, &pipelines, "World Scene Uniforms");
        let car_block = SceneBlock::new(&device, &pipelines, "Car Scene Uniforms");

        let cube_mesh = GpuMesh::new(&device, "Cube", &cube_vertices(), None, 0);
        let cube_material = {
            let assets = &config.assets;
            let diffuse = load_image_or_fallback(assets.resolve(&assets.cube_diffuse));
            let specular = load_image_or_fallback(assets.resolve(&assets.cube_specular));
            let diffuse = GpuTexture::from_image(&device, &queue, &diffuse, "Cube Diffuse", srgb);
            let specular = GpuTexture::from_image(&device, &queue, &specular, "Cube Specular", srgb);
            pipelines.material_bind_group(&device, &diffuse, &specular, "Cube Material")
        };
        let cube_instances = InstanceBuffer::new(&device, "Cube Instance Buffer", &cube_transforms());
        let lamp_instances = InstanceBuffer::new(
            &device,
            "Lamp Instance Buffer",
            &lamp_transforms(&POINT_LIGHT_POSITIONS),
        );

        let map_matrix = Mat4::from_scale(Vec3::splat(config.map.scale))
            * Mat4::from_rotation_x(config.map.rotation_x_deg.to_radians());
        let map = Self::load_scene_model(
            &device,
            &queue,
            &pipelines,
            "Map",
            &config.assets.resolve(&config.assets.map_model),
            map_matrix,
            srgb,
        );
        let car = Self::load_scene_model(
            &device,
            &queue,
            &pipelines,
            "Car",
            &config.assets.resolve(&config.assets.car_model),
            Mat4::IDENTITY,
            srgb,
        );

        let flag = FlagSurface::new(&device, &pipelines, config.surface.tessellation_level);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        log::info!(
            "Renderer initialized: map {}, car {}",
            if map.is_some() { "loaded" } else { "missing" },
            if car.is_some() { "loaded" } else { "missing" }
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            size,
            depth,
            pipelines,
            world,
            car_block,
            cube_mesh,
            cube_material,
            cube_instances,
            lamp_instances,
            map,
            car,
            flag,
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find appropriate adapter: {e}"))
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    /// Prefers a non-sRGB format: scene colors are authored for a framebuffer
    /// that stores what the shader writes
    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
        vsync: bool,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let first = *surface_caps
            .formats
            .first()
            .ok_or_else(|| anyhow!("Surface is incompatible with the adapter"))?;
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(first);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    /// A model that fails to load is logged and left out of the scene
    fn load_scene_model(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
        name: &str,
        path: &std::path::Path,
        model: Mat4,
        srgb: bool,
    ) -> Option<SceneModel> {
        match loaders::load_model(path) {
            Ok(data) => Some(SceneModel::upload(device, queue, pipelines, name, &data, model, srgb)),
            Err(e) => {
                log::error!("Failed to load {} model: {:#}", name, e);
                None
            }
        }
    }

    fn is_srgb(&self) -> bool {
        self.surface_config.format.is_srgb()
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth = GpuTexture::create_depth(&self.device, new_size.width, new_size.height);
    }

    /// Reconfigure with the current size, after the surface was lost or outdated
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    /// Everything in the scene block except the lights
    fn write_frame_uniforms<S: UniformSink + ?Sized>(
        &self,
        sink: &mut S,
        state: &SceneState,
        lights: &LightSet,
        fog_color: Vec3,
    ) {
        let camera = state.cameras.active();
        let aspect = self.size.width as f32 / self.size.height.max(1) as f32;

        sink.set_mat4("projection", camera.projection_matrix(aspect));
        sink.set_mat4("view", camera.view_matrix());
        sink.set_vec3("viewPos", camera.position);
        sink.set_f32("shininess", SHININESS);
        sink.set_bool("blinn", state.shading.is_blinn());
        sink.set_f32("fogIntensity", state.fog_intensity());
        sink.set_vec3("fogColor", surface_color(fog_color, self.is_srgb()));
        lights.apply(sink);
    }

    /// Write this frame's uniform blocks and the car transform; returns the sky color
    fn upload_uniforms(&self, state: &SceneState) -> Vec3 {
        let lighting = state.lighting();

        let mut world = SceneUniforms::default();
        self.write_frame_uniforms(&mut world, state, &lighting.lights, lighting.fog_color);
        self.queue
            .write_buffer(&self.world.buffer, 0, bytemuck::cast_slice(&[world]));

        let car_lights = lighting.lights.with_point_diffuse(CAR_POINT_DIFFUSE);
        let mut car = SceneUniforms::default();
        self.write_frame_uniforms(&mut car, state, &car_lights, lighting.fog_color);
        self.queue
            .write_buffer(&self.car_block.buffer, 0, bytemuck::cast_slice(&[car]));

        let mut flag = SurfaceUniforms::default();
        flag.set_control_grid(&state.control_grid());
        flag.set_mat4("model", flag_matrix());
        flag.set_i32("uDegree", DEGREE as i32);
        flag.set_i32("vDegree", DEGREE as i32);
        flag.set_vec3("material_diffuse", SURFACE_MATERIAL);
        flag.set_vec3("material_specular", SURFACE_MATERIAL);
        self.queue
            .write_buffer(&self.flag.uniform_buffer, 0, bytemuck::cast_slice(&[flag]));

        if let Some(car) = &self.car {
            car.instances
                .update(&self.queue, state.car.model_matrix(state.car_scale));
        }

        surface_color(lighting.sky_color, self.is_srgb())
    }

    pub fn render(
        &mut self,
        state: &SceneState,
        window: &Window,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let sky = self.upload_uniforms(state);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(sky)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipelines.lit);
            render_pass.set_bind_group(0, &self.world.bind_group, &[]);
            render_pass.set_bind_group(1, &self.cube_material, &[]);
            render_pass.set_vertex_buffer(1, self.cube_instances.buffer.slice(..));
            self.cube_mesh.draw(&mut render_pass, 0..self.cube_instances.count);

            render_pass.set_pipeline(&self.pipelines.lamp);
            render_pass.set_bind_group(0, &self.world.bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.lamp_instances.buffer.slice(..));
            self.cube_mesh.draw(&mut render_pass, 0..self.lamp_instances.count);

            render_pass.set_pipeline(&self.pipelines.lit);
            if let Some(map) = &self.map {
                render_pass.set_bind_group(0, &self.world.bind_group, &[]);
                map.draw(&mut render_pass);
            }
            if let Some(car) = &self.car {
                render_pass.set_bind_group(0, &self.car_block.bind_group, &[]);
                car.draw(&mut render_pass);
            }

            render_pass.set_pipeline(&self.pipelines.surface);
            render_pass.set_bind_group(0, &self.world.bind_group, &[]);
            render_pass.set_bind_group(1, &self.flag.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.flag.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.flag.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.flag.index_count, 0, 0..1);
        }

        let raw_input = self.egui_state.take_egui_input(window);
        let snapshot = state.overlay_snapshot(fps);
        let show_overlay = state.show_overlay;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_overlay {
                overlay::show(ctx, &snapshot);
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Returns true when the overlay consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }
}
