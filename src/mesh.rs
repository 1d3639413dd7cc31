//! Vertex layouts, per-object instances and the built-in cube.

use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;

/// Describes how a Pod vertex struct maps onto shader locations
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// One (u, v) lattice point of the tessellated flag
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceVertex {
    pub uv: [f32; 2],
}

impl Vertex for SurfaceVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SurfaceVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-object transform as stored in the instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    /// Normal matrix is the inverse transpose of the model's upper 3x3
    pub fn from_model(model: Mat4) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

impl Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        // mat4 takes four vec4 slots, mat3 three vec3 slots
        const ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4,
            9 => Float32x3,
            10 => Float32x3,
            11 => Float32x3,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Container cube positions
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(15.0, 3.0, -19.0),
    Vec3::new(12.0, 5.0, -8.0),
    Vec3::new(9.0, -2.2, -6.0),
    Vec3::new(2.0, 0.0, -24.0),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

pub const CUBE_TILT_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);
pub const CUBE_TILT_STEP_DEG: f32 = 20.0;
pub const LAMP_SCALE: f32 = 0.2;

/// Cube `i` sits at its position, tilted 20·i degrees about a fixed axis
pub fn cube_transforms() -> Vec<Mat4> {
    CUBE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let angle = (CUBE_TILT_STEP_DEG * i as f32).to_radians();
            Mat4::from_translation(position)
                * Mat4::from_axis_angle(CUBE_TILT_AXIS.normalize(), angle)
        })
        .collect()
}

pub fn lamp_transforms(positions: &[Vec3]) -> Vec<Mat4> {
    positions
        .iter()
        .map(|&p| Mat4::from_translation(p) * Mat4::from_scale(Vec3::splat(LAMP_SCALE)))
        .collect()
}

/// Unit cube centred on the origin, 6 faces x 2 triangles, non-indexed.
/// Texture v runs top to bottom.
pub fn cube_vertices() -> Vec<ModelVertex> {
    // (normal, tangent u, tangent v); u x v == normal
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    ];
    const CORNERS: [(f32, f32); 6] = [
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (0.0, 0.0),
    ];

    FACES
        .iter()
        .flat_map(|&(normal, u, v)| {
            CORNERS.iter().map(move |&(s, t)| {
                let position = normal * 0.5 + u * (s - 0.5) + v * (t - 0.5);
                ModelVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    tex_coords: [s, 1.0 - t],
                }
            })
        })
        .collect()
}

/// Geometry uploaded to the GPU; `index_buffer` is absent for plain triangle lists
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub element_count: u32,
    pub material: usize,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        vertices: &[ModelVertex],
        indices: Option<&[u32]>,
        material: usize,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = indices.map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Index Buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let element_count = indices.map_or(vertices.len(), |i| i.len()) as u32;

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            element_count,
            material,
        }
    }

    /// Record a draw of `instances` copies; instance buffer must be bound in slot 1
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: std::ops::Range<u32>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.element_count, 0, instances);
            }
            None => pass.draw(0..self.element_count, instances),
        }
    }
}

/// Instance buffer holding a fixed list of transforms
pub struct InstanceBuffer {
    pub buffer: wgpu::Buffer,
    pub count: u32,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, label: &str, models: &[Mat4]) -> Self {
        let raw: Vec<InstanceRaw> = models.iter().map(|&m| InstanceRaw::from_model(m)).collect();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            count: raw.len() as u32,
        }
    }

    /// Overwrite the first instance; used for objects that move every frame
    pub fn update(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[InstanceRaw::from_model(model)]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_36_unit_vertices() {
        let vertices = cube_vertices();
        assert_eq!(vertices.len(), 36);
        for v in &vertices {
            assert!(v.position.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
            assert!((Vec3::from_array(v.normal).length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_faces_wind_counter_clockwise_from_outside() {
        let vertices = cube_vertices();
        for tri in vertices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| Vec3::from_array(v.position));
            let face_normal = (b - a).cross(c - a).normalize();
            assert!((face_normal - Vec3::from_array(tri[0].normal)).length() < 1e-5);
        }
    }

    #[test]
    fn test_instance_normal_matrix_undoes_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let raw = InstanceRaw::from_model(model);
        assert_eq!(raw.normal[0][0], 0.5);
        assert_eq!(raw.model[0][0], 2.0);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 100);
    }

    #[test]
    fn test_cube_transforms_follow_positions() {
        let transforms = cube_transforms();
        assert_eq!(transforms.len(), CUBE_POSITIONS.len());
        assert_eq!(transforms[0], Mat4::from_translation(CUBE_POSITIONS[0]));
        assert_eq!(transforms[3].w_axis.truncate(), CUBE_POSITIONS[3]);
    }

    #[test]
    fn test_lamps_are_scaled_down() {
        let lamps = lamp_transforms(&[Vec3::ONE]);
        assert!((lamps[0].transform_point3(Vec3::X) - Vec3::new(1.2, 1.0, 1.0)).length() < 1e-6);
    }
}
