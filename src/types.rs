use glam::{Mat4, Vec3};

use crate::lighting::{UniformSink, UniformValue, POINT_LIGHT_COUNT, SHININESS, SPOT_LIGHT_COUNT};
use crate::surface::{ControlGrid, CONTROL_POINT_COUNT, DEGREE};

/// Directional light as laid out in the uniform block
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLightRaw {
    pub direction: [f32; 3],
    pub _pad0: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub diffuse: [f32; 3],
    pub _pad2: f32,
    pub specular: [f32; 3],
    pub _pad3: f32,
}

/// Point light; attenuation terms fill the vec3 padding slots
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 3],
    pub constant: f32,
    pub ambient: [f32; 3],
    pub linear: f32,
    pub diffuse: [f32; 3],
    pub quadratic: f32,
    pub specular: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    pub position: [f32; 3],
    pub constant: f32,
    pub direction: [f32; 3],
    pub linear: f32,
    pub ambient: [f32; 3],
    pub quadratic: f32,
    pub diffuse: [f32; 3],
    pub cut_off: f32,
    pub specular: [f32; 3],
    pub outer_cut_off: f32,
}

/// Camera, fog, shading switch and every light: group 0 of the lit pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub shininess: f32,
    pub fog_color: [f32; 3],
    pub fog_intensity: f32,
    pub blinn: u32,
    pub _pad: [u32; 3],
    pub dir_light: DirLightRaw,
    pub point_lights: [PointLightRaw; POINT_LIGHT_COUNT],
    pub spot_lights: [SpotLightRaw; SPOT_LIGHT_COUNT],
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0; 3],
            shininess: SHININESS,
            fog_color: [0.0; 3],
            fog_intensity: 0.0,
            blinn: 0,
            _pad: [0; 3],
            dir_light: DirLightRaw::default(),
            point_lights: [PointLightRaw::default(); POINT_LIGHT_COUNT],
            spot_lights: [SpotLightRaw::default(); SPOT_LIGHT_COUNT],
        }
    }
}

/// Control points and material of the Bezier patch: group 1 of the surface pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniforms {
    pub model: [[f32; 4]; 4],
    /// xyz used, w is padding
    pub control_points: [[f32; 4]; CONTROL_POINT_COUNT],
    /// xy used
    pub tex_coords: [[f32; 4]; CONTROL_POINT_COUNT],
    pub u_degree: i32,
    pub v_degree: i32,
    pub _pad0: [i32; 2],
    pub material_diffuse: [f32; 3],
    pub _pad1: f32,
    pub material_specular: [f32; 3],
    pub _pad2: f32,
}

impl Default for SurfaceUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            control_points: [[0.0; 4]; CONTROL_POINT_COUNT],
            tex_coords: [[0.0; 4]; CONTROL_POINT_COUNT],
            u_degree: DEGREE as i32,
            v_degree: DEGREE as i32,
            _pad0: [0; 2],
            material_diffuse: [0.0; 3],
            _pad1: 0.0,
            material_specular: [0.0; 3],
            _pad2: 0.0,
        }
    }
}

impl SurfaceUniforms {
    /// Copy the whole grid in row-major order
    pub fn set_control_grid(&mut self, grid: &ControlGrid) {
        for (k, point) in grid.iter().enumerate() {
            self.control_points[k] = point.position.extend(1.0).to_array();
            self.tex_coords[k] = [point.tex_coords.x, point.tex_coords.y, 0.0, 0.0];
        }
    }
}

/// `pointLights[1].linear` -> ("pointLights", Some(1), Some("linear"))
pub fn split_uniform_name(name: &str) -> Option<(&str, Option<usize>, Option<&str>)> {
    let (head, field) = match name.split_once('.') {
        Some((head, field)) => (head, Some(field)),
        None => (name, None),
    };

    match head.split_once('[') {
        Some((base, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            Some((base, Some(index), field))
        }
        None => Some((head, None, field)),
    }
}

fn vec3(value: UniformValue) -> Option<[f32; 3]> {
    match value {
        UniformValue::Vec3(v) => Some(v.to_array()),
        _ => None,
    }
}

fn float(value: UniformValue) -> Option<f32> {
    match value {
        UniformValue::Float(f) => Some(f),
        _ => None,
    }
}

/// Store `value` in `slot` if it has the expected type
fn store<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

impl DirLightRaw {
    fn set_field(&mut self, field: &str, value: UniformValue) -> bool {
        match field {
            "direction" => store(&mut self.direction, vec3(value)),
            "ambient" => store(&mut self.ambient, vec3(value)),
            "diffuse" => store(&mut self.diffuse, vec3(value)),
            "specular" => store(&mut self.specular, vec3(value)),
            _ => false,
        }
    }
}

impl PointLightRaw {
    fn set_field(&mut self, field: &str, value: UniformValue) -> bool {
        match field {
            "position" => store(&mut self.position, vec3(value)),
            "ambient" => store(&mut self.ambient, vec3(value)),
            "diffuse" => store(&mut self.diffuse, vec3(value)),
            "specular" => store(&mut self.specular, vec3(value)),
            "constant" => store(&mut self.constant, float(value)),
            "linear" => store(&mut self.linear, float(value)),
            "quadratic" => store(&mut self.quadratic, float(value)),
            _ => false,
        }
    }
}

impl SpotLightRaw {
    fn set_field(&mut self, field: &str, value: UniformValue) -> bool {
        match field {
            "position" => store(&mut self.position, vec3(value)),
            "direction" => store(&mut self.direction, vec3(value)),
            "ambient" => store(&mut self.ambient, vec3(value)),
            "diffuse" => store(&mut self.diffuse, vec3(value)),
            "specular" => store(&mut self.specular, vec3(value)),
            "constant" => store(&mut self.constant, float(value)),
            "linear" => store(&mut self.linear, float(value)),
            "quadratic" => store(&mut self.quadratic, float(value)),
            "cutOff" => store(&mut self.cut_off, float(value)),
            "outerCutOff" => store(&mut self.outer_cut_off, float(value)),
            _ => false,
        }
    }
}

impl SceneUniforms {
    fn write(&mut self, name: &str, value: UniformValue) -> bool {
        let Some((base, index, field)) = split_uniform_name(name) else {
            return false;
        };

        match (base, index, field) {
            ("projection", None, None) => store(&mut self.projection, mat4(value)),
            ("view", None, None) => store(&mut self.view, mat4(value)),
            ("viewPos", None, None) => store(&mut self.view_pos, vec3(value)),
            ("shininess", None, None) => store(&mut self.shininess, float(value)),
            ("fogColor", None, None) => store(&mut self.fog_color, vec3(value)),
            ("fogIntensity", None, None) => store(&mut self.fog_intensity, float(value)),
            ("blinn", None, None) => match value {
                UniformValue::Bool(b) => store(&mut self.blinn, Some(b as u32)),
                _ => false,
            },
            ("dirLight", None, Some(field)) => self.dir_light.set_field(field, value),
            ("pointLights", Some(i), Some(field)) => self
                .point_lights
                .get_mut(i)
                .is_some_and(|light| light.set_field(field, value)),
            ("spotLights", Some(i), Some(field)) => self
                .spot_lights
                .get_mut(i)
                .is_some_and(|light| light.set_field(field, value)),
            _ => false,
        }
    }
}

fn mat4(value: UniformValue) -> Option<[[f32; 4]; 4]> {
    match value {
        UniformValue::Mat4(m) => Some(m.to_cols_array_2d()),
        _ => None,
    }
}

impl UniformSink for SceneUniforms {
    fn set(&mut self, name: &str, value: UniformValue) {
        if !self.write(name, value) {
            log::trace!("Scene uniforms: ignoring {} = {:?}", name, value);
        }
    }
}

impl UniformSink for SurfaceUniforms {
    fn set(&mut self, name: &str, value: UniformValue) {
        let written = match (name, value) {
            ("model", UniformValue::Mat4(m)) => store(&mut self.model, Some(m.to_cols_array_2d())),
            ("uDegree", UniformValue::Int(d)) => store(&mut self.u_degree, Some(d)),
            ("vDegree", UniformValue::Int(d)) => store(&mut self.v_degree, Some(d)),
            ("material_diffuse", UniformValue::Vec3(v)) => store(&mut self.material_diffuse, Some(v.to_array())),
            ("material_specular", UniformValue::Vec3(v)) => store(&mut self.material_specular, Some(v.to_array())),
            _ => false,
        };
        if !written {
            log::trace!("Surface uniforms: ignoring {} = {:?}", name, value);
        }
    }
}

/// Material color of the flag patch
pub const SURFACE_MATERIAL: Vec3 = Vec3::splat(0.5);
