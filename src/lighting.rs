//! Per-frame light composition.
//!
//! Every light is a plain record that knows how to write itself into a
//! [`UniformSink`] under the names the lighting shaders use
//! (`dirLight.*`, `pointLights[i].*`, `spotLights[i].*`). Lights are rebuilt
//! from car and time-of-day state every frame; nothing here is persistent.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::car::Car;

pub const POINT_LIGHT_COUNT: usize = 2;
pub const SPOT_LIGHT_COUNT: usize = 2;

pub const POINT_LIGHT_POSITIONS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(16.0, 3.0, -19.0),
    Vec3::new(5.0, 0.5, -25.0),
];

/// Headlight mounts in the car's local frame
pub const HEADLIGHT_OFFSETS: [Vec3; SPOT_LIGHT_COUNT] = [
    Vec3::new(0.8, 0.8, 1.0),
    Vec3::new(-0.8, 0.8, 1.0),
];

pub const SUN_DIRECTION: Vec3 = Vec3::new(-1.0, -1.0, -1.0);
pub const SHININESS: f32 = 32.0;

/// Point light diffuse used when lighting the car body
pub const CAR_POINT_DIFFUSE: Vec3 = Vec3::splat(0.5);

const HEADLIGHT_INNER_DEG: f32 = 12.5;
const HEADLIGHT_OUTER_DEG: f32 = 15.0;

/// A value written through a [`UniformSink`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// Destination for named uniform writes
pub trait UniformSink {
    fn set(&mut self, name: &str, value: UniformValue);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set(name, UniformValue::Bool(value));
    }

    fn set_i32(&mut self, name: &str, value: i32) {
        self.set(name, UniformValue::Int(value));
    }

    fn set_f32(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set(name, UniformValue::Vec3(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set(name, UniformValue::Mat4(value));
    }
}

/// Sink that keeps every write, keyed by name
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    values: BTreeMap<String, UniformValue>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl UniformSink for RecordingSink {
    fn set(&mut self, name: &str, value: UniformValue) {
        self.values.insert(name.to_string(), value);
    }
}

/// Ambient/diffuse/specular triple shared by all light kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightColor {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

/// Constant/linear/quadratic distance falloff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// Roughly a 50 unit range
    pub const STANDARD: Attenuation = Attenuation {
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
    };

    fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        sink.set_f32(&format!("{prefix}.constant"), self.constant);
        sink.set_f32(&format!("{prefix}.linear"), self.linear);
        sink.set_f32(&format!("{prefix}.quadratic"), self.quadratic);
    }
}

impl LightColor {
    fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, prefix: &str) {
        sink.set_vec3(&format!("{prefix}.ambient"), self.ambient);
        sink.set_vec3(&format!("{prefix}.diffuse"), self.diffuse);
        sink.set_vec3(&format!("{prefix}.specular"), self.specular);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: LightColor,
}

impl DirectionalLight {
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        sink.set_vec3("dirLight.direction", self.direction);
        self.color.apply(sink, "dirLight");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub attenuation: Attenuation,
    pub color: LightColor,
}

impl PointLight {
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, index: usize) {
        let prefix = format!("pointLights[{index}]");
        sink.set_vec3(&format!("{prefix}.position"), self.position);
        self.attenuation.apply(sink, &prefix);
        self.color.apply(sink, &prefix);
    }
}

/// Cone light. Cutoffs are stored as cosines of the half-angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spotlight {
    pub position: Vec3,
    pub direction: Vec3,
    pub cut_off: f32,
    pub outer_cut_off: f32,
    pub attenuation: Attenuation,
    pub color: LightColor,
}

impl Spotlight {
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S, index: usize) {
        let prefix = format!("spotLights[{index}]");
        sink.set_vec3(&format!("{prefix}.position"), self.position);
        sink.set_vec3(&format!("{prefix}.direction"), self.direction);
        sink.set_f32(&format!("{prefix}.cutOff"), self.cut_off);
        sink.set_f32(&format!("{prefix}.outerCutOff"), self.outer_cut_off);
        self.attenuation.apply(sink, &prefix);
        self.color.apply(sink, &prefix);
    }
}

/// Two-valued day/night switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    #[default]
    Day,
    Night,
}

/// Everything the time of day selects at once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOfDayPreset {
    pub sun: DirectionalLight,
    pub sky_color: Vec3,
    pub fog_color: Vec3,
}

impl TimeOfDay {
    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Night => "Night",
        }
    }

    pub fn preset(self) -> TimeOfDayPreset {
        match self {
            TimeOfDay::Day => TimeOfDayPreset {
                sun: DirectionalLight {
                    direction: SUN_DIRECTION,
                    color: LightColor {
                        ambient: Vec3::new(0.5, 0.4, 0.3),
                        diffuse: Vec3::new(0.5, 0.4, 0.3),
                        specular: Vec3::new(1.0, 0.8, 0.6),
                    },
                },
                // html skyblue
                sky_color: Vec3::new(135.0, 206.0, 235.0) / 255.0,
                fog_color: Vec3::splat(0.5),
            },
            TimeOfDay::Night => TimeOfDayPreset {
                sun: DirectionalLight {
                    direction: SUN_DIRECTION,
                    color: LightColor {
                        ambient: Vec3::new(0.03, 0.04, 0.05),
                        diffuse: Vec3::new(0.03, 0.04, 0.05),
                        specular: Vec3::new(0.06, 0.08, 0.1),
                    },
                },
                sky_color: Vec3::splat(0.1),
                fog_color: Vec3::splat(0.1),
            },
        }
    }
}

/// Complete set of lights for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSet {
    pub sun: DirectionalLight,
    pub point_lights: [PointLight; POINT_LIGHT_COUNT],
    pub spotlights: [Spotlight; SPOT_LIGHT_COUNT],
}

impl LightSet {
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        self.sun.apply(sink);
        for (i, light) in self.point_lights.iter().enumerate() {
            light.apply(sink, i);
        }
        for (i, light) in self.spotlights.iter().enumerate() {
            light.apply(sink, i);
        }
    }

    /// Same set with every point light's diffuse replaced
    pub fn with_point_diffuse(mut self, diffuse: Vec3) -> Self {
        for light in &mut self.point_lights {
            light.color.diffuse = diffuse;
        }
        self
    }
}

/// Output of one composition pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLighting {
    pub lights: LightSet,
    pub sky_color: Vec3,
    pub fog_color: Vec3,
}

pub fn static_point_lights() -> [PointLight; POINT_LIGHT_COUNT] {
    POINT_LIGHT_POSITIONS.map(|position| PointLight {
        position,
        attenuation: Attenuation::STANDARD,
        color: LightColor {
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
        },
    })
}

/// Both headlights; only position differs between them
pub fn headlights(car: &Car, car_scale: f32) -> [Spotlight; SPOT_LIGHT_COUNT] {
    let direction = car.spotlight_direction();
    HEADLIGHT_OFFSETS.map(|offset| Spotlight {
        position: car.local_to_world(offset, car_scale),
        direction,
        cut_off: HEADLIGHT_INNER_DEG.to_radians().cos(),
        outer_cut_off: HEADLIGHT_OUTER_DEG.to_radians().cos(),
        attenuation: Attenuation::STANDARD,
        color: LightColor {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
        },
    })
}

/// Build this frame's lights, sky and fog colors from scratch
pub fn compose(car: &Car, car_scale: f32, time_of_day: TimeOfDay) -> FrameLighting {
    let preset = time_of_day.preset();
    FrameLighting {
        lights: LightSet {
            sun: preset.sun,
            point_lights: static_point_lights(),
            spotlights: headlights(car, car_scale),
        },
        sky_color: preset.sky_color,
        fog_color: preset.fog_color,
    }
}
