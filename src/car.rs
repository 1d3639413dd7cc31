use glam::{Mat4, Vec3};
use std::f32::consts::TAU;

/// Spotlight pitch limit in degrees, applied to the stored pitch
pub const SPOTLIGHT_PITCH_LIMIT_DEG: f32 = 89.0;

/// Where the car spawns
pub const CAR_START_POSITION: Vec3 = Vec3::new(16.0, 0.0, -21.0);

/// Default scale applied to the car model
pub const CAR_MODEL_SCALE: f32 = 0.5;

/// Car kinematic state: ground position, heading and headlight pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Car {
    pub position: Vec3,
    /// Heading about +Y in radians, always in [0, 2π)
    yaw: f32,
    /// Headlight pitch in radians, positive aims down
    spotlight_pitch: f32,
}

impl Car {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            spotlight_pitch: 0.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn spotlight_pitch(&self) -> f32 {
        self.spotlight_pitch
    }

    /// Turn by `angle` radians, wrapping the heading into [0, 2π)
    pub fn rotate(&mut self, angle: f32) {
        self.yaw = wrap_angle(self.yaw + angle);
    }

    /// Move along the current heading on the XZ plane
    pub fn drive(&mut self, distance: f32) {
        self.position.x += distance * self.yaw.sin();
        self.position.z += distance * self.yaw.cos();
    }

    /// Move straight up or down
    pub fn raise(&mut self, distance: f32) {
        self.position.y += distance;
    }

    /// Tilt the headlights, clamping the accumulated pitch to ±89°
    pub fn aim_spotlight(&mut self, delta: f32) {
        let limit = SPOTLIGHT_PITCH_LIMIT_DEG.to_radians();
        self.spotlight_pitch = (self.spotlight_pitch + delta).clamp(-limit, limit);
    }

    /// World transform of the car body: translate, turn, scale
    pub fn model_matrix(&self, scale: f32) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_scale(Vec3::splat(scale))
    }

    /// Transform a point given in the car's local frame into world space
    pub fn local_to_world(&self, local: Vec3, scale: f32) -> Vec3 {
        self.model_matrix(scale).transform_point3(local)
    }

    /// Unit vector along the car's heading
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Headlight beam direction: heading first, then pitch, applied to +Z
    pub fn spotlight_direction(&self) -> Vec3 {
        let rotation = Mat4::from_rotation_y(self.yaw) * Mat4::from_rotation_x(self.spotlight_pitch);
        rotation.transform_vector3(Vec3::Z)
    }
}

impl Default for Car {
    fn default() -> Self {
        Self::new(CAR_START_POSITION)
    }
}

/// Euclidean wrap into [0, 2π). `rem_euclid` can round up to exactly 2π for
/// tiny negative inputs, which is folded back to 0.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
