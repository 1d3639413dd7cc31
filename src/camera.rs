use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::car::Car;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 100.0;

/// Car camera mount point in the car's local frame
pub const CAR_CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 2.0, -4.0);

pub const FREE_CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, -21.0);
pub const FIXED_CAMERA_START: Vec3 = Vec3::new(17.5, 3.5, -22.5);
pub const FIXED_CAMERA_YAW: f32 = 150.0;
pub const FIXED_CAMERA_PITCH: f32 = -45.0;

/// Free-fly movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Euler-angle camera. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    zoom: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_angles(position, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }

    pub fn with_angles(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn process_keyboard(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.speed * delta_time;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Mouse look. `y_offset` is positive when the mouse moves up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch = (self.pitch + y_offset * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Which of the three viewpoints is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveCamera {
    Free,
    #[default]
    Car,
    Fixed,
}

impl ActiveCamera {
    pub fn label(self) -> &'static str {
        match self {
            ActiveCamera::Free => "Free",
            ActiveCamera::Car => "Car",
            ActiveCamera::Fixed => "Fixed",
        }
    }
}

/// The three scene cameras plus the active selection
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub free: Camera,
    pub car: Camera,
    pub fixed: Camera,
    active: ActiveCamera,
}

impl CameraRig {
    pub fn new(car: &Car) -> Self {
        Self {
            free: Camera::new(FREE_CAMERA_START),
            car: Camera::new(car.position),
            fixed: Camera::with_angles(FIXED_CAMERA_START, Vec3::Y, FIXED_CAMERA_YAW, FIXED_CAMERA_PITCH),
            active: ActiveCamera::default(),
        }
    }

    pub fn select(&mut self, camera: ActiveCamera) {
        self.active = camera;
    }

    pub fn selection(&self) -> ActiveCamera {
        self.active
    }

    pub fn active(&self) -> &Camera {
        match self.active {
            ActiveCamera::Free => &self.free,
            ActiveCamera::Car => &self.car,
            ActiveCamera::Fixed => &self.fixed,
        }
    }

    pub fn active_mut(&mut self) -> &mut Camera {
        match self.active {
            ActiveCamera::Free => &mut self.free,
            ActiveCamera::Car => &mut self.car,
            ActiveCamera::Fixed => &mut self.fixed,
        }
    }

    /// Re-derive the car camera from the car transform. Called once per frame;
    /// the car camera keeps no parent link between frames.
    pub fn follow_car(&mut self, car: &Car, car_scale: f32) {
        self.car.position = car.local_to_world(CAR_CAMERA_OFFSET, car_scale);
        self.car.set_yaw(-(car.yaw() - 90f32.to_radians()).to_degrees());
    }
}
