//! Drivable car on a textured map with day/night lighting, fog and an
//! animated Bezier flag.
//!
//! The simulation side (`car`, `camera`, `lighting`, `surface`, `state`) is
//! plain data and math; `renderer` and `pipelines` put it on screen with wgpu.

pub mod camera;
pub mod car;
pub mod cli;
pub mod config;
pub mod core;
pub mod lighting;
pub mod loaders;
pub mod math;
pub mod mesh;
pub mod overlay;
pub mod pipelines;
pub mod renderer;
pub mod state;
pub mod surface;
pub mod types;

pub use camera::{ActiveCamera, Camera, CameraRig};
pub use car::Car;
pub use config::SceneConfig;
pub use lighting::{compose, TimeOfDay, UniformSink};
pub use state::SceneState;
pub use surface::ControlGrid;
