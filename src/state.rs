//! Scene state owned by the application.
//!
//! Everything the input handler mutates and the renderer reads lives in one
//! [`SceneState`]. Input is polled once per frame through the
//! [`Controller`] trait; each held key maps to exactly one mutation scaled by
//! the frame delta.

use crate::camera::{ActiveCamera, CameraRig, Movement};
use crate::car::Car;
use crate::config::{ControlsConfig, SceneConfig};
use crate::core::{Button, Controller, FrameInfo};
use crate::lighting::{self, FrameLighting, TimeOfDay};
use crate::overlay::OverlaySnapshot;
use crate::surface::{ControlGrid, GridSpacing};

pub const DEFAULT_FOG_INTENSITY: f32 = 1.0;

/// Keys in the order they are polled each frame. When two held keys conflict
/// the later one wins, and driving happens before turning.
pub const KEY_POLL_ORDER: [Button; 23] = [
    Button::KeyW,
    Button::KeyS,
    Button::KeyA,
    Button::KeyD,
    Button::KeyN,
    Button::KeyM,
    Button::ArrowUp,
    Button::ArrowDown,
    Button::ArrowLeft,
    Button::ArrowRight,
    Button::KeyO,
    Button::KeyL,
    Button::Digit1,
    Button::Digit2,
    Button::Digit3,
    Button::KeyP,
    Button::Semicolon,
    Button::KeyI,
    Button::KeyK,
    Button::KeyU,
    Button::KeyJ,
    Button::KeyY,
    Button::KeyH,
];

/// Specular model used by every lit shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingModel {
    #[default]
    Phong,
    Blinn,
}

impl ShadingModel {
    pub fn label(self) -> &'static str {
        match self {
            ShadingModel::Phong => "Phong",
            ShadingModel::Blinn => "Blinn",
        }
    }

    pub fn is_blinn(self) -> bool {
        self == ShadingModel::Blinn
    }
}

/// What the input pass asks of the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Exit,
}

#[derive(Debug, Clone)]
pub struct SceneState {
    pub car: Car,
    pub cameras: CameraRig,
    pub time_of_day: TimeOfDay,
    fog_intensity: f32,
    pub shading: ShadingModel,
    pub show_overlay: bool,
    pub controls: ControlsConfig,
    pub car_scale: f32,
    pub spacing: GridSpacing,
    /// Seconds since start, as of the last `update`
    time: f32,
}

impl SceneState {
    pub fn new(config: &SceneConfig) -> Self {
        let car = Car::new(config.car.start_position);
        let cameras = CameraRig::new(&car);

        let mut state = Self {
            car,
            cameras,
            time_of_day: TimeOfDay::default(),
            fog_intensity: DEFAULT_FOG_INTENSITY,
            shading: ShadingModel::default(),
            show_overlay: config.show_overlay,
            controls: config.controls.clone(),
            car_scale: config.car.model_scale,
            spacing: config.surface.spacing,
            time: 0.0,
        };
        state.cameras.follow_car(&state.car, state.car_scale);
        state
    }

    pub fn fog_intensity(&self) -> f32 {
        self.fog_intensity
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Clamped at zero from below
    pub fn adjust_fog(&mut self, delta: f32) {
        self.fog_intensity = (self.fog_intensity + delta).max(0.0);
    }

    /// Apply every held key in [`KEY_POLL_ORDER`], then pointer motion and
    /// wheel, to the scene
    pub fn apply_input(&mut self, controller: &dyn Controller, dt: f32) -> InputOutcome {
        if controller.is_down(Button::Escape) {
            return InputOutcome::Exit;
        }

        let controls = self.controls.clone();

        for button in KEY_POLL_ORDER {
            if !controller.is_down(button) {
                continue;
            }
            match button {
                Button::KeyW => self.cameras.free.process_keyboard(Movement::Forward, dt),
                Button::KeyS => self.cameras.free.process_keyboard(Movement::Backward, dt),
                Button::KeyA => self.cameras.free.process_keyboard(Movement::Left, dt),
                Button::KeyD => self.cameras.free.process_keyboard(Movement::Right, dt),

                Button::KeyN => self.time_of_day = TimeOfDay::Night,
                Button::KeyM => self.time_of_day = TimeOfDay::Day,

                Button::ArrowUp => self.car.drive(dt * controls.car_speed),
                Button::ArrowDown => self.car.drive(-dt * controls.car_speed),
                Button::ArrowLeft => self.car.rotate(dt * controls.car_turn_rate),
                Button::ArrowRight => self.car.rotate(-dt * controls.car_turn_rate),
                Button::KeyO => self.car.raise(dt * controls.car_lift_rate),
                Button::KeyL => self.car.raise(-dt * controls.car_lift_rate),

                Button::Digit1 => self.cameras.select(ActiveCamera::Free),
                Button::Digit2 => self.cameras.select(ActiveCamera::Car),
                Button::Digit3 => self.cameras.select(ActiveCamera::Fixed),

                Button::KeyP => self.car.aim_spotlight(-dt * controls.spotlight_aim_rate),
                Button::Semicolon => self.car.aim_spotlight(dt * controls.spotlight_aim_rate),

                Button::KeyI => self.adjust_fog(dt * controls.fog_rate),
                Button::KeyK => self.adjust_fog(-dt * controls.fog_rate),

                Button::KeyU => self.shading = ShadingModel::Blinn,
                Button::KeyJ => self.shading = ShadingModel::Phong,

                Button::KeyY => self.show_overlay = true,
                Button::KeyH => self.show_overlay = false,

                Button::Escape => {}
            }
        }

        // Screen y grows downwards, camera pitch grows upwards
        let (dx, dy) = controller.mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            self.cameras.active_mut().process_mouse_movement(dx, -dy);
        }

        let scroll = controller.scroll_delta();
        if scroll != 0.0 {
            self.cameras.active_mut().process_mouse_scroll(scroll);
        }

        InputOutcome::Continue
    }

    /// Advance simulation time and re-derive the car camera
    pub fn update(&mut self, frame: &FrameInfo) {
        self.time = frame.time;
        self.cameras.follow_car(&self.car, self.car_scale);
    }

    pub fn lighting(&self) -> FrameLighting {
        lighting::compose(&self.car, self.car_scale, self.time_of_day)
    }

    pub fn control_grid(&self) -> ControlGrid {
        ControlGrid::generate(self.time, self.spacing)
    }

    pub fn overlay_snapshot(&self, fps: f32) -> OverlaySnapshot {
        OverlaySnapshot {
            fps,
            camera: self.cameras.selection(),
            camera_position: self.cameras.active().position,
            car_position: self.car.position,
            car_heading_deg: self.car.yaw().to_degrees(),
            spotlight_pitch_deg: (-self.car.spotlight_pitch()).to_degrees(),
            shading: self.shading,
            time_of_day: self.time_of_day,
            fog_intensity: self.fog_intensity,
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeldKeys {
        keys: Vec<Button>,
        mouse: (f32, f32),
        scroll: f32,
    }

    impl HeldKeys {
        fn new(keys: &[Button]) -> Self {
            Self {
                keys: keys.to_vec(),
                mouse: (0.0, 0.0),
                scroll: 0.0,
            }
        }
    }

    impl Controller for HeldKeys {
        fn is_down(&self, button: Button) -> bool {
            self.keys.contains(&button)
        }

        fn get_down_keys(&self) -> &[Button] {
            &self.keys
        }

        fn mouse_delta(&self) -> (f32, f32) {
            self.mouse
        }

        fn scroll_delta(&self) -> f32 {
            self.scroll
        }
    }

    #[test]
    fn test_initial_state() {
        let state = SceneState::default();
        assert_eq!(state.time_of_day, TimeOfDay::Day);
        assert_eq!(state.shading, ShadingModel::Phong);
        assert_eq!(state.fog_intensity(), DEFAULT_FOG_INTENSITY);
        assert!(state.show_overlay);
        assert_eq!(state.cameras.selection(), ActiveCamera::Car);
    }

    #[test]
    fn test_escape_exits_without_other_mutations() {
        let mut state = SceneState::default();
        let before = state.car;
        let outcome = state.apply_input(&HeldKeys::new(&[Button::Escape, Button::ArrowUp]), 1.0);
        assert_eq!(outcome, InputOutcome::Exit);
        assert_eq!(state.car, before);
    }

    #[test]
    fn test_conflicting_keys_resolve_by_poll_order() {
        let mut state = SceneState::default();
        state.apply_input(&HeldKeys::new(&[Button::KeyM, Button::KeyN]), 0.016);
        assert_eq!(state.time_of_day, TimeOfDay::Day);

        state.apply_input(&HeldKeys::new(&[Button::Digit3, Button::Digit1, Button::Digit2]), 0.016);
        assert_eq!(state.cameras.selection(), ActiveCamera::Fixed);

        state.apply_input(&HeldKeys::new(&[Button::KeyJ, Button::KeyU]), 0.016);
        assert_eq!(state.shading, ShadingModel::Phong);

        state.apply_input(&HeldKeys::new(&[Button::KeyH, Button::KeyY]), 0.016);
        assert!(!state.show_overlay);
    }

    #[test]
    fn test_drive_happens_before_turn() {
        let mut state = SceneState::default();
        let start = state.car.position;
        let forward = state.car.forward();
        state.apply_input(&HeldKeys::new(&[Button::ArrowLeft, Button::ArrowUp]), 0.5);

        let expected = start + forward * 0.5 * state.controls.car_speed;
        assert!((state.car.position - expected).length() < 1e-4);
        assert!((state.car.yaw() - 0.5 * state.controls.car_turn_rate).abs() < 1e-4);
    }

    #[test]
    fn test_poll_order_covers_every_key_but_escape() {
        for button in KEY_POLL_ORDER {
            assert_ne!(button, Button::Escape);
        }
        let unique: std::collections::HashSet<Button> = KEY_POLL_ORDER.into_iter().collect();
        assert_eq!(unique.len(), KEY_POLL_ORDER.len());
    }

    #[test]
    fn test_mouse_goes_to_active_camera_only() {
        let mut state = SceneState::default();
        state.cameras.select(ActiveCamera::Free);
        let fixed_yaw = state.cameras.fixed.yaw();

        let mut input = HeldKeys::new(&[]);
        input.mouse = (10.0, -20.0);
        state.apply_input(&input, 0.016);

        assert!((state.cameras.free.yaw() - (-89.0)).abs() < 1e-4);
        assert!((state.cameras.free.pitch() - 2.0).abs() < 1e-4);
        assert_eq!(state.cameras.fixed.yaw(), fixed_yaw);
    }

    #[test]
    fn test_scroll_zooms_active_camera() {
        let mut state = SceneState::default();
        let mut input = HeldKeys::new(&[]);
        input.scroll = 5.0;
        state.apply_input(&input, 0.016);
        assert_eq!(state.cameras.car.zoom(), 40.0);
        assert_eq!(state.cameras.free.zoom(), 45.0);
    }

    #[test]
    fn test_update_tracks_time_and_car_camera() {
        let mut state = SceneState::default();
        state.car.drive(3.0);
        state.update(&FrameInfo::new(5, 2.5, 0.016));

        assert_eq!(state.time(), 2.5);
        let expected = state.car.local_to_world(crate::camera::CAR_CAMERA_OFFSET, state.car_scale);
        assert!((state.cameras.car.position - expected).length() < 1e-5);
    }

    #[test]
    fn test_overlay_snapshot_negates_pitch() {
        let mut state = SceneState::default();
        state.car.aim_spotlight(0.5);
        let snapshot = state.overlay_snapshot(60.0);
        assert!((snapshot.spotlight_pitch_deg - (-0.5f32).to_degrees()).abs() < 1e-4);
        assert_eq!(snapshot.camera_position, state.cameras.car.position);
    }
}
