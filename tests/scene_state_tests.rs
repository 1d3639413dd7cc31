use car_scene::camera::ActiveCamera;
use car_scene::core::{Button, Controller, FrameInfo, WinitController};
use car_scene::lighting::TimeOfDay;
use car_scene::state::{InputOutcome, SceneState, ShadingModel, DEFAULT_FOG_INTENSITY};
use car_scene::SceneConfig;
use glam::Vec3;

const EPS: f32 = 1e-4;

fn held(buttons: &[Button]) -> WinitController {
    let mut controller = WinitController::new();
    for &button in buttons {
        controller.press(button);
    }
    controller
}

fn step(state: &mut SceneState, controller: &dyn Controller, dt: f32) -> InputOutcome {
    state.apply_input(controller, dt)
}

#[cfg(test)]
mod key_binding_tests {
    use super::*;

    #[test]
    fn test_arrow_up_drives_at_configured_speed() {
        let mut state = SceneState::default();
        let start = state.car.position;
        step(&mut state, &held(&[Button::ArrowUp]), 0.5);

        let speed = state.controls.car_speed;
        assert!((state.car.position - (start + Vec3::Z * speed * 0.5)).length() < EPS);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut state = SceneState::default();
        let start = state.car;
        step(&mut state, &held(&[Button::ArrowUp, Button::ArrowDown]), 0.25);
        step(&mut state, &held(&[Button::ArrowLeft, Button::ArrowRight]), 0.25);
        step(&mut state, &held(&[Button::KeyO, Button::KeyL]), 0.25);

        assert!((state.car.position - start.position).length() < EPS);
        // heading may land on either side of the 0/2π seam
        assert!((state.car.yaw() - start.yaw()).sin().abs() < EPS);
    }

    #[test]
    fn test_press_order_does_not_pick_the_winner() {
        for keys in [[Button::KeyM, Button::KeyN], [Button::KeyN, Button::KeyM]] {
            let mut state = SceneState::default();
            state.time_of_day = TimeOfDay::Night;
            step(&mut state, &held(&keys), 0.016);
            assert_eq!(state.time_of_day, TimeOfDay::Day, "pressed {:?}", keys);
        }
    }

    #[test]
    fn test_left_turns_counter_clockwise() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::ArrowLeft]), 0.1);
        let rate = state.controls.car_turn_rate;
        assert!((state.car.yaw() - 0.1 * rate).abs() < EPS);
    }

    #[test]
    fn test_lift_keys() {
        let mut state = SceneState::default();
        let y = state.car.position.y;
        step(&mut state, &held(&[Button::KeyO]), 1.0);
        assert!((state.car.position.y - (y + state.controls.car_lift_rate)).abs() < EPS);
    }

    #[test]
    fn test_spotlight_keys() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::Semicolon]), 1.0);
        assert!(state.car.spotlight_pitch() > 0.0);
        step(&mut state, &held(&[Button::KeyP]), 2.0);
        assert!(state.car.spotlight_pitch() < 0.0);
    }

    #[test]
    fn test_time_of_day_keys() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::KeyN]), 0.016);
        assert_eq!(state.time_of_day, TimeOfDay::Night);
        step(&mut state, &held(&[Button::KeyM]), 0.016);
        assert_eq!(state.time_of_day, TimeOfDay::Day);
    }

    #[test]
    fn test_shading_keys() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::KeyU]), 0.016);
        assert_eq!(state.shading, ShadingModel::Blinn);
        step(&mut state, &held(&[Button::KeyJ]), 0.016);
        assert_eq!(state.shading, ShadingModel::Phong);
    }

    #[test]
    fn test_overlay_keys() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::KeyH]), 0.016);
        assert!(!state.show_overlay);
        step(&mut state, &held(&[Button::KeyY]), 0.016);
        assert!(state.show_overlay);
    }

    #[test]
    fn test_camera_selection_keys() {
        let mut state = SceneState::default();
        for (button, camera) in [
            (Button::Digit1, ActiveCamera::Free),
            (Button::Digit3, ActiveCamera::Fixed),
            (Button::Digit2, ActiveCamera::Car),
        ] {
            step(&mut state, &held(&[button]), 0.016);
            assert_eq!(state.cameras.selection(), camera);
        }
    }

    #[test]
    fn test_wasd_moves_free_camera_even_when_not_active() {
        let mut state = SceneState::default();
        assert_eq!(state.cameras.selection(), ActiveCamera::Car);
        let start = state.cameras.free.position;
        step(&mut state, &held(&[Button::KeyW]), 1.0);
        assert_ne!(state.cameras.free.position, start);
    }

    #[test]
    fn test_escape_requests_exit() {
        let mut state = SceneState::default();
        assert_eq!(step(&mut state, &held(&[Button::Escape]), 0.016), InputOutcome::Exit);
        assert_eq!(step(&mut state, &held(&[]), 0.016), InputOutcome::Continue);
    }

    #[test]
    fn test_released_key_stops_acting() {
        let mut state = SceneState::default();
        let mut controller = held(&[Button::ArrowUp]);
        controller.release(Button::ArrowUp);
        let start = state.car.position;
        step(&mut state, &controller, 1.0);
        assert_eq!(state.car.position, start);
    }
}

#[cfg(test)]
mod fog_tests {
    use super::*;

    #[test]
    fn test_fog_rises_and_falls() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::KeyI]), 1.0);
        let rate = state.controls.fog_rate;
        assert!((state.fog_intensity() - (DEFAULT_FOG_INTENSITY + rate)).abs() < EPS);
    }

    #[test]
    fn test_fog_never_goes_negative() {
        let mut state = SceneState::default();
        for _ in 0..100 {
            step(&mut state, &held(&[Button::KeyK]), 1.0);
        }
        assert_eq!(state.fog_intensity(), 0.0);

        step(&mut state, &held(&[Button::KeyI]), 1.0);
        assert!(state.fog_intensity() > 0.0);
    }
}

#[cfg(test)]
mod frame_update_tests {
    use super::*;

    #[test]
    fn test_car_camera_tracks_car_after_update() {
        let mut state = SceneState::default();
        step(&mut state, &held(&[Button::ArrowUp, Button::ArrowLeft]), 0.5);
        state.update(&FrameInfo::new(1, 0.5, 0.5));

        let expected = state.car.local_to_world(car_scene::camera::CAR_CAMERA_OFFSET, state.car_scale);
        assert!((state.cameras.car.position - expected).length() < EPS);
        assert_eq!(state.time(), 0.5);
    }

    #[test]
    fn test_control_grid_follows_time() {
        let mut state = SceneState::default();
        let before = state.control_grid();
        state.update(&FrameInfo::new(1, 1.0, 1.0));
        assert_ne!(state.control_grid(), before);
    }

    #[test]
    fn test_lighting_follows_time_of_day() {
        let mut state = SceneState::new(&SceneConfig::default());
        let day = state.lighting();
        state.time_of_day = TimeOfDay::Night;
        assert_ne!(state.lighting().sky_color, day.sky_color);
    }
}
