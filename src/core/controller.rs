/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyN,
    KeyM,
    KeyO,
    KeyL,
    KeyP,
    Semicolon,
    KeyI,
    KeyK,
    KeyU,
    KeyJ,
    KeyY,
    KeyH,
    Digit1,
    Digit2,
    Digit3,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// Controller - polled once per frame for held buttons and pointer motion
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Get all currently pressed buttons
    fn get_down_keys(&self) -> &[Button];

    /// Pointer motion accumulated since the last frame, y grows downwards
    fn mouse_delta(&self) -> (f32, f32) {
        (0.0, 0.0)
    }

    /// Wheel lines accumulated since the last frame, positive away from the user
    fn scroll_delta(&self) -> f32 {
        0.0
    }
}
