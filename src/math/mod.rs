mod color;

pub use color::{clear_color, srgb_to_linear, surface_color};
