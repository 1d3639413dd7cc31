use glam::Vec3;

/// sRGB transfer function decoded to linear, per channel
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Color authored for a linear framebuffer, adjusted for the target format.
/// An sRGB target re-encodes on write, so the value is decoded first to
/// land on the same displayed color.
pub fn surface_color(color: Vec3, srgb_target: bool) -> Vec3 {
    if srgb_target {
        Vec3::new(
            srgb_to_linear(color.x),
            srgb_to_linear(color.y),
            srgb_to_linear(color.z),
        )
    } else {
        color
    }
}

pub fn clear_color(color: Vec3) -> wgpu::Color {
    wgpu::Color {
        r: color.x as f64,
        g: color.y as f64,
        b: color.z as f64,
        a: 1.0,
    }
}
