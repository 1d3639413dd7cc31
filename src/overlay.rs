//! Debug overlay: formatting is pure, egui only displays the lines.

use glam::Vec3;

use crate::camera::ActiveCamera;
use crate::lighting::TimeOfDay;
use crate::state::ShadingModel;

pub const OVERLAY_POSITION: [f32; 2] = [16.0, 16.0];
pub const OVERLAY_SIZE: [f32; 2] = [256.0, 160.0];

/// Read-only copy of what the overlay shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySnapshot {
    pub fps: f32,
    pub camera: ActiveCamera,
    pub camera_position: Vec3,
    pub car_position: Vec3,
    pub car_heading_deg: f32,
    pub spotlight_pitch_deg: f32,
    pub shading: ShadingModel,
    pub time_of_day: TimeOfDay,
    pub fog_intensity: f32,
}

fn vec3_line(label: &str, v: Vec3) -> String {
    format!("{}: {:7.2} {:7.2} {:7.2}", label, v.x, v.y, v.z)
}

pub fn overlay_lines(snapshot: &OverlaySnapshot) -> Vec<String> {
    vec![
        format!("{:4.1} FPS", snapshot.fps),
        vec3_line("Cam Pos", snapshot.camera_position),
        vec3_line("Car Pos", snapshot.car_position),
        format!("Car Heading: {:5.1}", snapshot.car_heading_deg),
        format!("Car Spotlight Pitch: {:4.1}", snapshot.spotlight_pitch_deg),
        format!("Shading: {}", snapshot.shading.label()),
        format!("Time: {}", snapshot.time_of_day.label()),
        format!("Fog Intensity: {:4.3}", snapshot.fog_intensity),
    ]
}

/// Draw the debug window into the current egui frame
pub fn show(ctx: &egui::Context, snapshot: &OverlaySnapshot) {
    let lines = overlay_lines(snapshot);

    egui::Window::new("Debug")
        .resizable(false)
        .collapsible(false)
        .fixed_pos(egui::pos2(OVERLAY_POSITION[0], OVERLAY_POSITION[1]))
        .fixed_size(egui::vec2(OVERLAY_SIZE[0], OVERLAY_SIZE[1]))
        .show(ctx, |ui| {
            for line in &lines {
                ui.label(egui::RichText::new(line).monospace());
            }
            ui.label(
                egui::RichText::new(format!("Camera: {}", snapshot.camera.label()))
                    .small()
                    .color(egui::Color32::GRAY),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> OverlaySnapshot {
        OverlaySnapshot {
            fps: 59.94,
            camera: ActiveCamera::Car,
            camera_position: Vec3::new(1.0, -2.5, 100.25),
            car_position: Vec3::new(16.0, 0.0, -21.0),
            car_heading_deg: 90.0,
            spotlight_pitch_deg: -10.0,
            shading: ShadingModel::Blinn,
            time_of_day: TimeOfDay::Night,
            fog_intensity: 0.25,
        }
    }

    #[test]
    fn test_overlay_lines_format() {
        let lines = overlay_lines(&snapshot());
        assert_eq!(lines[0], "59.9 FPS");
        assert_eq!(lines[1], "Cam Pos:    1.00   -2.50  100.25");
        assert_eq!(lines[2], "Car Pos:   16.00    0.00  -21.00");
        assert_eq!(lines[4], "Car Spotlight Pitch: -10.0");
        assert_eq!(lines[5], "Shading: Blinn");
        assert_eq!(lines[6], "Time: Night");
        assert_eq!(lines[7], "Fog Intensity: 0.250");
    }

    #[test]
    fn test_small_fps_is_padded() {
        let mut s = snapshot();
        s.fps = 5.0;
        assert_eq!(overlay_lines(&s)[0], " 5.0 FPS");
    }
}
