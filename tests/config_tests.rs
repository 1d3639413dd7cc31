use car_scene::cli::Cli;
use car_scene::state::SceneState;
use car_scene::surface::GridSpacing;
use car_scene::SceneConfig;
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("car_scene_{}_{}.json", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[cfg(test)]
mod config_file_tests {
    use super::*;

    #[test]
    fn test_config_file_then_flags() {
        let path = write_config(
            "flags",
            r#"{ "show_overlay": true, "window": { "fullscreen": true, "title": "Test" } }"#,
        );
        let cli = Cli::parse_from([
            "car-scene",
            "--config",
            path.to_str().unwrap(),
            "--no-ui",
            "--windowed",
        ]);
        let config = SceneConfig::from_cli(&cli).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.window.title, "Test");
        assert!(!config.window.fullscreen);
        assert!(!config.show_overlay);
    }

    #[test]
    fn test_no_config_flag_uses_defaults() {
        let cli = Cli::parse_from(["car-scene"]);
        let config = SceneConfig::from_cli(&cli).unwrap();
        assert_eq!(config, SceneConfig::default());
        assert!(config.window.fullscreen);
        assert!(config.show_overlay);
    }

    #[test]
    fn test_broken_config_file_is_an_error() {
        let path = write_config("broken", "{ not json");
        let cli = Cli::parse_from(["car-scene", "--config", path.to_str().unwrap()]);
        let result = SceneConfig::from_cli(&cli);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod scene_from_config_tests {
    use super::*;

    #[test]
    fn test_scene_state_uses_config_values() {
        let config = SceneConfig::from_json(
            r#"{
                "show_overlay": false,
                "car": { "start_position": [1.0, 2.0, 3.0], "model_scale": 2.0 },
                "surface": { "spacing": "normalized" }
            }"#,
        )
        .unwrap();
        let state = SceneState::new(&config);

        assert_eq!(state.car.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.car_scale, 2.0);
        assert_eq!(state.spacing, GridSpacing::Normalized);
        assert!(!state.show_overlay);
    }
}
