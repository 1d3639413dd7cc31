//! Scene configuration.
//!
//! Loaded from an optional JSON file; every field has a default equal to the
//! hand-authored scene, so `{}` is a valid config. CLI flags are applied on
//! top with [`SceneConfig::apply_cli`].

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::car::{CAR_MODEL_SCALE, CAR_START_POSITION};
use crate::cli::Cli;
use crate::surface::{GridSpacing, DEFAULT_TESSELLATION_LEVEL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub car: CarConfig,
    pub map: MapConfig,
    pub controls: ControlsConfig,
    pub surface: SurfaceConfig,
    /// Start with the debug overlay visible
    pub show_overlay: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            car: CarConfig::default(),
            map: MapConfig::default(),
            controls: ControlsConfig::default(),
            surface: SurfaceConfig::default(),
            show_overlay: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub fullscreen: bool,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Car Scene".to_string(),
            fullscreen: true,
            width: 800,
            height: 600,
            vsync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory relative paths below are resolved against
    pub root: PathBuf,
    pub car_model: PathBuf,
    pub map_model: PathBuf,
    pub cube_diffuse: PathBuf,
    pub cube_specular: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            car_model: PathBuf::from("car/car.glb"),
            map_model: PathBuf::from("map/map.obj"),
            cube_diffuse: PathBuf::from("container2.png"),
            cube_specular: PathBuf::from("container2_specular.png"),
        }
    }
}

impl AssetConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub start_position: Vec3,
    pub model_scale: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            start_position: CAR_START_POSITION,
            model_scale: CAR_MODEL_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub scale: f32,
    /// Rotation about +X in degrees, brings Z-up exports into Y-up
    pub rotation_x_deg: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            scale: 0.01,
            rotation_x_deg: -90.0,
        }
    }
}

/// Rates applied per second of held key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub car_speed: f32,
    pub car_turn_rate: f32,
    pub car_lift_rate: f32,
    pub spotlight_aim_rate: f32,
    pub fog_rate: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            car_speed: 2.0,
            car_turn_rate: 2.0,
            car_lift_rate: 2.0,
            spotlight_aim_rate: 0.2,
            fog_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub spacing: GridSpacing,
    pub tessellation_level: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            spacing: GridSpacing::default(),
            tessellation_level: DEFAULT_TESSELLATION_LEVEL,
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid scene config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&text).with_context(|| format!("In config file: {:?}", path))
    }

    /// Config file named on the command line (or defaults), with flags on top
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.no_ui {
            self.show_overlay = false;
        }
        if cli.windowed {
            self.window.fullscreen = false;
        }
        if cli.vsync {
            self.window.vsync = true;
        }
        if let Some(root) = &cli.assets {
            self.assets.root = root.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_json_is_default() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SceneConfig::from_json(
            r#"{ "surface": { "spacing": "normalized" }, "controls": { "car_speed": 5.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.surface.spacing, GridSpacing::Normalized);
        assert_eq!(config.surface.tessellation_level, DEFAULT_TESSELLATION_LEVEL);
        assert_eq!(config.controls.car_speed, 5.0);
        assert_eq!(config.controls.fog_rate, 0.1);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(SceneConfig::from_json(r#"{ "window": { "width": "wide" } }"#).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["car-scene", "--no-ui", "--windowed", "--vsync", "--assets", "/data"]);
        let mut config = SceneConfig {
            show_overlay: true,
            ..Default::default()
        };
        config.apply_cli(&cli);

        assert!(!config.show_overlay);
        assert!(!config.window.fullscreen);
        assert!(config.window.vsync);
        assert_eq!(config.assets.resolve(Path::new("a.png")), PathBuf::from("/data/a.png"));
    }

    #[test]
    fn test_missing_config_file_reports_path() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(format!("{:#}", err).contains("not/here.json"));
    }
}
