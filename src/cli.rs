// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "car-scene")]
#[command(about = "Car, map and flag scene with day/night lighting", long_about = None)]
pub struct Cli {
    /// JSON scene config; missing fields fall back to the built-in scene
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start with the debug overlay hidden
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Open a window instead of going fullscreen
    #[arg(long, default_value = "false")]
    pub windowed: bool,

    /// Cap the frame rate to the display refresh rate
    #[arg(long, default_value = "false")]
    pub vsync: bool,

    /// Directory that asset paths are resolved against
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,
}
