// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::BackdropConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "ribbon-backdrop")]
#[command(about = "Animated reflective ribbon backdrop", long_about = None)]
pub struct Cli {
    /// Color ramp image; defaults to the built-in chrome ramp
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Directional bias of the ribbon along X
    #[arg(long)]
    pub incline: Option<f32>,

    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Exit after this many rendered frames
    #[arg(long)]
    pub frames: Option<u64>,

    #[arg(long, default_value = "1280")]
    pub width: u32,

    #[arg(long, default_value = "720")]
    pub height: u32,
}

impl Cli {
    /// Resolve the backdrop config from the optional file plus flag overrides
    pub fn backdrop_config(&self) -> anyhow::Result<BackdropConfig> {
        let mut config = match &self.config {
            Some(path) => BackdropConfig::load(path)?,
            None => BackdropConfig::default(),
        };
        if let Some(texture) = &self.texture {
            config.texture_path = Some(texture.clone());
        }
        if let Some(incline) = self.incline {
            config.incline = incline;
        }
        Ok(config)
    }
}
