// config.rs - Backdrop configuration, loadable from JSON and overridable from the CLI
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INCLINE: f32 = 0.2;

/// Mount-time configuration of the backdrop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Color ramp image; the built-in chrome ramp is used when unset
    pub texture_path: Option<PathBuf>,
    /// Directional bias of the displacement along X
    pub incline: f32,
    pub shader: ShaderSettings,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            texture_path: None,
            incline: DEFAULT_INCLINE,
            shader: ShaderSettings::default(),
        }
    }
}

impl BackdropConfig {
    pub fn new(texture_path: impl Into<PathBuf>, incline: f32) -> Self {
        Self {
            texture_path: Some(texture_path.into()),
            incline,
            ..Self::default()
        }
    }

    /// Load a JSON config; fields left out keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Fixed shader parameters, set once at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSettings {
    pub noise_scale: [f32; 2],
    pub noise_amp: f32,
    pub noise_speed: f32,
    /// Finite-difference step used to rebuild normals after displacement
    pub normal_offset: f32,
    pub noise_translate_speed: f32,
    pub edge_reflection_min: f32,
    pub edge_reflection_max: f32,
    pub gradient_ramp_min: f32,
    pub gradient_ramp_max: f32,
    pub gradient_scale: [f32; 3],
    pub gradient_noise_speed: [f32; 3],
    pub gradient_grain_scale: [f32; 2],
    pub gradient_grain_offset: [f32; 2],
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            noise_scale: [0.2, 0.45],
            noise_amp: 1.0,
            noise_speed: 0.03,
            normal_offset: 0.05,
            noise_translate_speed: -0.05,
            edge_reflection_min: 0.0,
            edge_reflection_max: 1.0,
            gradient_ramp_min: 0.5,
            gradient_ramp_max: -0.3,
            gradient_scale: [0.15, 1.0, 1.0],
            gradient_noise_speed: [0.06, 0.05, 0.0],
            gradient_grain_scale: [1.5, 0.0],
            gradient_grain_offset: [0.07, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: BackdropConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BackdropConfig::default());
    }

    #[test]
    fn partial_shader_override() {
        let config: BackdropConfig =
            serde_json::from_str(r#"{ "incline": 0.45, "shader": { "noise_amp": 2.0 } }"#).unwrap();
        assert_eq!(config.incline, 0.45);
        assert_eq!(config.shader.noise_amp, 2.0);
        assert_eq!(config.shader.noise_scale, [0.2, 0.45]);
        assert!(config.texture_path.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = BackdropConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }
}
