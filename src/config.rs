//! Viewer configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides. [`ViewerConfig::load`] reads `PART_VIEWER_CONFIG` or
//! `viewer.json` from the working directory and falls back to defaults when
//! neither exists.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PART_VIEWER_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "viewer.json";

/// Clicking a part whose identifier contains `contains` toggles `animation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRule {
    pub contains: String,
    pub animation: String,
}

impl ToggleRule {
    #[must_use]
    pub fn new(contains: impl Into<String>, animation: impl Into<String>) -> Self {
        Self {
            contains: contains.into(),
            animation: animation.into(),
        }
    }
}

/// One recolor button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSwatch {
    pub label: String,
    /// Any string accepted by [`crate::color::parse_srgb`].
    pub value: String,
}

impl ColorSwatch {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 1.0, 3.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub hemisphere_sky: String,
    pub hemisphere_ground: String,
    pub hemisphere_intensity: f32,
    pub directional_color: String,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            hemisphere_sky: "#ffffff".into(),
            hemisphere_ground: "#444444".into(),
            hemisphere_intensity: 1.5,
            directional_color: "#ffffff".into(),
            directional_intensity: 1.0,
            directional_position: Vec3::new(5.0, 10.0, 7.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Part Viewer".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Model path or `http(s)://` URL.
    pub asset: String,
    /// Part metadata JSON file; a missing file leaves the table empty.
    pub metadata: Option<PathBuf>,
    /// Part recolored by the color controls.
    pub target_part: String,
    pub toggle_rules: Vec<ToggleRule>,
    /// Gap between the pointer and the tooltip, in logical points.
    pub tooltip_offset: Vec2,
    /// Hide the tooltip when the pointer moves off every described part.
    pub hide_tooltip_on_miss: bool,
    pub swatches: Vec<ColorSwatch>,
    pub background: String,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub window: WindowConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset: "model.glb".into(),
            metadata: Some(PathBuf::from("parts.json")),
            target_part: "LeftWing".into(),
            toggle_rules: vec![
                ToggleRule::new("DrawerLeft", "LeftDrawerOpen"),
                ToggleRule::new("MiddleWing", "MiddleOpen"),
            ],
            tooltip_offset: Vec2::new(10.0, 10.0),
            hide_tooltip_on_miss: false,
            swatches: vec![
                ColorSwatch::new("Red", "#ff0000"),
                ColorSwatch::new("Green", "#00ff00"),
                ColorSwatch::new("Blue", "#0000ff"),
                ColorSwatch::new("White", "#ffffff"),
                ColorSwatch::new("Black", "#000000"),
            ],
            background: "#f0f0f0".into(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Resolves the config file from the environment or the working
    /// directory. An explicitly named file must exist; the implicit
    /// `viewer.json` is optional.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            log::info!("Loading config from {path}");
            return Self::from_file(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            log::info!("Loading config from {DEFAULT_CONFIG_FILE}");
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_setup() {
        let config = ViewerConfig::default();
        assert_eq!(config.asset, "model.glb");
        assert_eq!(config.target_part, "LeftWing");
        assert_eq!(config.toggle_rules.len(), 2);
        assert_eq!(config.tooltip_offset, Vec2::new(10.0, 10.0));
        assert!(!config.hide_tooltip_on_miss);
        assert_eq!(config.camera.position, Vec3::new(0.0, 1.0, 3.0));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = ViewerConfig::from_json(
            r#"{ "asset": "plane.gltf", "hide_tooltip_on_miss": true, "camera": { "fov": 50.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.asset, "plane.gltf");
        assert!(config.hide_tooltip_on_miss);
        assert!((config.camera.fov - 50.0).abs() < f32::EPSILON);
        assert!((config.camera.far - 1000.0).abs() < f32::EPSILON);
        assert_eq!(config.target_part, "LeftWing");
    }
}
