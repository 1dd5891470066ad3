//! Centralized scene options with TOML preset support.
//!
//! All tweakable settings (camera rig bounds, glass material, sky colors,
//! sparkles, colour grade, asset names, embedded page, music, keybindings) are
//! consolidated here. Options serialize to/from TOML for presets stored in
//! `assets/presets/`.

mod assets;
mod camera;
mod gradient_map;
mod keybindings;
mod sky;
mod transmission;

use std::path::Path;

pub use assets::{AssetOptions, AudioOptions, OverlayOptions};
pub use camera::CameraOptions;
pub use gradient_map::GradientMapOptions;
pub use keybindings::KeybindingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use sky::{SkyOptions, SparkleOptions};
pub use transmission::TransmissionOptions;

use crate::error::DeskroomError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and rig parameters.
    pub camera: CameraOptions,
    /// Window glass material parameters.
    pub transmission: TransmissionOptions,
    /// Sky plate colors.
    pub sky: SkyOptions,
    /// Floating particle field.
    pub sparkles: SparkleOptions,
    /// Full-screen colour grade.
    pub gradient_map: GradientMapOptions,
    /// Model, texture and node-role names.
    #[schemars(skip)]
    pub assets: AssetOptions,
    /// Embedded screen page.
    pub overlay: OverlayOptions,
    /// Background music.
    pub audio: AudioOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, DeskroomError> {
        let mut options: Self = toml::from_str(content)
            .map_err(|e| DeskroomError::OptionsParse(e.to_string()))?;
        options.keybindings.rebuild_reverse_map();
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, DeskroomError> {
        let content =
            std::fs::read_to_string(path).map_err(DeskroomError::Io)?;
        let options = Self::from_toml_str(&content)?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), DeskroomError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DeskroomError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DeskroomError::Io)?;
        }
        std::fs::write(path, content).map_err(DeskroomError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
        assert_eq!(
            parsed.keybindings.lookup("Space"),
            Some(KeyAction::ToggleZoom)
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[camera]
smooth_time = 0.0
min_polar = 1.5
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.camera.smooth_time, 0.0);
        assert_eq!(opts.camera.min_polar, 1.5);
        // Everything else should be default
        assert_eq!(opts.camera.max_polar, 1.72);
        assert_eq!(opts.transmission.roughness, 0.01);
        assert_eq!(opts.assets.glass.len(), 4);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml_str("[camera\nfovy = ").unwrap_err();
        assert!(matches!(err, DeskroomError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(opts.keybindings.lookup("KeyL"), Some(KeyAction::ToggleLamp));
        assert_eq!(opts.keybindings.lookup("Escape"), Some(KeyAction::ExitZoom));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn transmission_factor_is_clamped() {
        let mut glass = TransmissionOptions::default();
        glass.transmission = 1.5;
        assert_eq!(glass.clamped_transmission(), 1.0);
        glass.transmission = -0.2;
        assert_eq!(glass.clamped_transmission(), 0.0);
    }

    #[test]
    fn gradient_map_defaults_off() {
        let opts = Options::default();
        assert!(opts.gradient_map.texture.is_none());
        assert_eq!(opts.gradient_map.opacity, 0.2);

        let opts = Options::from_toml_str(
            "[gradient_map]\ntexture = \"gradient.png\"\nopacity = 3.0\n",
        )
        .unwrap();
        assert_eq!(opts.gradient_map.texture.as_deref(), Some("gradient.png"));
        assert_eq!(opts.gradient_map.clamped_opacity(), 1.0);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("transmission"));
        assert!(props.contains_key("sky"));
        assert!(props.contains_key("audio"));
        assert!(props.contains_key("gradient_map"));

        // Skipped sections should be absent
        assert!(!props.contains_key("assets"));
        assert!(!props.contains_key("keybindings"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("smooth_time").is_some());
        assert!(camera.get("target").is_none());
    }

    #[test]
    fn list_presets_ignores_other_files() {
        let dir = std::env::temp_dir().join(format!(
            "deskroom-presets-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        Options::default().save(&dir.join("night.toml")).unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();

        assert_eq!(Options::list_presets(&dir), vec!["night".to_owned()]);
        let loaded = Options::load(&dir.join("night.toml")).unwrap();
        assert_eq!(loaded, Options::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
