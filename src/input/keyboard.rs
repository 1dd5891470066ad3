use serde::{Deserialize, Serialize};

use crate::engine::command::SceneCommand;

/// Scene-level actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// toggle_zoom = "Space"
/// toggle_lamp = "KeyL"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Fly to the screen, or back to the desk view.
    ToggleZoom,
    /// Leave the zoomed view if active.
    ExitZoom,
    /// Switch the desk lamp on or off.
    ToggleLamp,
    /// Mute or unmute the music.
    ToggleMute,
    /// Raise the volume by one slider step.
    VolumeUp,
    /// Lower the volume by one slider step.
    VolumeDown,
}

impl KeyAction {
    /// The command this action triggers.
    #[must_use]
    pub fn to_command(self) -> SceneCommand {
        match self {
            Self::ToggleZoom => SceneCommand::ToggleZoom,
            Self::ExitZoom => SceneCommand::ExitZoom,
            Self::ToggleLamp => SceneCommand::ToggleLamp,
            Self::ToggleMute => SceneCommand::ToggleMute,
            Self::VolumeUp => SceneCommand::StepVolume { steps: 1 },
            Self::VolumeDown => SceneCommand::StepVolume { steps: -1 },
        }
    }
}
