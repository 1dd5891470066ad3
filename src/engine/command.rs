//! The engine's interactive vocabulary.
//!
//! Every user-facing operation, whether it comes from a key press, a pointer
//! gesture or the controls page, is a [`SceneCommand`]. Consumers build
//! commands and pass them to
//! [`DeskEngine::execute`](super::DeskEngine::execute).

use crate::input::PointerSample;

// ── Commands ─────────────────────────────────────────────────────────────

/// A discrete or parameterized operation the engine can perform.
///
/// The engine never cares *how* a command was triggered. Keyboard, mouse,
/// the controls page, or API calls all look identical:
///
/// ```ignore
/// engine.execute(SceneCommand::ToggleLamp);
/// engine.execute(SceneCommand::SetVolume { volume: 0.4 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    // ── Camera ──────────────────────────────────────────────────────
    /// Store the latest pointer sample for the camera rig.
    SetPointer {
        /// Normalized pointer position.
        sample: PointerSample,
    },

    /// Fly to the computer screen, or back to the desk view.
    ToggleZoom,

    /// Leave the zoomed view if active.
    ExitZoom,

    /// Primary click at a pointer position. Hits on the lamp toggle it.
    Click {
        /// Normalized click position.
        sample: PointerSample,
    },

    /// The viewport changed size.
    Resize {
        /// New width in physical pixels.
        width: u32,
        /// New height in physical pixels.
        height: u32,
    },

    // ── Lighting ────────────────────────────────────────────────────
    /// Switch the desk lamp on or off.
    ToggleLamp,

    // ── Music ───────────────────────────────────────────────────────
    /// Start or pause playback.
    TogglePlay,

    /// Mute, or restore the volume from before muting.
    ToggleMute,

    /// Set the volume directly.
    SetVolume {
        /// Volume in `[0, 1]`.
        volume: f32,
    },

    /// Move the volume by whole slider steps.
    StepVolume {
        /// Number of steps, negative to lower.
        steps: i32,
    },

    /// Expand or collapse the volume slider (tap on the speaker icon).
    ToggleVolumeSlider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_compare_by_payload() {
        let a = SceneCommand::SetVolume { volume: 0.4 };
        assert_eq!(a, SceneCommand::SetVolume { volume: 0.4 });
        assert_ne!(a, SceneCommand::SetVolume { volume: 0.5 });
        assert_ne!(SceneCommand::ToggleZoom, SceneCommand::ExitZoom);
        let click = SceneCommand::Click {
            sample: PointerSample::CENTER,
        };
        assert_ne!(click, SceneCommand::SetPointer { sample: PointerSample::CENTER });
    }
}
