//! Background music state.
//!
//! The engine owns a [`MusicState`] and updates it through pure
//! transitions; whatever actually plays the track (the controls page in
//! the `gui` build) mirrors it.

use serde::Serialize;

use crate::options::AudioOptions;

/// Volume slider granularity.
pub const VOLUME_STEP: f32 = 0.05;

/// Speaker icon shown next to the volume slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerLevel {
    /// Muted or zero volume.
    None,
    /// Volume up to one half.
    Low,
    /// Volume above one half.
    High,
}

/// Playback state of the background track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicState {
    /// Track file name.
    pub track: String,
    /// Whether the track is playing.
    pub playing: bool,
    /// Volume in `[0, 1]`, snapped to [`VOLUME_STEP`].
    pub volume: f32,
    /// Volume to restore when unmuting.
    pub previous_volume: f32,
    /// Whether output is muted.
    pub muted: bool,
    /// Whether the slider is expanded (touch devices toggle it by tapping
    /// the speaker).
    pub slider_visible: bool,
}

fn snap_volume(volume: f32) -> f32 {
    if !volume.is_finite() {
        return 0.0;
    }
    ((volume.clamp(0.0, 1.0) / VOLUME_STEP).round() * VOLUME_STEP).clamp(0.0, 1.0)
}

impl MusicState {
    /// Initial state from audio options.
    pub fn new(options: &AudioOptions) -> Self {
        let volume = snap_volume(options.volume);
        Self {
            track: options.track.clone(),
            playing: options.autoplay,
            volume,
            previous_volume: volume,
            muted: volume == 0.0,
            slider_visible: false,
        }
    }

    /// Volume actually sent to the output.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Icon for the current volume.
    pub fn speaker_level(&self) -> SpeakerLevel {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            SpeakerLevel::None
        } else if volume <= 0.5 {
            SpeakerLevel::Low
        } else {
            SpeakerLevel::High
        }
    }

    /// Set the volume from the slider. Zero mutes.
    #[must_use]
    pub fn with_volume(self, volume: f32) -> Self {
        let volume = snap_volume(volume);
        let previous_volume = if volume > 0.0 {
            volume
        } else {
            self.previous_volume
        };
        Self {
            volume,
            previous_volume,
            muted: volume == 0.0,
            ..self
        }
    }

    /// Move the volume by whole slider steps.
    #[must_use]
    pub fn step_volume(self, steps: i32) -> Self {
        let base = self.effective_volume();
        self.with_volume(base + steps as f32 * VOLUME_STEP)
    }

    /// Mute, or restore the volume from before muting.
    #[must_use]
    pub fn toggle_mute(self) -> Self {
        if self.muted {
            let volume = if self.previous_volume > 0.0 {
                self.previous_volume
            } else {
                VOLUME_STEP
            };
            Self {
                volume,
                muted: false,
                ..self
            }
        } else {
            Self {
                previous_volume: self.volume,
                muted: true,
                ..self
            }
        }
    }

    /// Start or pause playback.
    #[must_use]
    pub fn toggle_play(self) -> Self {
        Self {
            playing: !self.playing,
            ..self
        }
    }

    /// Expand or collapse the slider.
    #[must_use]
    pub fn toggle_slider(self) -> Self {
        Self {
            slider_visible: !self.slider_visible,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MusicState {
        MusicState::new(&AudioOptions::default())
    }

    #[test]
    fn starts_playing_at_default_volume() {
        let s = state();
        assert!(s.playing);
        assert!((s.volume - 0.2).abs() < 1e-6);
        assert_eq!(s.speaker_level(), SpeakerLevel::Low);
    }

    #[test]
    fn zero_volume_mutes() {
        let s = state().with_volume(0.0);
        assert!(s.muted);
        assert_eq!(s.speaker_level(), SpeakerLevel::None);
        assert!((s.previous_volume - 0.2).abs() < 1e-6);
    }

    #[test]
    fn volume_snaps_to_slider_steps() {
        let s = state().with_volume(0.53);
        assert!((s.volume - 0.55).abs() < 1e-6);
        assert_eq!(s.speaker_level(), SpeakerLevel::High);
        assert!((state().with_volume(7.0).volume - 1.0).abs() < 1e-6);
    }

    #[test]
    fn half_volume_is_low() {
        assert_eq!(state().with_volume(0.5).speaker_level(), SpeakerLevel::Low);
    }

    #[test]
    fn mute_round_trip_restores_volume() {
        let s = state().with_volume(0.7).toggle_mute();
        assert!(s.muted);
        assert_eq!(s.effective_volume(), 0.0);
        let s = s.toggle_mute();
        assert!(!s.muted);
        assert!((s.volume - 0.7).abs() < 1e-6);
    }

    #[test]
    fn stepping_clamps_at_edges() {
        let s = state().step_volume(-10);
        assert_eq!(s.volume, 0.0);
        assert!(s.muted);
        let s = s.step_volume(1);
        assert!((s.volume - VOLUME_STEP).abs() < 1e-6);
        assert!(!s.muted);
    }

    #[test]
    fn play_and_slider_toggle() {
        let s = state().toggle_play().toggle_slider();
        assert!(!s.playing);
        assert!(s.slider_visible);
    }
}
