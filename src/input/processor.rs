//! Converts raw platform events into scene commands.
//!
//! The `InputProcessor` owns all transient input state (viewport size,
//! cursor position, press tracking) and the key-binding map. It is the only
//! thing that sits between raw window events and the engine's
//! [`execute`](crate::engine::DeskEngine::execute) method.

use super::event::{InputEvent, MouseButton};
use super::pointer::PointerSample;
use crate::engine::command::SceneCommand;
use crate::options::KeybindingOptions;

/// Cursor travel (physical pixels) beyond which a press no longer counts
/// as a click.
const CLICK_SLOP: f32 = 6.0;

/// Converts raw window events into [`SceneCommand`]s.
///
/// # Usage
///
/// ```ignore
/// if let Some(cmd) = input_processor.handle_event(event) {
///     engine.execute(cmd);
/// }
///
/// if let Some(cmd) = input_processor.handle_key_press("KeyL") {
///     engine.execute(cmd);
/// }
/// ```
pub struct InputProcessor {
    /// Viewport size in physical pixels.
    viewport: (f32, f32),
    /// Last cursor position in physical pixels.
    cursor: (f32, f32),
    /// Cursor position at the last primary press, while held.
    press_origin: Option<(f32, f32)>,
    /// Key string to action mapping.
    key_bindings: KeybindingOptions,
}

impl InputProcessor {
    /// Create a processor for a viewport of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width as f32, height as f32),
            cursor: (width as f32 * 0.5, height as f32 * 0.5),
            press_origin: None,
            key_bindings: KeybindingOptions::default(),
        }
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(
        width: u32,
        height: u32,
        key_bindings: KeybindingOptions,
    ) -> Self {
        Self {
            key_bindings,
            ..Self::new(width, height)
        }
    }

    /// Current cursor position in physical pixels.
    #[must_use]
    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    /// Current cursor position normalized against the viewport.
    #[must_use]
    pub fn pointer(&self) -> PointerSample {
        PointerSample::from_client(
            self.cursor.0,
            self.cursor.1,
            self.viewport.0,
            self.viewport.1,
        )
    }

    /// Replace the key bindings.
    pub fn set_key_bindings(&mut self, key_bindings: KeybindingOptions) {
        self.key_bindings = key_bindings;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<SceneCommand> {
        self.key_bindings.lookup(key).map(|action| action.to_command())
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<SceneCommand> {
        match event {
            InputEvent::CursorMoved { x, y } | InputEvent::TouchMoved { x, y } => {
                self.cursor = (x, y);
                Some(SceneCommand::SetPointer {
                    sample: self.pointer(),
                })
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => self.handle_primary_button(pressed),
            InputEvent::MouseButton { .. } => None,
            InputEvent::Resized { width, height } => {
                if width == 0 || height == 0 {
                    return None;
                }
                self.viewport = (width as f32, height as f32);
                Some(SceneCommand::Resize { width, height })
            }
        }
    }

    fn handle_primary_button(&mut self, pressed: bool) -> Option<SceneCommand> {
        if pressed {
            self.press_origin = Some(self.cursor);
            return None;
        }
        let (ox, oy) = self.press_origin.take()?;
        let travel = (self.cursor.0 - ox).hypot(self.cursor.1 - oy);
        if travel > CLICK_SLOP {
            return None;
        }
        Some(SceneCommand::Click {
            sample: self.pointer(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(processor: &mut InputProcessor, pressed: bool) -> Option<SceneCommand> {
        processor.handle_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        })
    }

    #[test]
    fn cursor_move_emits_normalized_pointer() {
        let mut p = InputProcessor::new(800, 600);
        let cmd = p.handle_event(InputEvent::CursorMoved { x: 0.0, y: 600.0 });
        assert_eq!(
            cmd,
            Some(SceneCommand::SetPointer {
                sample: PointerSample::new(0.0, 1.0)
            })
        );
    }

    #[test]
    fn touch_move_is_treated_like_cursor() {
        let mut p = InputProcessor::new(100, 100);
        let _ = p.handle_event(InputEvent::TouchMoved { x: 25.0, y: 75.0 });
        assert_eq!(p.pointer(), PointerSample::new(0.25, 0.75));
    }

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut p = InputProcessor::new(800, 600);
        let _ = p.handle_event(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
        assert!(press(&mut p, true).is_none());
        assert_eq!(
            press(&mut p, false),
            Some(SceneCommand::Click {
                sample: PointerSample::CENTER
            })
        );
    }

    #[test]
    fn drag_is_not_a_click() {
        let mut p = InputProcessor::new(800, 600);
        let _ = press(&mut p, true);
        let _ = p.handle_event(InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        assert!(press(&mut p, false).is_none());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut p = InputProcessor::new(800, 600);
        assert!(press(&mut p, false).is_none());
    }

    #[test]
    fn resize_updates_normalization() {
        let mut p = InputProcessor::new(800, 600);
        let _ = p.handle_event(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
        assert_eq!(
            p.handle_event(InputEvent::Resized {
                width: 1600,
                height: 1200
            }),
            Some(SceneCommand::Resize {
                width: 1600,
                height: 1200
            })
        );
        assert_eq!(p.pointer(), PointerSample::new(0.25, 0.25));
        assert!(p
            .handle_event(InputEvent::Resized {
                width: 0,
                height: 10
            })
            .is_none());
    }

    #[test]
    fn bound_keys_map_to_commands() {
        let p = InputProcessor::new(800, 600);
        assert_eq!(p.handle_key_press("Space"), Some(SceneCommand::ToggleZoom));
        assert_eq!(p.handle_key_press("KeyL"), Some(SceneCommand::ToggleLamp));
        assert_eq!(
            p.handle_key_press("Minus"),
            Some(SceneCommand::StepVolume { steps: -1 })
        );
        assert!(p.handle_key_press("KeyZ").is_none());
    }
}
