//! Input handling: event types, pointer normalization, key actions, and
//! the input processor that converts raw window events into scene
//! commands.

/// Platform-agnostic input events.
pub mod event;
/// Bindable keyboard actions.
pub mod keyboard;
/// Viewport-normalized pointer samples.
pub mod pointer;
/// Converts raw events into scene commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use keyboard::KeyAction;
pub use pointer::PointerSample;
pub use processor::InputProcessor;
