//! Native-side GUI layer: wry webviews for the controls bar and the page
//! shown on the desk screen.
//!
//! The webviews are created as children of the winit window and talk to
//! the engine via a minimal JSON IPC bridge.

/// Webview controller owning both webviews and their pushed state.
pub(crate) mod panel;
/// Wry webview creation, IPC handler, and state push helpers.
pub mod webview;
