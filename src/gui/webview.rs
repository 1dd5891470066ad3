//! Wry webview children of the winit window.
//!
//! Two webviews are created: the controls bar along the bottom edge, which
//! loads the embedded `assets/ui` page through a custom `deskroom://`
//! protocol and talks to the engine over JSON IPC, and the screen page,
//! which loads the configured external URL and is laid over the desk
//! screen each frame.

use std::borrow::Cow;
use std::sync::mpsc;

use rust_embed::RustEmbed;
use serde_json::json;
use wry::http::{header::CONTENT_TYPE, Response};
use wry::{dpi, Rect, WebView, WebViewBuilder};

use crate::audio::MusicState;
use crate::engine::command::SceneCommand;
use crate::overlay::{OverlayLayout, OverlayRect};
use crate::scene::LoadProgress;

/// Embedded controls page.
#[derive(RustEmbed)]
#[folder = "assets/ui/"]
struct UiAssets;

/// Height of the controls bar in physical pixels.
pub const CONTROLS_HEIGHT: u32 = 64;

/// Create the controls bar as a child of the given window.
///
/// Returns `(webview, command_rx)`; the receiver yields the commands the
/// page sends.
pub fn create_controls<W: wry::raw_window_handle::HasWindowHandle>(
    window: &W,
    window_width: u32,
    window_height: u32,
) -> Result<(WebView, mpsc::Receiver<SceneCommand>), wry::Error> {
    let (tx, rx) = mpsc::channel();

    let webview = WebViewBuilder::new()
        .with_bounds(controls_bounds(window_width, window_height))
        .with_transparent(true)
        .with_custom_protocol("deskroom".into(), |_id, request| {
            let path = request.uri().path();
            let path = if path == "/" { "index.html" } else { &path[1..] };
            serve_asset(path)
        })
        .with_url("deskroom://localhost/")
        .with_initialization_script(BRIDGE_JS)
        .with_ipc_handler(move |req| {
            let Ok(msg) = serde_json::from_str::<serde_json::Value>(req.body())
            else {
                return;
            };
            if let Some(command) = parse_action(&msg) {
                let _ = tx.send(command);
            }
        })
        .build_as_child(window)?;

    Ok((webview, rx))
}

/// Create the hidden screen webview showing `url`.
pub fn create_screen<W: wry::raw_window_handle::HasWindowHandle>(
    window: &W,
    url: &str,
) -> Result<WebView, wry::Error> {
    WebViewBuilder::new()
        .with_bounds(parked_bounds())
        .with_visible(false)
        .with_url(url)
        .build_as_child(window)
}

/// Bounds of the controls bar along the bottom edge of the window.
#[must_use]
pub fn controls_bounds(window_width: u32, window_height: u32) -> Rect {
    let height = CONTROLS_HEIGHT.min(window_height);
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(
            0,
            window_height.saturating_sub(height) as i32,
        )),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            window_width,
            height,
        )),
    }
}

/// Bounds covering an overlay rectangle, rounded outwards to whole pixels.
#[must_use]
pub fn overlay_bounds(rect: &OverlayRect) -> Rect {
    let x = rect.x.floor();
    let y = rect.y.floor();
    let width = (rect.x + rect.width).ceil() - x;
    let height = (rect.y + rect.height).ceil() - y;
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(
            x as i32, y as i32,
        )),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            width.max(1.0) as u32,
            height.max(1.0) as u32,
        )),
    }
}

/// One-pixel rect off the top-left corner.
fn parked_bounds() -> Rect {
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(-1, -1)),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(1, 1)),
    }
}

/// Move the screen webview to the overlay rect, or hide it.
pub fn place_screen(webview: &WebView, layout: &OverlayLayout) {
    match (layout.visible, &layout.rect) {
        (true, Some(rect)) => {
            let _ = webview.set_bounds(overlay_bounds(rect));
            let _ = webview.set_visible(true);
        }
        _ => {
            let _ = webview.set_visible(false);
        }
    }
}

/// Push the music state to the controls page.
pub fn push_music(webview: &WebView, music: &MusicState) {
    let payload = json!({
        "track": music.track,
        "playing": music.playing,
        "volume": music.effective_volume(),
        "muted": music.muted,
        "slider_visible": music.slider_visible,
        "speaker": music.speaker_level(),
    });
    push(webview, "__deskroom_push_music", &payload);
}

/// Push the zoom label to the controls page.
pub fn push_overlay(webview: &WebView, layout: &OverlayLayout) {
    let payload = json!({ "label": layout.label, "visible": layout.visible });
    push(webview, "__deskroom_push_overlay", &payload);
}

/// Push loading progress to the controls page.
pub fn push_progress(webview: &WebView, progress: &LoadProgress) {
    let payload = json!({
        "percent": progress.percent(),
        "active": progress.active(),
        "item": progress.last_item(),
    });
    push(webview, "__deskroom_push_progress", &payload);
}

// ── Internals ────────────────────────────────────────────────────────────

fn push(webview: &WebView, function: &str, payload: &serde_json::Value) {
    let json = payload.to_string();
    let escaped = json.replace('\\', "\\\\").replace('\'', "\\'");
    let _ = webview.evaluate_script(&format!("window.{function}('{escaped}')"));
}

fn serve_asset(path: &str) -> Response<Cow<'static, [u8]>> {
    let Some(asset) = UiAssets::get(path) else {
        return Response::builder()
            .status(404)
            .body(Cow::from(Vec::new()))
            .unwrap_or_else(|_| Response::new(Cow::from(Vec::new())));
    };
    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    Response::builder()
        .header(CONTENT_TYPE, mime)
        .body(Cow::from(asset.data.to_vec()))
        .unwrap_or_else(|_| Response::new(Cow::from(Vec::new())))
}

/// JavaScript injected before page load. Pushes that arrive before the
/// page registers its listeners are buffered and replayed on attach.
const BRIDGE_JS: &str = r"
(function() {
    var pending = {};

    function define(fnName, eventName) {
        window[fnName] = function(json) {
            pending[eventName] = json;
            window.dispatchEvent(new CustomEvent(eventName, { detail: json }));
        };
    }
    define('__deskroom_push_music', 'deskroom-music');
    define('__deskroom_push_overlay', 'deskroom-overlay');
    define('__deskroom_push_progress', 'deskroom-progress');

    var origAdd = EventTarget.prototype.addEventListener;
    EventTarget.prototype.addEventListener = function(type, fn, opts) {
        origAdd.call(this, type, fn, opts);
        if (this === window && pending[type]) {
            fn(new CustomEvent(type, { detail: pending[type] }));
        }
    };
})();
";

/// Parse an IPC message from the controls page into a [`SceneCommand`].
fn parse_action(msg: &serde_json::Value) -> Option<SceneCommand> {
    let action = msg.get("action")?.as_str()?;
    match action {
        "toggle_lamp" => Some(SceneCommand::ToggleLamp),
        "toggle_zoom" => Some(SceneCommand::ToggleZoom),
        "exit_zoom" => Some(SceneCommand::ExitZoom),
        "toggle_play" => Some(SceneCommand::TogglePlay),
        "toggle_mute" => Some(SceneCommand::ToggleMute),
        "toggle_slider" => Some(SceneCommand::ToggleVolumeSlider),
        "set_volume" => {
            let volume = msg.get("value")?.as_f64()? as f32;
            Some(SceneCommand::SetVolume { volume })
        }
        "step_volume" => {
            let steps = i32::try_from(msg.get("steps")?.as_i64()?).ok()?;
            Some(SceneCommand::StepVolume { steps })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_actions() {
        let msg = json!({ "action": "toggle_lamp" });
        assert_eq!(parse_action(&msg), Some(SceneCommand::ToggleLamp));
        let msg = json!({ "action": "toggle_slider" });
        assert_eq!(parse_action(&msg), Some(SceneCommand::ToggleVolumeSlider));
    }

    #[test]
    fn parses_volume_actions() {
        let msg = json!({ "action": "set_volume", "value": 0.5 });
        assert_eq!(
            parse_action(&msg),
            Some(SceneCommand::SetVolume { volume: 0.5 })
        );
        let msg = json!({ "action": "step_volume", "steps": -2 });
        assert_eq!(
            parse_action(&msg),
            Some(SceneCommand::StepVolume { steps: -2 })
        );
    }

    #[test]
    fn rejects_malformed_messages() {
        assert_eq!(parse_action(&json!({ "action": "reboot" })), None);
        assert_eq!(parse_action(&json!({ "action": "set_volume" })), None);
        assert_eq!(parse_action(&json!({ "value": 1.0 })), None);
    }

    #[test]
    fn overlay_bounds_round_outwards() {
        let rect = OverlayRect {
            x: 10.4,
            y: 20.6,
            width: 99.2,
            height: 49.9,
        };
        let bounds = overlay_bounds(&rect);
        assert_eq!(
            bounds.position,
            dpi::Position::Physical(dpi::PhysicalPosition::new(10, 20))
        );
        assert_eq!(
            bounds.size,
            dpi::Size::Physical(dpi::PhysicalSize::new(100, 51))
        );
    }
}
