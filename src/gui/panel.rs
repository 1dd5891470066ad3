//! Webview controller: owns the controls bar and the screen page.
//!
//! Keeps `ViewerApp` down to a single `#[cfg(feature = "gui")]` field.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use winit::window::Window;

use super::webview;
use crate::audio::MusicState;
use crate::engine::command::SceneCommand;
use crate::engine::DeskEngine;
use crate::overlay::OverlayLayout;

/// Minimum interval between loading-progress pushes.
const PROGRESS_PUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Owns both webviews and the state last pushed to them.
pub(crate) struct WebviewController {
    controls: Option<wry::WebView>,
    command_rx: Option<mpsc::Receiver<SceneCommand>>,
    screen: Option<wry::WebView>,
    screen_url: String,
    last_layout: Option<OverlayLayout>,
    last_music_push: Option<MusicState>,
    last_progress_push: Instant,
    progress_finished: bool,
}

// ── Construction ─────────────────────────────────────────────────────────

impl WebviewController {
    /// Controller with no webviews yet.
    pub(crate) fn new() -> Self {
        Self {
            controls: None,
            command_rx: None,
            screen: None,
            screen_url: String::new(),
            last_layout: None,
            last_music_push: None,
            last_progress_push: Instant::now(),
            progress_finished: false,
        }
    }

    /// Create both webviews. Failures are logged; the scene keeps running
    /// without them.
    pub(crate) fn init_webviews(&mut self, window: &Window, engine: &DeskEngine) {
        #[cfg(target_os = "linux")]
        if let Err(e) = gtk::init() {
            log::error!("Failed to initialize GTK: {e}");
            return;
        }

        let inner = window.inner_size();
        match webview::create_controls(window, inner.width, inner.height) {
            Ok((wv, rx)) => {
                webview::push_music(&wv, engine.music());
                self.controls = Some(wv);
                self.command_rx = Some(rx);
            }
            Err(e) => log::error!("Failed to create controls webview: {e}"),
        }

        let url = engine.options().overlay.url.clone();
        match webview::create_screen(window, &url) {
            Ok(wv) => {
                self.screen = Some(wv);
                self.screen_url = url;
            }
            Err(e) => log::error!("Failed to create screen webview: {e}"),
        }
    }
}

// ── Runtime ──────────────────────────────────────────────────────────────

impl WebviewController {
    /// Keep the controls bar along the bottom edge after a resize.
    pub(crate) fn apply_layout(&self, window: &Window) {
        let inner = window.inner_size();
        if let Some(ref wv) = self.controls {
            let _ = wv.set_bounds(webview::controls_bounds(
                inner.width,
                inner.height,
            ));
        }
    }

    /// Pump pending GTK events, then execute every command the controls
    /// page sent since the last frame.
    pub(crate) fn drain_and_apply(&self, engine: &mut DeskEngine) {
        #[cfg(target_os = "linux")]
        while gtk::events_pending() {
            let _ = gtk::main_iteration_do(false);
        }

        let Some(ref rx) = self.command_rx else {
            return;
        };
        while let Ok(command) = rx.try_recv() {
            log::debug!("controls: {command:?}");
            let _ = engine.execute(command);
        }
    }

    /// Mirror engine state into the webviews after a frame.
    pub(crate) fn sync(&mut self, now: Instant, engine: &DeskEngine) {
        self.sync_screen(engine);
        let Some(ref controls) = self.controls else {
            return;
        };

        let music = engine.music();
        if self.last_music_push.as_ref() != Some(music) {
            webview::push_music(controls, music);
            self.last_music_push = Some(music.clone());
        }

        let progress = engine.progress();
        if progress.active() {
            self.progress_finished = false;
            if now.duration_since(self.last_progress_push)
                >= PROGRESS_PUSH_INTERVAL
            {
                webview::push_progress(controls, progress);
                self.last_progress_push = now;
            }
        } else if !self.progress_finished {
            webview::push_progress(controls, progress);
            self.progress_finished = true;
        }
    }

    fn sync_screen(&mut self, engine: &DeskEngine) {
        let url = &engine.options().overlay.url;
        if let Some(ref screen) = self.screen {
            if *url != self.screen_url {
                let _ = screen.load_url(url);
                self.screen_url.clone_from(url);
            }
        }
        let layout = engine.overlay_layout();
        if self.last_layout.as_ref() == Some(&layout) {
            return;
        }
        if let Some(ref screen) = self.screen {
            webview::place_screen(screen, &layout);
        }
        if let Some(ref controls) = self.controls {
            webview::push_overlay(controls, &layout);
        }
        self.last_layout = Some(layout);
    }
}
