//! Standalone desk scene window backed by winit.
//!
//! When the `gui` feature is enabled, wry webviews are created for the
//! controls bar and for the page shown on the desk screen.
//!
//! ```no_run
//! # use deskroom::Viewer;
//! Viewer::builder()
//!     .with_title("Desk")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    engine::DeskEngine,
    error::DeskroomError,
    input::{InputEvent, InputProcessor, MouseButton},
    options::Options,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with the default title and options.
    fn new() -> Self {
        Self {
            options: None,
            title: "Deskroom".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays the desk scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Viewer`] if the event loop cannot be
    /// created or exits with an error.
    pub fn run(self) -> Result<(), DeskroomError> {
        let event_loop = EventLoop::new()
            .map_err(|e| DeskroomError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            input: InputProcessor::with_key_bindings(
                1,
                1,
                self.options.keybindings.clone(),
            ),
            options: Some(self.options),
            title: self.title,
            #[cfg(feature = "gui")]
            webviews: crate::gui::panel::WebviewController::new(),
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| DeskroomError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<DeskEngine>,
    input: InputProcessor,
    options: Option<Options>,
    title: String,
    #[cfg(feature = "gui")]
    webviews: crate::gui::panel::WebviewController,
}

/// The wgpu surface always covers the full window.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    /// Feed an input event through the processor into the engine.
    fn dispatch(&mut self, event: InputEvent) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        if let Some(command) = self.input.handle_event(event) {
            let _ = engine.execute(command);
        }
    }

    fn redraw(&mut self) {
        #[cfg(feature = "gui")]
        if let Some(engine) = &mut self.engine {
            self.webviews.drain_and_apply(engine);
        }

        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };
        if engine.should_render() {
            match engine.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                    let (vp_w, vp_h) = viewport_size(window.inner_size());
                    engine.resize(vp_w, vp_h);
                }
                Err(e) => {
                    log::error!("render error: {e:?}");
                }
            }
        }

        #[cfg(feature = "gui")]
        self.webviews.sync(std::time::Instant::now(), engine);

        window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.75) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let (vp_w, vp_h) = viewport_size(window.inner_size());
        let options = self.options.take().unwrap_or_default();
        let engine = match pollster::block_on(DeskEngine::new(
            window.clone(),
            (vp_w, vp_h),
            options,
        )) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };
        let _ = self.input.handle_event(InputEvent::Resized {
            width: vp_w,
            height: vp_h,
        });

        #[cfg(feature = "gui")]
        self.webviews.init_webviews(window.as_ref(), &engine);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        // Guard: both window and engine must be initialised.
        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(event_size) => {
                let (width, height) = viewport_size(event_size);
                self.dispatch(InputEvent::Resized { width, height });
                #[cfg(feature = "gui")]
                if let Some(window) = &self.window {
                    self.webviews.apply_layout(window);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::MouseInput { button, state, .. } => {
                self.dispatch(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.dispatch(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::Touch(touch) => {
                self.dispatch(InputEvent::TouchMoved {
                    x: touch.location.x as f32,
                    y: touch.location.y as f32,
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                if let (Some(command), Some(engine)) =
                    (self.input.handle_key_press(&key_str), &mut self.engine)
                {
                    let _ = engine.execute(command);
                }
            }

            _ => (),
        }
    }
}
