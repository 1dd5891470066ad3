//! The desk scene engine.
//!
//! [`DeskEngine`] wires the CPU session ([`DeskSession`]) to the GPU
//! ([`SceneRenderer`]) and the background asset loader. Embedders feed it
//! [`SceneCommand`]s and call [`render`](DeskEngine::render) once per
//! frame.

pub mod command;
pub mod session;

pub use command::SceneCommand;
pub use session::{DeskSession, GpuTextureUpdate};

use crate::audio::MusicState;
use crate::camera::gpu::CameraBuffer;
use crate::error::DeskroomError;
use crate::gpu::render_context::RenderContext;
use crate::options::Options;
use crate::overlay::OverlayLayout;
use crate::renderer::SceneRenderer;
use crate::scene::loader::{AssetLoader, AssetRequest};
use crate::scene::LoadProgress;
use crate::util::frame_timing::FrameTiming;

/// Target FPS limit.
const TARGET_FPS: u32 = 144;

/// Real-time desk scene: camera rig, dual-pass glass, sky, sparkles.
///
/// # Frame loop
///
/// Each frame [`render`](Self::render):
/// 1. drains finished assets from the loader thread,
/// 2. advances the camera rig and the sky clock,
/// 3. uploads camera and scene uniforms,
/// 4. renders the transmission pass, then the final pass with glass
///    sampling it,
/// 5. applies the gradient-map grade when one is loaded, and presents.
///
/// Call [`resize`](Self::resize) when the window size changes and
/// [`execute`](Self::execute) for every user action.
pub struct DeskEngine {
    /// GPU device, queue and surface.
    pub context: RenderContext,
    camera_buffer: CameraBuffer,
    renderer: SceneRenderer,
    session: DeskSession,
    loader: Option<AssetLoader>,
    frame_timing: FrameTiming,
}

impl DeskEngine {
    /// Create the engine and start loading the configured assets.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Gpu`] if the GPU cannot be initialized,
    /// [`DeskroomError::Shader`] if a shader fails to compose, or
    /// [`DeskroomError::ThreadSpawn`] if the loader thread cannot start.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, DeskroomError> {
        let context = RenderContext::new(window, size).await?;
        let session = DeskSession::new(options, context.size());
        let camera_buffer = CameraBuffer::new(&context, &session.camera().camera);
        let renderer =
            SceneRenderer::new(&context, &camera_buffer.layout, session.options())?;

        let mut engine = Self {
            context,
            camera_buffer,
            renderer,
            session,
            loader: None,
            frame_timing: FrameTiming::new(TARGET_FPS),
        };
        engine.start_loading()?;
        Ok(engine)
    }

    /// Spawn a loader for the assets the current options name. A loader
    /// still running is dropped; its remaining results are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::ThreadSpawn`] if the thread cannot start.
    pub fn start_loading(&mut self) -> Result<(), DeskroomError> {
        let request = AssetRequest::from_options(self.session.options());
        let loader = AssetLoader::spawn(request)?;
        log::info!("loading {} assets", loader.total());
        self.session.begin_loading(loader.total());
        self.loader = Some(loader);
        Ok(())
    }

    /// Apply every asset the loader finished since the last frame.
    fn drain_assets(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        let events = loader.drain();
        for event in events {
            let update = self.session.apply_asset_event(event);
            let device = &self.context.device;
            let queue = &self.context.queue;
            match update {
                Some(GpuTextureUpdate::GlassNormal(data)) => {
                    self.renderer.set_normal_map(device, queue, &data);
                }
                Some(GpuTextureUpdate::SkyNoise(data)) => {
                    self.renderer.set_noise_texture(device, queue, &data);
                }
                Some(GpuTextureUpdate::GradientMap(data)) => {
                    self.renderer.set_gradient_map(device, queue, &data);
                }
                None => {}
            }
        }
        if !self.session.progress().active() {
            if let Some(mut loader) = self.loader.take() {
                loader.join();
                let progress = self.session.progress();
                log::info!(
                    "assets ready: {} loaded, {} failed",
                    progress.loaded(),
                    progress.failed()
                );
            }
        }
    }

    /// Execute a command. Returns `true` when it changed anything.
    pub fn execute(&mut self, command: SceneCommand) -> bool {
        if let SceneCommand::Resize { width, height } = command {
            self.resize(width, height);
            return width > 0 && height > 0;
        }
        self.session.execute(command)
    }

    /// Follow a window resize. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.renderer.resize(&self.context.device, width, height);
        let _ = self
            .session
            .execute(SceneCommand::Resize { width, height });
    }

    /// Whether the frame limiter allows another frame.
    pub fn should_render(&self) -> bool {
        self.frame_timing.should_render()
    }

    /// Advance one frame and present it.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the next swapchain texture cannot
    /// be acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let dt = self.frame_timing.begin_frame();
        self.drain_assets();
        let _ = self.session.update(dt);

        let queue = &self.context.queue;
        self.camera_buffer.update(queue, &self.session.camera().camera);
        self.renderer
            .update_scene_uniform(queue, &self.session.scene_uniform());
        self.renderer.sync(
            &self.context.device,
            queue,
            self.session.scene_mut(),
        );

        let output = self.context.next_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.create_encoder();
        {
            let mut frame = self.renderer.frame(
                &mut encoder,
                &view,
                &self.camera_buffer.bind_group,
            );
            self.session.render(&mut frame);
            frame.finish();
        }
        self.context.submit(encoder);
        output.present();
        Ok(())
    }

    /// Replace the options at runtime.
    pub fn set_options(&mut self, options: Options) {
        self.renderer.apply_options(
            &self.context.device,
            &self.context.queue,
            &options,
        );
        self.session.set_options(options);
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        self.session.options()
    }

    /// Where the embedded page goes this frame.
    pub fn overlay_layout(&self) -> OverlayLayout {
        self.session.overlay_layout()
    }

    /// Music state for the controls page.
    pub fn music(&self) -> &MusicState {
        self.session.music()
    }

    /// Loading progress.
    pub fn progress(&self) -> &LoadProgress {
        self.session.progress()
    }

    /// The CPU session.
    pub fn session(&self) -> &DeskSession {
        &self.session
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }
}
