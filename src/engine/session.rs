//! CPU side of a scene session.
//!
//! [`DeskSession`] holds everything the desk scene decides per frame
//! (scene graph, camera rig, lamp, music, loading progress, overlay) and
//! none of the GPU resources, so the whole command vocabulary runs and is
//! tested without a device.

use super::command::SceneCommand;
use crate::audio::MusicState;
use crate::camera::controller::CameraController;
use crate::camera::rig::RigMode;
use crate::input::PointerSample;
use crate::options::Options;
use crate::overlay::{OverlayLayout, ScreenOverlay};
use crate::renderer::{
    SceneUniform, SkyClock, TransmissionRenderer, TransmissionTarget,
};
use crate::scene::loader::{AssetEvent, LoadedNode, TextureSlot};
use crate::scene::procedural::{self, SKY_PLATE};
use crate::scene::{
    GlassSurfaceSet, LampState, LoadProgress, NodeHandle, NodeMaterial,
    SceneGraph, TextureData,
};

/// Fallback color for model nodes until their baked texture arrives.
const UNTEXTURED_TINT: [f32; 3] = [0.6, 0.6, 0.6];

/// A texture the GPU side must take over.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuTextureUpdate {
    /// New glass normal map.
    GlassNormal(TextureData),
    /// New sky noise texture.
    SkyNoise(TextureData),
    /// New colour-grade gradient.
    GradientMap(TextureData),
}

/// Scene state and command handling for one session.
pub struct DeskSession {
    options: Options,
    scene: SceneGraph,
    transmission: TransmissionRenderer,
    camera: CameraController,
    overlay: ScreenOverlay,
    lamp: LampState,
    lamp_node: Option<NodeHandle>,
    music: MusicState,
    progress: LoadProgress,
    sky_clock: SkyClock,
    viewport: (u32, u32),
}

impl DeskSession {
    /// Session showing the procedural room until a model arrives.
    pub fn new(options: Options, viewport: (u32, u32)) -> Self {
        let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
        let mut session = Self {
            scene: SceneGraph::new(),
            transmission: TransmissionRenderer::new(GlassSurfaceSet::new(
                &options.assets.glass,
            )),
            camera: CameraController::new(&options.camera, aspect),
            overlay: ScreenOverlay::new(&options.overlay),
            lamp: LampState::default(),
            lamp_node: None,
            music: MusicState::new(&options.audio),
            progress: LoadProgress::default(),
            sky_clock: SkyClock::default(),
            viewport,
            options,
        };
        procedural::build_room(&mut session.scene);
        session.finish_structure();
        session
    }

    /// Add the sky plate and re-resolve every node the session tracks by
    /// name.
    fn finish_structure(&mut self) {
        let _ = procedural::add_sky_plate(&mut self.scene, &self.options.sky);
        self.transmission.resolve(&self.scene, SKY_PLATE);
        self.overlay
            .resolve(&self.scene, &self.options.assets.screen_node);
        self.lamp_node = self.scene.find(&self.options.assets.lamp_node);
    }

    /// Replace the scene with nodes read from a model file.
    pub fn load_model(&mut self, nodes: Vec<LoadedNode>) {
        self.scene.clear();
        for node in nodes {
            let material = if self.options.assets.glass.contains(&node.name) {
                NodeMaterial::Glass
            } else {
                NodeMaterial::Baked {
                    texture: None,
                    tint: UNTEXTURED_TINT,
                }
            };
            let _ = self.scene.insert(
                &node.name,
                node.transform,
                Some(node.mesh),
                material,
            );
        }
        self.finish_structure();
        log::info!("scene rebuilt from model: {} nodes", self.scene.len());
    }

    /// Start tracking a loader that will report `total` assets.
    pub fn begin_loading(&mut self, total: usize) {
        self.progress.begin(total);
    }

    /// Apply one loader result. Textures that live on the GPU side only are
    /// handed back.
    pub fn apply_asset_event(
        &mut self,
        event: AssetEvent,
    ) -> Option<GpuTextureUpdate> {
        match event {
            AssetEvent::Model { path, nodes } => {
                self.load_model(nodes);
                self.progress.record_loaded(&path);
                None
            }
            AssetEvent::Texture {
                path,
                slot,
                texture,
            } => {
                self.progress.record_loaded(&path);
                match slot {
                    TextureSlot::Baked(name) => {
                        let attached = self.scene.find(&name).is_some_and(|h| {
                            self.scene.set_baked_texture(h, texture)
                        });
                        if !attached {
                            log::debug!("no baked node '{name}' for {path}");
                        }
                        None
                    }
                    TextureSlot::GlassNormal => {
                        Some(GpuTextureUpdate::GlassNormal(texture))
                    }
                    TextureSlot::SkyNoise => {
                        Some(GpuTextureUpdate::SkyNoise(texture))
                    }
                    TextureSlot::GradientMap => {
                        Some(GpuTextureUpdate::GradientMap(texture))
                    }
                }
            }
            AssetEvent::Failed { path, error } => {
                log::warn!("failed to load {path}: {error}");
                self.progress.record_failed(&path);
                None
            }
        }
    }

    /// Execute a command. Returns `true` when it changed anything.
    pub fn execute(&mut self, command: SceneCommand) -> bool {
        match command {
            SceneCommand::SetPointer { sample } => {
                self.camera.set_pointer(sample);
                true
            }
            SceneCommand::ToggleZoom => {
                let target = self
                    .overlay
                    .screen()
                    .and_then(|h| self.scene.zoom_target(h));
                self.camera.toggle_zoom(target.as_ref())
            }
            SceneCommand::ExitZoom => self.camera.exit_zoom(),
            SceneCommand::Click { sample } => self.click(sample),
            SceneCommand::Resize { width, height } => {
                if width == 0 || height == 0 {
                    return false;
                }
                self.viewport = (width, height);
                self.camera.resize(width, height);
                true
            }
            SceneCommand::ToggleLamp => {
                self.lamp = self.lamp.toggled();
                log::debug!("lamp {}", if self.lamp.on { "on" } else { "off" });
                true
            }
            SceneCommand::TogglePlay => self.update_music(MusicState::toggle_play),
            SceneCommand::ToggleMute => self.update_music(MusicState::toggle_mute),
            SceneCommand::SetVolume { volume } => {
                self.update_music(|m| m.with_volume(volume))
            }
            SceneCommand::StepVolume { steps } => {
                self.update_music(|m| m.step_volume(steps))
            }
            SceneCommand::ToggleVolumeSlider => {
                self.update_music(MusicState::toggle_slider)
            }
        }
    }

    fn update_music(
        &mut self,
        f: impl FnOnce(MusicState) -> MusicState,
    ) -> bool {
        let next = f(self.music.clone());
        let changed = next != self.music;
        self.music = next;
        changed
    }

    /// Clicking the lamp toggles it; clicks elsewhere do nothing.
    fn click(&mut self, sample: PointerSample) -> bool {
        let (origin, dir) =
            self.camera.camera.screen_ray(sample.x(), sample.y());
        let hit = self.scene.pick(origin, dir);
        if hit.is_some() && hit == self.lamp_node {
            self.execute(SceneCommand::ToggleLamp)
        } else {
            false
        }
    }

    /// Advance the camera rig and sky clock. Returns `true` while the
    /// camera is moving.
    pub fn update(&mut self, dt: f32) -> bool {
        let _ = self.sky_clock.advance(dt);
        self.camera.update(dt)
    }

    /// Run the dual transmission pass against `target`.
    pub fn render<T: TransmissionTarget>(&mut self, target: &mut T) {
        self.transmission.render_frame(&mut self.scene, target);
    }

    /// Per-frame shader values.
    pub fn scene_uniform(&self) -> SceneUniform {
        SceneUniform::new(
            &self.options,
            self.lamp,
            self.viewport,
            self.sky_clock.time(),
        )
    }

    /// Where the embedded page goes this frame.
    pub fn overlay_layout(&self) -> OverlayLayout {
        self.overlay.layout(
            &self.scene,
            &self.camera.camera,
            self.viewport,
            self.camera.is_zoomed(),
        )
    }

    /// Replace the options. Camera mode and pose, lamp and music are kept;
    /// the sky plate is rebuilt.
    pub fn set_options(&mut self, options: Options) {
        self.camera.apply_options(&options.camera);
        self.overlay.set_options(&options.overlay);
        self.transmission = TransmissionRenderer::new(GlassSurfaceSet::new(
            &options.assets.glass,
        ));
        self.options = options;
        self.finish_structure();
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The scene graph.
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Mutable scene graph (for renderer sync).
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// The camera controller.
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Camera rig mode.
    pub fn rig_mode(&self) -> RigMode {
        self.camera.mode()
    }

    /// Lamp state.
    pub fn lamp(&self) -> LampState {
        self.lamp
    }

    /// Music state.
    pub fn music(&self) -> &MusicState {
        &self.music
    }

    /// Loading progress.
    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    /// Viewport size in pixels.
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}
