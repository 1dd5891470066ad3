//! Rendering of the desk scene.
//!
//! [`transmission::TransmissionRenderer`] drives the dual pass that lets the
//! window glass show the sky behind it; [`scene_renderer::SceneRenderer`]
//! owns the GPU resources those passes draw with, and
//! [`gradient_map::GradientMapPass`] grades the final image.

pub mod gradient_map;
pub mod scene_renderer;
pub mod sparkles;
pub mod texture_cache;
pub mod transmission;
pub mod uniforms;

pub use scene_renderer::{SceneFrame, SceneRenderer};
pub use transmission::{
    RenderTargetBinding, TransmissionRenderer, TransmissionTarget,
};
pub use texture_cache::TextureCache;
pub use uniforms::{NodeUniform, SceneUniform, SkyClock};
