//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, render targets, growable
//! buffers, pipeline boilerplate and shader composition.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate for the scene pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Depth, offscreen color and sampled textures.
pub mod texture;
