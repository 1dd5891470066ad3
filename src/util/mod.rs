//! Shared utilities.

/// Frame delta time, FPS estimation, and frame limiting.
pub mod frame_timing;
