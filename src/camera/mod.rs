//! Camera system for the desk scene.
//!
//! A pointer-driven rig constrained to a narrow cone around the desk, with
//! a damped transition that frames the computer screen head-on.

/// Damped camera controller driving the rig toward its goal.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Critically damped smoothing helpers.
pub mod damping;
/// Screen framing math for the zoomed view.
pub mod framing;
/// Camera uniform buffer and bind group.
pub mod gpu;
/// Rig state and its pure transitions.
pub mod rig;
