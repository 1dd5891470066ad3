// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (clippy default thresholds)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Real-time desk scene renderer built on wgpu.
//!
//! Deskroom renders a furnished room around a desk: baked-texture objects,
//! window panes that show the procedural sky through a transmission pass,
//! floating sparkles, a desk lamp that can be switched on and off, and a
//! webpage laid over the computer screen.
//!
//! # Key entry points
//!
//! - [`engine::DeskEngine`] - the GPU engine
//! - [`engine::DeskSession`] - all per-frame scene state, usable without a
//!   GPU
//! - [`camera::controller::CameraController`] - pointer-driven camera rig
//!   with zoom onto the screen
//! - [`options::Options`] - runtime configuration (camera, glass, sky,
//!   assets, overlay, audio, key bindings)
//!
//! # Architecture
//!
//! Assets load on a background [`scene::loader::AssetLoader`] thread and
//! are applied at the start of the next frame. Each frame renders the scene
//! twice through [`renderer::TransmissionRenderer`]: once offscreen with the
//! sky plate shown and the glass hidden, then to the window with the glass
//! sampling that offscreen image.

pub mod audio;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
#[cfg(feature = "gui")]
pub mod gui;
pub mod input;
pub mod options;
pub mod overlay;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::{DeskEngine, DeskSession, SceneCommand};
pub use error::DeskroomError;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;

#[cfg(test)]
mod tests {
    use std::path::Path;

    /// Every file the manifest points at is checked in.
    #[test]
    fn manifest_files_exist() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let manifest = include_str!("../Cargo.toml");
        for line in manifest.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if !matches!(key.trim(), "readme" | "license-file" | "build") {
                continue;
            }
            let file = value.trim().trim_matches('"');
            assert!(root.join(file).is_file(), "{file} is missing");
        }
    }
}
