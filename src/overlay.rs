//! Placement of the embedded page over the desk screen.
//!
//! The page is a 2D surface laid over the window. Each frame the screen
//! node's world bounds are projected through the active camera; the page
//! covers their pixel rectangle. The "view/return" label follows the camera
//! rig's zoom state.

use serde::Serialize;

use crate::camera::core::Camera;
use crate::options::OverlayOptions;
use crate::scene::{NodeHandle, SceneGraph};

/// Pixel rectangle, origin at the window's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Where and whether to show the page this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayout {
    /// Screen rectangle, `None` when the screen node is unresolved or
    /// (partly) behind the camera.
    pub rect: Option<OverlayRect>,
    /// Whether the page should be shown.
    pub visible: bool,
    /// Text of the zoom toggle.
    pub label: String,
}

/// Tracks the screen node and computes [`OverlayLayout`]s.
#[derive(Debug, Clone)]
pub struct ScreenOverlay {
    options: OverlayOptions,
    screen: Option<NodeHandle>,
}

impl ScreenOverlay {
    /// Overlay with no resolved screen yet.
    pub fn new(options: &OverlayOptions) -> Self {
        Self {
            options: options.clone(),
            screen: None,
        }
    }

    /// Look up the screen node. Call after any structural scene change.
    pub fn resolve(&mut self, scene: &SceneGraph, screen_node: &str) {
        self.screen = scene.find(screen_node);
        if self.screen.is_none() {
            log::debug!("overlay: screen node '{screen_node}' not found");
        }
    }

    /// Resolved screen node.
    pub fn screen(&self) -> Option<NodeHandle> {
        self.screen
    }

    /// Replace the overlay options.
    pub fn set_options(&mut self, options: &OverlayOptions) {
        self.options.clone_from(options);
    }

    /// Page address.
    pub fn url(&self) -> &str {
        &self.options.url
    }

    /// Label for the zoom toggle.
    pub fn label(&self, zoomed: bool) -> &str {
        if zoomed {
            &self.options.return_label
        } else {
            &self.options.view_label
        }
    }

    /// Layout for the current camera and viewport size in pixels.
    pub fn layout(
        &self,
        scene: &SceneGraph,
        camera: &Camera,
        viewport: (u32, u32),
        zoomed: bool,
    ) -> OverlayLayout {
        let rect = self
            .screen
            .and_then(|h| scene.node(h))
            .and_then(|node| {
                project_bounds(&node.world_bounds().corners(), camera, viewport)
            });
        let visible =
            rect.is_some() && (zoomed || !self.options.only_when_zoomed);
        OverlayLayout {
            rect,
            visible,
            label: self.label(zoomed).to_owned(),
        }
    }
}

/// Pixel rectangle covering every projected point, or `None` if any lies
/// behind the camera or the result is degenerate.
fn project_bounds(
    points: &[glam::Vec3],
    camera: &Camera,
    (width, height): (u32, u32),
) -> Option<OverlayRect> {
    let mut min = glam::Vec2::splat(f32::INFINITY);
    let mut max = glam::Vec2::splat(f32::NEG_INFINITY);
    for p in points {
        let (x, y) = camera.project_to_screen(*p)?;
        let px = glam::Vec2::new(x * width as f32, y * height as f32);
        min = min.min(px);
        max = max.max(px);
    }
    let size = max - min;
    (size.x >= 1.0 && size.y >= 1.0).then_some(OverlayRect {
        x: min.x,
        y: min.y,
        width: size.x,
        height: size.y,
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::procedural::quad;
    use crate::scene::{NodeMaterial, Transform};

    fn setup() -> (SceneGraph, ScreenOverlay, Camera) {
        let mut scene = SceneGraph::new();
        let _ = scene.insert(
            "screen",
            Transform::IDENTITY,
            Some(quad(1.0, 1.0)),
            NodeMaterial::Glass,
        );
        let mut overlay = ScreenOverlay::new(&OverlayOptions::default());
        overlay.resolve(&scene, "screen");
        let camera = Camera {
            eye: Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy: 90.0,
            znear: 0.1,
            zfar: 100.0,
        };
        (scene, overlay, camera)
    }

    #[test]
    fn projects_screen_to_centered_rect() {
        let (scene, overlay, camera) = setup();
        let layout = overlay.layout(&scene, &camera, (800, 800), false);
        let rect = layout.rect.unwrap();
        assert!((rect.x - 300.0).abs() < 0.5);
        assert!((rect.y - 300.0).abs() < 0.5);
        assert!((rect.width - 200.0).abs() < 0.5);
        assert!((rect.height - 200.0).abs() < 0.5);
        assert!(layout.visible);
        assert_eq!(layout.label, "View");
    }

    #[test]
    fn behind_camera_has_no_rect() {
        let (scene, overlay, mut camera) = setup();
        camera.eye = Vec3::new(0.0, 0.0, -2.0);
        camera.target = Vec3::new(0.0, 0.0, -4.0);
        let layout = overlay.layout(&scene, &camera, (800, 800), false);
        assert_eq!(layout.rect, None);
        assert!(!layout.visible);
    }

    #[test]
    fn only_when_zoomed_hides_until_zoom() {
        let (scene, mut overlay, camera) = setup();
        overlay.set_options(&OverlayOptions {
            only_when_zoomed: true,
            ..OverlayOptions::default()
        });
        assert!(!overlay.layout(&scene, &camera, (800, 800), false).visible);
        let zoomed = overlay.layout(&scene, &camera, (800, 800), true);
        assert!(zoomed.visible);
        assert_eq!(zoomed.label, "Return");
    }

    #[test]
    fn unresolved_screen_is_hidden() {
        let (_, mut overlay, camera) = setup();
        let empty = SceneGraph::new();
        overlay.resolve(&empty, "screen");
        assert!(overlay.screen().is_none());
        assert!(!overlay.layout(&empty, &camera, (800, 800), true).visible);
    }
}
