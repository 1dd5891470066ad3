use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection, rig bounds, and transition parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Default look-at point of the rig.
    #[schemars(skip)]
    pub target: [f32; 3],
    /// Fixed orbit distance while constrained.
    #[schemars(skip)]
    pub distance: f32,
    /// Azimuth bound magnitude reached with the pointer at the right edge.
    #[schemars(title = "Min Azimuth", range(min = -3.2, max = 3.2), extend("step" = 0.01))]
    pub min_azimuth: f32,
    /// Azimuth bound magnitude reached with the pointer at the left edge.
    #[schemars(title = "Max Azimuth", range(min = -3.2, max = 3.2), extend("step" = 0.01))]
    pub max_azimuth: f32,
    /// Polar angle reached with the pointer at the bottom edge.
    #[schemars(title = "Min Polar", range(min = 0.0, max = 3.2), extend("step" = 0.01))]
    pub min_polar: f32,
    /// Polar angle reached with the pointer at the top edge.
    #[schemars(title = "Max Polar", range(min = 0.0, max = 3.2), extend("step" = 0.01))]
    pub max_polar: f32,
    /// Damping time constant in seconds (0 snaps instantly).
    #[schemars(title = "Smooth Time", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub smooth_time: f32,
    /// Margin multiplier applied when framing the screen.
    #[schemars(skip)]
    pub zoom_margin: f32,
    /// Vertical offset added to the screen center when zoomed.
    #[schemars(skip)]
    pub zoom_look_offset: f32,
    /// Distance below which a transition counts as settled.
    #[schemars(skip)]
    pub settle_epsilon: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            target: [-3.2, 1.4, -3.5],
            distance: 3.03,
            min_azimuth: 0.2,
            max_azimuth: 0.28,
            min_polar: 1.58,
            max_polar: 1.72,
            smooth_time: 0.25,
            zoom_margin: 1.3,
            zoom_look_offset: 0.02,
            settle_epsilon: 1e-3,
        }
    }
}
