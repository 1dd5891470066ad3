use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Full-screen gradient-map colour grade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Gradient Map", inline)]
#[serde(default)]
pub struct GradientMapOptions {
    /// Gradient texture, relative to the texture directory. `None`
    /// disables the grade.
    #[schemars(skip)]
    pub texture: Option<String>,
    /// Blend of the gradient colour over the scene.
    #[schemars(title = "Opacity", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub opacity: f32,
}

impl GradientMapOptions {
    /// Opacity clamped to `[0, 1]`.
    #[must_use]
    pub fn clamped_opacity(&self) -> f32 {
        self.opacity.clamp(0.0, 1.0)
    }
}

impl Default for GradientMapOptions {
    fn default() -> Self {
        Self {
            texture: None,
            opacity: 0.2,
        }
    }
}
