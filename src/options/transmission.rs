use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Glass material parameters and offscreen buffer sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Glass", inline)]
#[serde(default)]
pub struct TransmissionOptions {
    /// Fraction of the background plate seen through the glass.
    #[schemars(title = "Transmission", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub transmission: f32,
    /// Surface roughness (blurs the sampled plate).
    #[schemars(title = "Roughness", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub roughness: f32,
    /// Refraction thickness in world units.
    #[schemars(title = "Thickness", range(min = 0.0, max = 1.0), extend("step" = 0.005))]
    pub thickness: f32,
    /// Normal map strength on both tangent axes.
    #[schemars(title = "Normal Scale", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub normal_scale: f32,
    /// Glass tint (linear RGB).
    #[schemars(skip)]
    pub color: [f32; 3],
    /// Normal map texture, relative to the texture directory.
    #[schemars(skip)]
    pub normal_map: String,
    /// Fixed offscreen buffer size; `None` follows the viewport.
    #[schemars(skip)]
    pub buffer_size: Option<[u32; 2]>,
}

impl TransmissionOptions {
    /// Transmission factor clamped to `[0, 1]`.
    #[must_use]
    pub fn clamped_transmission(&self) -> f32 {
        self.transmission.clamp(0.0, 1.0)
    }
}

impl Default for TransmissionOptions {
    fn default() -> Self {
        Self {
            transmission: 1.0,
            roughness: 0.01,
            thickness: 0.01,
            normal_scale: 0.4,
            color: [1.0, 1.0, 1.0],
            normal_map: "dirt1.png".into(),
            buffer_size: None,
        }
    }
}
