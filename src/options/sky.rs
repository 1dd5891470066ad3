use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Procedural sky plate colors and placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Sky", inline)]
#[serde(default)]
pub struct SkyOptions {
    /// Sun disc color (linear RGB).
    #[schemars(title = "Sun Color", extend("widget" = "color"))]
    pub sun_color: [f32; 3],
    /// Highlight color.
    #[schemars(title = "Light Color", extend("widget" = "color"))]
    pub light_color: [f32; 3],
    /// Shadowed cloud color.
    #[schemars(title = "Dark Color", extend("widget" = "color"))]
    pub dark_color: [f32; 3],
    /// Base sky gradient color.
    #[schemars(title = "Base Sky Color", extend("widget" = "color"))]
    pub base_sky_color: [f32; 3],
    /// Plate center in world space.
    #[schemars(skip)]
    pub plate_position: [f32; 3],
    /// Plate width and height.
    #[schemars(skip)]
    pub plate_size: [f32; 2],
    /// Tiling noise texture the sky shader scrolls, relative to the texture
    /// directory.
    #[schemars(skip)]
    pub noise_texture: String,
}

impl Default for SkyOptions {
    fn default() -> Self {
        Self {
            sun_color: [0.0, 0.024, 0.243],
            light_color: [0.0, 0.0, 0.0],
            dark_color: [0.380, 0.380, 0.639],
            base_sky_color: [0.835, 0.349, 0.349],
            plate_position: [-5.0, 11.0, -30.0],
            plate_size: [50.0, 40.0],
            noise_texture: "4.png".into(),
        }
    }
}

/// Floating dust particle field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Sparkles", inline)]
#[serde(default)]
pub struct SparkleOptions {
    /// Number of particles.
    #[schemars(title = "Count", range(min = 0, max = 500))]
    pub count: u32,
    /// Point size in pixels.
    #[schemars(title = "Size", range(min = 0.5, max = 8.0), extend("step" = 0.5))]
    pub size: f32,
    /// Drift speed multiplier.
    #[schemars(title = "Speed", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub speed: f32,
    /// Box extent the particles are scattered in.
    #[schemars(skip)]
    pub scale: [f32; 3],
    /// Box center.
    #[schemars(skip)]
    pub position: [f32; 3],
}

impl Default for SparkleOptions {
    fn default() -> Self {
        Self {
            count: 50,
            size: 2.0,
            speed: 0.2,
            scale: [3.0, 2.0, 3.0],
            position: [-2.0, 1.0, -2.0],
        }
    }
}
