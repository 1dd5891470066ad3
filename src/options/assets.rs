use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the scene's model and baked textures come from, and which named
/// nodes play which role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Assets", inline)]
#[serde(default)]
pub struct AssetOptions {
    /// glTF/GLB model; `None` builds the procedural room.
    pub model_path: Option<String>,
    /// Directory holding `<object>.jpg` baked textures.
    pub texture_dir: String,
    /// Opaque objects drawn with their baked texture.
    pub objects: Vec<String>,
    /// Window panes drawn with the transmission material.
    pub glass: Vec<String>,
    /// Node the embedded page is aligned to.
    pub screen_node: String,
    /// Node that toggles the lamp when clicked.
    pub lamp_node: String,
}

impl Default for AssetOptions {
    fn default() -> Self {
        let objects = [
            "book",
            "chair2",
            "curtain",
            "coffee",
            "window1",
            "window2",
            "computer",
            "desk_lamp",
            "ceiling",
            "wall1",
            "wall2",
            "floor",
            "desk",
            "keyboard",
            "mouse",
            "plant1",
            "plant2",
            "plant3",
            "floor_lamp",
            "curtain_stick",
            "poster1",
            "poster2",
            "poster3",
            "phone",
        ];
        let glass =
            ["window1glass1", "window1glass2", "window2glass1", "window2glass2"];
        Self {
            model_path: None,
            texture_dir: "assets/textures".into(),
            objects: objects.iter().map(|s| (*s).to_owned()).collect(),
            glass: glass.iter().map(|s| (*s).to_owned()).collect(),
            screen_node: "screen".into(),
            lamp_node: "desk_lamp".into(),
        }
    }
}

/// Embedded page shown on the screen mesh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Screen", inline)]
#[serde(default)]
pub struct OverlayOptions {
    /// Page loaded into the screen webview.
    #[schemars(skip)]
    pub url: String,
    /// Label shown while the camera is constrained.
    #[schemars(skip)]
    pub view_label: String,
    /// Label shown while zoomed onto the screen.
    #[schemars(skip)]
    pub return_label: String,
    /// Hide the page while the camera is not zoomed.
    #[schemars(title = "Only When Zoomed")]
    pub only_when_zoomed: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            url: "https://example.com/".into(),
            view_label: "View".into(),
            return_label: "Return".into(),
            only_when_zoomed: false,
        }
    }
}

/// Background music defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Music", inline)]
#[serde(default)]
pub struct AudioOptions {
    /// Track file served to the controls page.
    #[schemars(skip)]
    pub track: String,
    /// Initial volume in `[0, 1]`.
    #[schemars(title = "Volume", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub volume: f32,
    /// Start playing as soon as the page loads.
    #[schemars(title = "Autoplay")]
    pub autoplay: bool,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            track: "city-of-love-135610.mp3".into(),
            volume: 0.2,
            autoplay: true,
        }
    }
}
