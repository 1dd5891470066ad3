//! Background asset loading.
//!
//! A worker thread reads the room model and the baked textures and sends
//! each result as an [`AssetEvent`]. The engine drains the channel at the
//! start of every frame, so loading never blocks rendering and a failed
//! asset only costs that asset.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use glam::{Mat4, Quat, Vec3};

use super::{MeshData, MeshVertex, TextureData, Transform};
use crate::error::DeskroomError;
use crate::options::Options;

/// A named mesh node read from the model file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedNode {
    /// Node name.
    pub name: String,
    /// World transform.
    pub transform: Transform,
    /// Geometry of all primitives, in node space.
    pub mesh: MeshData,
}

/// What a loaded texture is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSlot {
    /// Baked lighting texture of the named node.
    Baked(String),
    /// Glass normal map.
    GlassNormal,
    /// Sky noise.
    SkyNoise,
    /// Colour-grade gradient.
    GradientMap,
}

/// Result of one asset.
#[derive(Debug)]
pub enum AssetEvent {
    /// The model file finished loading.
    Model {
        /// Source path.
        path: String,
        /// Every named mesh node.
        nodes: Vec<LoadedNode>,
    },
    /// A texture finished decoding.
    Texture {
        /// Source path.
        path: String,
        /// Where the texture goes.
        slot: TextureSlot,
        /// Decoded pixels.
        texture: TextureData,
    },
    /// An asset could not be loaded.
    Failed {
        /// Source path.
        path: String,
        /// Why.
        error: DeskroomError,
    },
}

impl AssetEvent {
    /// Path of the asset this event reports on.
    pub fn path(&self) -> &str {
        match self {
            Self::Model { path, .. }
            | Self::Texture { path, .. }
            | Self::Failed { path, .. } => path,
        }
    }
}

/// Everything the loader thread needs, detached from [`Options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Model file, if any.
    pub model: Option<PathBuf>,
    /// Baked textures to read, keyed by node name.
    pub textures: Vec<(TextureSlot, PathBuf)>,
}

impl AssetRequest {
    /// Request derived from options: the model plus `<name>.jpg` for every
    /// object, the glass normal map, the sky noise and the grading gradient
    /// if one is configured.
    pub fn from_options(options: &Options) -> Self {
        let dir = Path::new(&options.assets.texture_dir);
        let mut textures: Vec<_> = options
            .assets
            .objects
            .iter()
            .map(|name| {
                (TextureSlot::Baked(name.clone()), dir.join(format!("{name}.jpg")))
            })
            .collect();
        textures.push((
            TextureSlot::GlassNormal,
            dir.join(&options.transmission.normal_map),
        ));
        textures.push((TextureSlot::SkyNoise, dir.join(&options.sky.noise_texture)));
        if let Some(gradient) = &options.gradient_map.texture {
            textures.push((TextureSlot::GradientMap, dir.join(gradient)));
        }
        Self {
            model: options.assets.model_path.as_ref().map(PathBuf::from),
            textures,
        }
    }

    /// Number of events the loader will send.
    pub fn total(&self) -> usize {
        usize::from(self.model.is_some()) + self.textures.len()
    }
}

/// Handle to a running loader thread.
pub struct AssetLoader {
    receiver: mpsc::Receiver<AssetEvent>,
    total: usize,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl AssetLoader {
    /// Spawn the loader thread.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::ThreadSpawn`] if the thread fails to spawn.
    pub fn spawn(request: AssetRequest) -> Result<Self, DeskroomError> {
        let (tx, receiver) = mpsc::channel();
        let total = request.total();
        let thread = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || run(&request, &tx))
            .map_err(DeskroomError::ThreadSpawn)?;
        Ok(Self {
            receiver,
            total,
            thread: Some(thread),
        })
    }

    /// Number of events this loader will produce.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Non-blocking: every event that arrived since the last call.
    pub fn drain(&self) -> Vec<AssetEvent> {
        self.receiver.try_iter().collect()
    }

    /// Wait for the thread to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn run(request: &AssetRequest, tx: &mpsc::Sender<AssetEvent>) {
    if let Some(model) = &request.model {
        let path = model.display().to_string();
        let event = match load_model(model) {
            Ok(nodes) => {
                log::info!("loaded model {path}: {} nodes", nodes.len());
                AssetEvent::Model { path, nodes }
            }
            Err(error) => AssetEvent::Failed { path, error },
        };
        if tx.send(event).is_err() {
            return;
        }
    }
    for (slot, file) in &request.textures {
        let path = file.display().to_string();
        let event = match load_texture(file) {
            Ok(texture) => AssetEvent::Texture {
                path,
                slot: slot.clone(),
                texture,
            },
            Err(error) => AssetEvent::Failed { path, error },
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}

/// Decode an image file into RGBA8.
///
/// # Errors
///
/// Returns [`DeskroomError::TextureLoad`] if the file cannot be read or
/// decoded.
pub fn load_texture(path: &Path) -> Result<TextureData, DeskroomError> {
    let image = image::open(path)?.into_rgba8();
    Ok(TextureData {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Read every named mesh node of a glTF/GLB file.
///
/// Node transforms are composed down the hierarchy. All primitives of a
/// node's mesh are merged into one [`MeshData`].
///
/// # Errors
///
/// Returns [`DeskroomError::ModelLoad`] if the file cannot be imported.
pub fn load_model(path: &Path) -> Result<Vec<LoadedNode>, DeskroomError> {
    let (document, buffers, _images) = gltf::import(path)?;
    let mut nodes = Vec::new();

    for scene in document.scenes() {
        let mut stack: Vec<_> =
            scene.nodes().map(|n| (n, Mat4::IDENTITY)).collect();
        while let Some((node, parent)) = stack.pop() {
            let (t, r, s) = node.transform().decomposed();
            let local = Mat4::from_scale_rotation_translation(
                Vec3::from(s),
                Quat::from_array(r),
                Vec3::from(t),
            );
            let world = parent * local;
            stack.extend(node.children().map(|c| (c, world)));

            let (Some(mesh), Some(name)) = (node.mesh(), node.name()) else {
                continue;
            };
            let mut data = MeshData::default();
            for primitive in mesh.primitives() {
                let reader = primitive
                    .reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));
                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .map(Iterator::collect)
                    .unwrap_or_default();
                if positions.is_empty() {
                    continue;
                }
                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .map(Iterator::collect)
                    .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
                let uvs: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .map(|c| c.into_f32().collect())
                    .unwrap_or_else(|| vec![[0.0; 2]; positions.len()]);
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|i| i.into_u32().collect())
                    .unwrap_or_else(|| (0..positions.len() as u32).collect());

                let vertices = positions
                    .iter()
                    .zip(normals.iter().chain(std::iter::repeat(&[0.0, 1.0, 0.0])))
                    .zip(uvs.iter().chain(std::iter::repeat(&[0.0, 0.0])))
                    .map(|((p, n), uv)| MeshVertex {
                        position: *p,
                        normal: *n,
                        uv: *uv,
                    })
                    .collect();
                data.append(&MeshData { vertices, indices });
            }
            if data.is_empty() {
                continue;
            }

            let (scale, rotation, translation) =
                world.to_scale_rotation_translation();
            nodes.push(LoadedNode {
                name: name.to_owned(),
                transform: Transform {
                    translation,
                    rotation,
                    scale,
                },
                mesh: data,
            });
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_counts_every_asset() {
        let mut options = Options::default();
        let request = AssetRequest::from_options(&options);
        assert!(request.model.is_none());
        assert_eq!(request.total(), options.assets.objects.len() + 2);

        options.assets.model_path = Some("room.glb".into());
        let request = AssetRequest::from_options(&options);
        assert_eq!(request.total(), options.assets.objects.len() + 3);
        assert!(request.textures.iter().any(|(slot, path)| {
            *slot == TextureSlot::Baked("desk".into()) && path.ends_with("desk.jpg")
        }));
    }

    #[test]
    fn gradient_is_requested_only_when_configured() {
        let mut options = Options::default();
        let without = AssetRequest::from_options(&options);
        assert!(!without.textures.iter().any(|(slot, _)| *slot == TextureSlot::GradientMap));

        options.gradient_map.texture = Some("gradient.png".into());
        let with = AssetRequest::from_options(&options);
        assert_eq!(with.total(), without.total() + 1);
        assert!(with.textures.iter().any(|(slot, path)| {
            *slot == TextureSlot::GradientMap && path.ends_with("gradient.png")
        }));
    }

    #[test]
    fn missing_files_report_failures() {
        let request = AssetRequest {
            model: Some(PathBuf::from("/nonexistent/room.glb")),
            textures: vec![(TextureSlot::SkyNoise, PathBuf::from("/nonexistent/4.png"))],
        };
        let mut loader = AssetLoader::spawn(request).unwrap();
        loader.join();
        let events = loader.drain();
        assert_eq!(events.len(), loader.total());
        assert!(events.iter().all(|e| matches!(e, AssetEvent::Failed { .. })));
        assert_eq!(events[1].path(), "/nonexistent/4.png");
    }

    #[test]
    fn png_round_trips_through_loader() {
        let dir = std::env::temp_dir().join(format!("deskroom-tex-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("noise.png");
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
