//! Uploaded baked textures, keyed by scene texture id.
//!
//! Each entry remembers the revision it was uploaded from, so a texture is
//! uploaded once per content change however often nodes are rebuilt.

use rustc_hash::FxHashMap;

use crate::scene::{NodeHandle, NodeMaterial, SceneGraph, TextureData, TextureId};

/// GPU copies of scene textures.
///
/// Generic over the uploaded resource so the bookkeeping runs without a
/// device.
#[derive(Debug)]
pub struct TextureCache<T> {
    entries: FxHashMap<TextureId, (u64, T)>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<T> TextureCache<T> {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the baked textures of `nodes` that are missing or stale.
    /// `upload` gets the node name and the texture. Returns how many
    /// textures were uploaded.
    pub fn sync<F>(&mut self, scene: &SceneGraph, nodes: &[NodeHandle], mut upload: F) -> usize
    where
        F: FnMut(&str, &TextureData) -> T,
    {
        let mut uploaded = 0;
        for node in nodes.iter().filter_map(|&h| scene.node(h)) {
            let NodeMaterial::Baked {
                texture: Some(id), ..
            } = node.material
            else {
                continue;
            };
            let (Some(data), Some(revision)) = (scene.texture(id), scene.texture_revision(id))
            else {
                continue;
            };
            if self.entries.get(&id).is_some_and(|(r, _)| *r == revision) {
                continue;
            }
            let _ = self.entries.insert(id, (revision, upload(&node.name, data)));
            uploaded += 1;
        }
        uploaded
    }

    /// Drop entries whose texture slot no longer holds the cached contents.
    pub fn prune(&mut self, scene: &SceneGraph) {
        self.entries
            .retain(|id, (revision, _)| scene.texture_revision(*id) == Some(*revision));
    }

    /// Cached resource for a texture, if uploaded.
    #[must_use]
    pub fn get(&self, id: TextureId) -> Option<&T> {
        self.entries.get(&id).map(|(_, t)| t)
    }

    /// Number of cached textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
