//! Authoritative scene: named nodes, their meshes and baked textures, and
//! the per-session state the desk scene toggles (glass, lamp, loading).
//!
//! Nodes are looked up by name and addressed through opaque
//! [`NodeHandle`]s. Mesh and texture data stay on the CPU side here; the
//! renderer asks [`SceneGraph::changes`] what to upload. Adding or clearing
//! nodes rebuilds everything; replacing a node's mesh or baked texture only
//! touches that node.

mod glass;
mod lamp;
pub mod loader;
mod mesh;
pub mod procedural;
mod progress;

use glam::{Mat4, Quat, Vec3};
pub use glass::GlassSurfaceSet;
pub use lamp::LampState;
pub use mesh::{Aabb, MeshData, MeshVertex, TextureData};
pub use progress::LoadProgress;
use rustc_hash::FxHashMap;

use crate::camera::framing::ZoomTargetDescriptor;

/// Opaque reference to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// Index of a mesh in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

/// Index of a texture in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(usize);

/// Translation, rotation, and scale of a node in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position.
    pub translation: Vec3,
    /// World orientation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// No translation, rotation, or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Transform at a position.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How a node is shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeMaterial {
    /// Unlit, textured with a baked lighting map. Falls back to `tint` when
    /// the texture is missing.
    Baked {
        /// Baked texture, once loaded.
        texture: Option<TextureId>,
        /// Fallback colour.
        tint: [f32; 3],
    },
    /// Glass pane sampling the transmission buffer.
    Glass,
    /// The procedural sky plate.
    Sky,
}

/// One named node of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Unique node name.
    pub name: String,
    /// World transform.
    pub transform: Transform,
    /// Geometry, if any.
    pub mesh: Option<MeshId>,
    /// Object-space bounds of the geometry.
    pub local_bounds: Aabb,
    /// Whether the node is drawn.
    pub visible: bool,
    /// Shading.
    pub material: NodeMaterial,
}

impl SceneNode {
    /// World-space bounds.
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.transform.matrix())
    }
}

/// What the renderer has to refresh since it last caught up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneChanges {
    /// Nothing to upload.
    Unchanged,
    /// Nodes were added or removed: rebuild every node.
    Rebuild,
    /// Only these existing nodes changed their mesh, texture or material.
    Nodes(Vec<NodeHandle>),
}

/// A pooled texture with the revision of its current contents.
#[derive(Debug)]
struct PooledTexture {
    data: TextureData,
    revision: u64,
}

/// Named node storage with mesh and texture pools.
///
/// Pool slots are reused: replacing a node's mesh or baked texture
/// overwrites its slot, and slots a node lets go of are recycled.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    index: FxHashMap<String, NodeHandle>,
    meshes: Vec<MeshData>,
    free_meshes: Vec<MeshId>,
    textures: Vec<PooledTexture>,
    free_textures: Vec<TextureId>,
    /// Source of texture revisions. Never reset, so a revision identifies
    /// texture contents across [`clear`](SceneGraph::clear).
    next_revision: u64,
    /// Bumped when nodes are added or removed.
    generation: u64,
    /// Generation last consumed by the renderer.
    rendered_generation: u64,
    /// Existing nodes changed since the renderer caught up.
    changed: Vec<NodeHandle>,
}

impl SceneGraph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn touch(&mut self, handle: NodeHandle) {
        if !self.changed.contains(&handle) {
            self.changed.push(handle);
        }
    }

    /// What changed since the renderer last called
    /// [`mark_rendered`](Self::mark_rendered).
    #[must_use]
    pub fn changes(&self) -> SceneChanges {
        if self.generation != self.rendered_generation {
            SceneChanges::Rebuild
        } else if self.changed.is_empty() {
            SceneChanges::Unchanged
        } else {
            SceneChanges::Nodes(self.changed.clone())
        }
    }

    /// Whether anything changed since the renderer last caught up.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.changes() != SceneChanges::Unchanged
    }

    /// Record that the renderer is up to date.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
        self.changed.clear();
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.meshes.clear();
        self.free_meshes.clear();
        self.textures.clear();
        self.free_textures.clear();
        self.changed.clear();
        self.invalidate();
    }

    /// Add a mesh to the pool, reusing a released slot if there is one.
    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        if let Some(id) = self.free_meshes.pop() {
            self.meshes[id.0] = mesh;
            return id;
        }
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Add a texture to the pool, reusing a released slot if there is one.
    pub fn add_texture(&mut self, texture: TextureData) -> TextureId {
        self.next_revision += 1;
        let slot = PooledTexture {
            data: texture,
            revision: self.next_revision,
        };
        if let Some(id) = self.free_textures.pop() {
            self.textures[id.0] = slot;
            return id;
        }
        self.textures.push(slot);
        TextureId(self.textures.len() - 1)
    }

    /// Overwrite a pooled texture. Returns `false` for unknown ids.
    pub fn replace_texture(&mut self, id: TextureId, texture: TextureData) -> bool {
        let Some(slot) = self.textures.get_mut(id.0) else {
            return false;
        };
        self.next_revision += 1;
        *slot = PooledTexture {
            data: texture,
            revision: self.next_revision,
        };
        true
    }

    /// Store `mesh` in `slot` if the node already owns one, else in a new
    /// slot. `None` releases the old slot.
    fn store_mesh(&mut self, slot: Option<MeshId>, mesh: Option<MeshData>) -> Option<MeshId> {
        match (slot, mesh) {
            (Some(id), Some(mesh)) => {
                self.meshes[id.0] = mesh;
                Some(id)
            }
            (None, Some(mesh)) => Some(self.add_mesh(mesh)),
            (Some(id), None) => {
                self.meshes[id.0] = MeshData::default();
                self.free_meshes.push(id);
                None
            }
            (None, None) => None,
        }
    }

    fn release_texture(&mut self, id: TextureId) {
        if let Some(slot) = self.textures.get_mut(id.0) {
            slot.data = TextureData::solid([0; 4]);
            slot.revision = 0;
            self.free_textures.push(id);
        }
    }

    /// Add a node with geometry. A node with the same name is replaced in
    /// place and keeps its handle.
    pub fn insert(
        &mut self,
        name: &str,
        transform: Transform,
        mesh: Option<MeshData>,
        material: NodeMaterial,
    ) -> NodeHandle {
        let local_bounds = mesh.as_ref().map_or(Aabb::ZERO, MeshData::bounds);
        let existing = self.find(name);
        let old = existing.and_then(|h| self.node(h)).map(|n| (n.mesh, n.material));
        let old_mesh = old.and_then(|(mesh, _)| mesh);
        if let Some((_, NodeMaterial::Baked { texture: Some(id), .. })) = old {
            let kept = matches!(material, NodeMaterial::Baked { texture: Some(t), .. } if t == id);
            if !kept {
                self.release_texture(id);
            }
        }
        let mesh = self.store_mesh(old_mesh, mesh);
        let node = SceneNode {
            name: name.to_owned(),
            transform,
            mesh,
            local_bounds,
            visible: true,
            material,
        };
        if let Some(handle) = existing {
            self.nodes[handle.0] = node;
            self.touch(handle);
            return handle;
        }
        self.nodes.push(node);
        self.invalidate();
        let handle = NodeHandle(self.nodes.len() - 1);
        let _ = self.index.insert(name.to_owned(), handle);
        handle
    }

    /// Look up a node by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.index.get(name).copied()
    }

    /// Node for a handle.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.0)
    }

    /// Mutable node for a handle. The node is re-uploaded on the next
    /// render.
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        if handle.0 < self.nodes.len() {
            self.touch(handle);
        }
        self.nodes.get_mut(handle.0)
    }

    /// Show or hide a node. Unknown handles are ignored.
    pub fn set_visible(&mut self, handle: NodeHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(handle.0) {
            node.visible = visible;
        }
    }

    /// Whether a node is drawn; `None` for unknown handles.
    #[must_use]
    pub fn is_visible(&self, handle: NodeHandle) -> Option<bool> {
        self.nodes.get(handle.0).map(|n| n.visible)
    }

    /// Attach a baked texture to a node, overwriting the node's previous
    /// texture in place. Returns `false` when the node is unknown or not a
    /// baked node.
    pub fn set_baked_texture(
        &mut self,
        handle: NodeHandle,
        texture: TextureData,
    ) -> bool {
        let current = match self.node(handle).map(|n| n.material) {
            Some(NodeMaterial::Baked { texture, .. }) => texture,
            _ => return false,
        };
        let id = match current.filter(|id| id.0 < self.textures.len()) {
            Some(id) => {
                let _ = self.replace_texture(id, texture);
                id
            }
            None => self.add_texture(texture),
        };
        if let Some(SceneNode {
            material: NodeMaterial::Baked { texture, .. },
            ..
        }) = self.nodes.get_mut(handle.0)
        {
            *texture = Some(id);
        }
        self.touch(handle);
        true
    }

    /// All nodes in insertion order with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeHandle(i), n))
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Mesh data by id.
    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }

    /// Texture data by id.
    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&TextureData> {
        self.textures.get(id.0).map(|slot| &slot.data)
    }

    /// Revision of a texture's current contents. Changes whenever the slot
    /// is written.
    #[must_use]
    pub fn texture_revision(&self, id: TextureId) -> Option<u64> {
        self.textures.get(id.0).map(|slot| slot.revision)
    }

    /// All meshes, indexed by [`MeshId`] position.
    #[must_use]
    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    /// Number of texture slots in the pool.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Zoom framing data for a node: world centre, orientation, and world
    /// extent of its geometry.
    #[must_use]
    pub fn zoom_target(&self, handle: NodeHandle) -> Option<ZoomTargetDescriptor> {
        let node = self.node(handle)?;
        let t = &node.transform;
        Some(ZoomTargetDescriptor {
            position: t.matrix().transform_point3(node.local_bounds.center()),
            orientation: t.rotation,
            size: node.local_bounds.size() * t.scale.abs(),
        })
    }

    /// Closest visible node hit by a world-space ray.
    #[must_use]
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<NodeHandle> {
        self.iter()
            .filter(|(_, n)| n.visible && n.mesh.is_some())
            .filter(|(_, n)| !matches!(n.material, NodeMaterial::Sky))
            .filter_map(|(h, n)| n.world_bounds().ray_hit(origin, dir).map(|t| (h, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        let v = |x: f32, y: f32| MeshVertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [x + 0.5, 0.5 - y],
        };
        MeshData {
            vertices: vec![v(-0.5, -0.5), v(0.5, -0.5), v(0.5, 0.5), v(-0.5, 0.5)],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    fn baked() -> NodeMaterial {
        NodeMaterial::Baked {
            texture: None,
            tint: [1.0; 3],
        }
    }

    #[test]
    fn find_by_name() {
        let mut graph = SceneGraph::new();
        let h = graph.insert("desk", Transform::IDENTITY, Some(quad()), baked());
        assert_eq!(graph.find("desk"), Some(h));
        assert!(graph.find("missing").is_none());
    }

    #[test]
    fn reinsert_keeps_handle() {
        let mut graph = SceneGraph::new();
        let a = graph.insert("desk", Transform::IDENTITY, None, baked());
        let b = graph.insert(
            "desk",
            Transform::from_translation(Vec3::X),
            Some(quad()),
            baked(),
        );
        assert_eq!(a, b);
        assert_eq!(graph.len(), 1);
        assert!(graph.node(a).is_some_and(|n| n.mesh.is_some()));
    }

    #[test]
    fn structural_changes_mark_dirty() {
        let mut graph = SceneGraph::new();
        let h = graph.insert("desk", Transform::IDENTITY, Some(quad()), baked());
        assert!(graph.is_dirty());
        graph.mark_rendered();
        graph.set_visible(h, false);
        assert!(!graph.is_dirty());
        assert!(graph.set_baked_texture(h, TextureData::solid([255; 4])));
        assert!(graph.is_dirty());
    }

    #[test]
    fn new_nodes_rebuild_replaced_nodes_do_not() {
        let mut graph = SceneGraph::new();
        let h = graph.insert("desk", Transform::IDENTITY, Some(quad()), baked());
        assert_eq!(graph.changes(), SceneChanges::Rebuild);
        graph.mark_rendered();
        assert_eq!(graph.changes(), SceneChanges::Unchanged);

        let _ = graph.insert("desk", Transform::IDENTITY, Some(quad()), baked());
        assert!(graph.set_baked_texture(h, TextureData::solid([9; 4])));
        assert_eq!(graph.changes(), SceneChanges::Nodes(vec![h]));

        let _ = graph.insert("chair", Transform::IDENTITY, Some(quad()), baked());
        assert_eq!(graph.changes(), SceneChanges::Rebuild);
    }

    #[test]
    fn reinsert_reuses_mesh_slot() {
        let mut graph = SceneGraph::new();
        for _ in 0..5 {
            let _ = graph.insert("desk", Transform::IDENTITY, Some(quad()), baked());
        }
        assert_eq!(graph.meshes().len(), 1);

        let _ = graph.insert("desk", Transform::IDENTITY, None, baked());
        let _ = graph.insert("chair", Transform::IDENTITY, Some(quad()), baked());
        assert_eq!(graph.meshes().len(), 1);
        assert!(graph.find("desk").and_then(|h| graph.node(h)).is_some_and(|n| n.mesh.is_none()));
    }

    #[test]
    fn retexture_overwrites_in_place() {
        let mut graph = SceneGraph::new();
        let h = graph.insert("desk", Transform::IDENTITY, Some(quad()), baked());
        assert!(graph.set_baked_texture(h, TextureData::solid([1; 4])));
        let Some(NodeMaterial::Baked { texture: Some(id), .. }) =
            graph.node(h).map(|n| n.material)
        else {
            unreachable!("desk is baked and textured");
        };
        let first = graph.texture_revision(id);

        for _ in 0..10 {
            assert!(graph.set_baked_texture(h, TextureData::solid([2; 4])));
        }
        assert_eq!(graph.texture_count(), 1);
        assert_ne!(graph.texture_revision(id), first);
        assert_eq!(graph.texture(id), Some(&TextureData::solid([2; 4])));
    }

    #[test]
    fn revisions_survive_clear() {
        let mut graph = SceneGraph::new();
        let id = graph.add_texture(TextureData::solid([1; 4]));
        let before = graph.texture_revision(id);
        graph.clear();
        let again = graph.add_texture(TextureData::solid([1; 4]));
        assert_eq!(again, id);
        assert_ne!(graph.texture_revision(again), before);
    }

    #[test]
    fn glass_nodes_do_not_take_textures() {
        let mut graph = SceneGraph::new();
        let h = graph.insert("pane", Transform::IDENTITY, Some(quad()), NodeMaterial::Glass);
        assert!(!graph.set_baked_texture(h, TextureData::solid([0; 4])));
    }

    #[test]
    fn zoom_target_uses_world_bounds() {
        let mut graph = SceneGraph::new();
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::new(0.4, 0.3, 1.0),
        };
        let h = graph.insert("screen", transform, Some(quad()), baked());
        let target = graph.zoom_target(h).unwrap();
        assert!((target.position - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
        assert!((target.size - Vec3::new(0.4, 0.3, 0.0)).length() < 1e-6);
    }

    #[test]
    fn pick_returns_nearest_visible() {
        let mut graph = SceneGraph::new();
        let near = graph.insert(
            "near",
            Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
            Some(quad()),
            baked(),
        );
        let _far = graph.insert("far", Transform::IDENTITY, Some(quad()), baked());
        let origin = Vec3::new(0.0, 0.0, 5.0);
        assert_eq!(graph.pick(origin, Vec3::NEG_Z), Some(near));
        graph.set_visible(near, false);
        assert_eq!(graph.pick(origin, Vec3::NEG_Z), graph.find("far"));
    }
}
