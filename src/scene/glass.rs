use super::{NodeHandle, SceneGraph};

/// The glass panes toggled by the transmission pass.
///
/// Each entry keeps its name and the handle it resolved to, if any.
/// Unresolved entries are skipped by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlassSurfaceSet {
    surfaces: Vec<(String, Option<NodeHandle>)>,
}

impl GlassSurfaceSet {
    /// Set for the given node names, unresolved.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            surfaces: names
                .iter()
                .map(|n| (n.as_ref().to_owned(), None))
                .collect(),
        }
    }

    /// Resolve every name against `graph`. Returns how many resolved.
    pub fn resolve(&mut self, graph: &SceneGraph) -> usize {
        for (name, handle) in &mut self.surfaces {
            *handle = graph.find(name);
            if handle.is_none() {
                log::debug!("glass surface '{name}' not in scene");
            }
        }
        self.handles().count()
    }

    /// Resolved handles in order.
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.surfaces.iter().filter_map(|(_, h)| *h)
    }

    /// Configured names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.surfaces.iter().map(|(n, _)| n.as_str())
    }

    /// Show or hide every resolved surface.
    pub fn set_visible(&self, graph: &mut SceneGraph, visible: bool) {
        for handle in self.handles() {
            graph.set_visible(handle, visible);
        }
    }

    /// Number of configured surfaces, resolved or not.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether no surfaces are configured.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeMaterial, Transform};

    #[test]
    fn unresolved_names_are_skipped() {
        let mut graph = SceneGraph::new();
        let a = graph.insert("window1glass1", Transform::IDENTITY, None, NodeMaterial::Glass);
        let mut set = GlassSurfaceSet::new(&["window1glass1", "missing"]);
        assert_eq!(set.resolve(&graph), 1);
        assert_eq!(set.len(), 2);

        set.set_visible(&mut graph, false);
        assert_eq!(graph.is_visible(a), Some(false));
        set.set_visible(&mut graph, true);
        assert_eq!(graph.is_visible(a), Some(true));
    }
}
