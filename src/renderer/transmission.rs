//! Dual-pass glass transmission.
//!
//! Glass panes cannot see through themselves, so each frame the scene is
//! first rendered offscreen with the sky plate shown and the glass hidden.
//! The final pass then swaps the two: glass drawn, plate hidden, and the
//! glass shader samples the offscreen buffer for what lies behind it.

use crate::scene::{GlassSurfaceSet, NodeHandle, SceneGraph};

/// Where draws currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTargetBinding {
    /// The window surface.
    Screen,
    /// The offscreen color buffer glass samples from.
    Offscreen,
}

/// A render backend the transmission pass drives.
pub trait TransmissionTarget {
    /// Direct subsequent scene renders to `target`.
    fn bind_target(&mut self, target: RenderTargetBinding);

    /// Render every visible node of `scene` to the bound target.
    fn render_scene(&mut self, scene: &SceneGraph);
}

/// Orchestrates the per-frame visibility swap around the offscreen pass.
#[derive(Debug, Clone, Default)]
pub struct TransmissionRenderer {
    plate: Option<NodeHandle>,
    glass: GlassSurfaceSet,
}

impl TransmissionRenderer {
    /// Renderer toggling `glass`. No plate is known until
    /// [`resolve`](Self::resolve) is called.
    pub fn new(glass: GlassSurfaceSet) -> Self {
        Self { plate: None, glass }
    }

    /// Resolve the plate and glass handles against `scene`. Call after any
    /// structural scene change.
    pub fn resolve(&mut self, scene: &SceneGraph, plate_name: &str) {
        self.plate = scene.find(plate_name);
        let resolved = self.glass.resolve(scene);
        log::debug!(
            "transmission: plate {}, {resolved}/{} glass surfaces",
            if self.plate.is_some() { "resolved" } else { "missing" },
            self.glass.len()
        );
    }

    /// The plate handle, if resolved.
    pub fn plate(&self) -> Option<NodeHandle> {
        self.plate
    }

    /// The glass surfaces.
    pub fn glass(&self) -> &GlassSurfaceSet {
        &self.glass
    }

    /// Render one frame: offscreen pass, visibility restore, final pass.
    ///
    /// Afterwards the plate is hidden and every resolved glass surface is
    /// visible, whatever the state before the call. The screen is always
    /// the bound target when this returns. Missing nodes are skipped.
    pub fn render_frame<T: TransmissionTarget>(
        &self,
        scene: &mut SceneGraph,
        target: &mut T,
    ) {
        self.set_plate_visible(scene, true);
        self.glass.set_visible(scene, false);

        target.bind_target(RenderTargetBinding::Offscreen);
        target.render_scene(scene);
        target.bind_target(RenderTargetBinding::Screen);

        self.set_plate_visible(scene, false);
        self.glass.set_visible(scene, true);

        target.render_scene(scene);
    }

    fn set_plate_visible(&self, scene: &mut SceneGraph, visible: bool) {
        if let Some(plate) = self.plate {
            scene.set_visible(plate, visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeMaterial, Transform};

    #[derive(Debug, Clone, PartialEq)]
    struct Snapshot {
        target: RenderTargetBinding,
        plate: Option<bool>,
        glass: Vec<Option<bool>>,
    }

    #[derive(Default)]
    struct Recorder {
        bound: Option<RenderTargetBinding>,
        plate: Option<NodeHandle>,
        glass: Vec<NodeHandle>,
        binds: Vec<RenderTargetBinding>,
        renders: Vec<Snapshot>,
    }

    impl TransmissionTarget for Recorder {
        fn bind_target(&mut self, target: RenderTargetBinding) {
            self.bound = Some(target);
            self.binds.push(target);
        }

        fn render_scene(&mut self, scene: &SceneGraph) {
            self.renders.push(Snapshot {
                target: self.bound.unwrap_or(RenderTargetBinding::Screen),
                plate: self.plate.and_then(|h| scene.is_visible(h)),
                glass: self.glass.iter().map(|h| scene.is_visible(*h)).collect(),
            });
        }
    }

    const GLASS: [&str; 4] =
        ["window1glass1", "window1glass2", "window2glass1", "window2glass2"];

    fn scene(glass_count: usize) -> SceneGraph {
        let mut graph = SceneGraph::new();
        let _ = graph.insert("plate", Transform::IDENTITY, None, NodeMaterial::Sky);
        for name in &GLASS[..glass_count] {
            let _ = graph.insert(name, Transform::IDENTITY, None, NodeMaterial::Glass);
        }
        graph
    }

    fn setup(graph: &SceneGraph) -> (TransmissionRenderer, Recorder) {
        let mut renderer = TransmissionRenderer::new(GlassSurfaceSet::new(&GLASS));
        renderer.resolve(graph, "plate");
        let recorder = Recorder {
            plate: renderer.plate(),
            glass: renderer.glass().handles().collect(),
            ..Recorder::default()
        };
        (renderer, recorder)
    }

    #[test]
    fn offscreen_pass_sees_plate_not_glass() {
        let mut graph = scene(4);
        let (renderer, mut recorder) = setup(&graph);
        renderer.render_frame(&mut graph, &mut recorder);

        assert_eq!(
            recorder.renders[0],
            Snapshot {
                target: RenderTargetBinding::Offscreen,
                plate: Some(true),
                glass: vec![Some(false); 4],
            }
        );
        assert_eq!(
            recorder.renders[1],
            Snapshot {
                target: RenderTargetBinding::Screen,
                plate: Some(false),
                glass: vec![Some(true); 4],
            }
        );
    }

    #[test]
    fn screen_is_rebound_before_returning() {
        let mut graph = scene(4);
        let (renderer, mut recorder) = setup(&graph);
        renderer.render_frame(&mut graph, &mut recorder);
        assert_eq!(
            recorder.binds,
            vec![RenderTargetBinding::Offscreen, RenderTargetBinding::Screen]
        );
        assert_eq!(recorder.bound, Some(RenderTargetBinding::Screen));
    }

    #[test]
    fn steady_state_regardless_of_prior_visibility() {
        let mut graph = scene(4);
        let (renderer, mut recorder) = setup(&graph);
        // Scramble visibility before the frame.
        if let Some(plate) = renderer.plate() {
            graph.set_visible(plate, true);
        }
        for (i, h) in renderer.glass().handles().enumerate() {
            graph.set_visible(h, i % 2 == 0);
        }
        renderer.render_frame(&mut graph, &mut recorder);

        assert_eq!(renderer.plate().and_then(|h| graph.is_visible(h)), Some(false));
        assert!(renderer
            .glass()
            .handles()
            .all(|h| graph.is_visible(h) == Some(true)));
    }

    #[test]
    fn no_glass_still_runs_both_passes() {
        let mut graph = scene(0);
        let (renderer, mut recorder) = setup(&graph);
        renderer.render_frame(&mut graph, &mut recorder);
        assert_eq!(recorder.renders.len(), 2);
        assert_eq!(recorder.renders[0].plate, Some(true));
        assert_eq!(recorder.renders[1].plate, Some(false));
    }

    #[test]
    fn partially_resolved_glass_is_skipped() {
        let mut graph = scene(2);
        let (renderer, mut recorder) = setup(&graph);
        assert_eq!(renderer.glass().handles().count(), 2);
        renderer.render_frame(&mut graph, &mut recorder);
        assert_eq!(recorder.renders[0].glass, vec![Some(false); 2]);
        assert_eq!(recorder.renders[1].glass, vec![Some(true); 2]);
    }

    #[test]
    fn missing_plate_does_not_abort_frame() {
        let mut graph = SceneGraph::new();
        let mut renderer = TransmissionRenderer::new(GlassSurfaceSet::new(&GLASS));
        renderer.resolve(&graph, "plate");
        let mut recorder = Recorder::default();
        renderer.render_frame(&mut graph, &mut recorder);
        assert_eq!(recorder.renders.len(), 2);
        assert_eq!(recorder.bound, Some(RenderTargetBinding::Screen));
    }

    #[test]
    fn plate_is_unknown_until_resolved() {
        let graph = scene(2);
        let mut renderer = TransmissionRenderer::new(GlassSurfaceSet::new(&GLASS));
        assert_eq!(renderer.plate(), None);
        renderer.resolve(&graph, "plate");
        assert_eq!(renderer.plate(), graph.find("plate"));
        assert!(renderer.plate().is_some());
    }
}
