//! CPU mirrors of the per-frame and per-node shader uniforms.

use crate::options::Options;
use crate::scene::{LampState, NodeMaterial, SceneNode};

/// Per-frame values shared by every scene pass (`SceneUniform` in
/// `modules/scene.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    /// Sky sun color.
    pub sun_color: [f32; 4],
    /// Sky cloud highlight color.
    pub light_color: [f32; 4],
    /// Sky cloud shadow color.
    pub dark_color: [f32; 4],
    /// Sky base gradient color.
    pub base_sky_color: [f32; 4],
    /// Glass tint in rgb, transmission in a.
    pub glass_color: [f32; 4],
    /// Screen size in pixels.
    pub resolution: [f32; 2],
    /// Accumulated sky time in seconds.
    pub time: f32,
    /// Ambient multiplier on baked textures.
    pub ambient: f32,
    /// Lamp glow added to emissive nodes.
    pub lamp_glow: f32,
    /// Glass roughness.
    pub roughness: f32,
    /// Glass thickness.
    pub thickness: f32,
    /// Glass normal map strength.
    pub normal_scale: f32,
    /// Sparkle size.
    pub sparkle_size: f32,
    /// Sparkle drift speed.
    pub sparkle_speed: f32,
    _pad: [f32; 2],
}

fn rgb(c: [f32; 3], a: f32) -> [f32; 4] {
    [c[0], c[1], c[2], a]
}

impl SceneUniform {
    /// Build the uniform from options, lamp state, the screen resolution
    /// and the accumulated sky time.
    #[must_use]
    pub fn new(
        options: &Options,
        lamp: LampState,
        resolution: (u32, u32),
        time: f32,
    ) -> Self {
        let (ambient, lamp_glow) = lamp.factors();
        let sky = &options.sky;
        let glass = &options.transmission;
        Self {
            sun_color: rgb(sky.sun_color, 1.0),
            light_color: rgb(sky.light_color, 1.0),
            dark_color: rgb(sky.dark_color, 1.0),
            base_sky_color: rgb(sky.base_sky_color, 1.0),
            glass_color: rgb(glass.color, glass.clamped_transmission()),
            resolution: [resolution.0.max(1) as f32, resolution.1.max(1) as f32],
            time,
            ambient,
            lamp_glow,
            roughness: glass.roughness,
            thickness: glass.thickness,
            normal_scale: glass.normal_scale,
            sparkle_size: options.sparkles.size,
            sparkle_speed: options.sparkles.speed,
            _pad: [0.0; 2],
        }
    }
}

/// Per-node values (`NodeUniform` in `modules/scene.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    /// Model matrix.
    pub model: [[f32; 4]; 4],
    /// Fallback tint in rgb; a = 1 when a texture is bound.
    pub tint: [f32; 4],
    /// x = emission weight.
    pub params: [f32; 4],
}

impl NodeUniform {
    /// Uniform for `node`. `emissive` nodes pick up the lamp glow.
    #[must_use]
    pub fn new(node: &SceneNode, emissive: bool) -> Self {
        let tint = match node.material {
            NodeMaterial::Baked { texture, tint } => {
                rgb(tint, if texture.is_some() { 1.0 } else { 0.0 })
            }
            NodeMaterial::Glass | NodeMaterial::Sky => [1.0; 4],
        };
        Self {
            model: node.transform.matrix().to_cols_array_2d(),
            tint,
            params: [if emissive { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Monotonic sky time, advanced by the frame delta.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkyClock {
    time: f32,
}

impl SkyClock {
    /// Add `dt` seconds. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
        self.time
    }

    /// Seconds accumulated so far.
    pub fn time(&self) -> f32 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::{Aabb, Transform};

    #[test]
    fn layouts_match_wgsl() {
        assert_eq!(size_of::<SceneUniform>(), 128);
        assert_eq!(size_of::<NodeUniform>(), 96);
    }

    #[test]
    fn scene_uniform_carries_lamp_and_glass() {
        let mut options = Options::default();
        options.transmission.transmission = 1.5;
        let on = SceneUniform::new(&options, LampState::ON, (800, 600), 2.0);
        let off = SceneUniform::new(&options, LampState::ON.toggled(), (0, 0), 0.0);

        assert_eq!(on.glass_color[3], 1.0);
        assert_eq!(on.resolution, [800.0, 600.0]);
        assert_eq!(on.time, 2.0);
        assert!(on.ambient > off.ambient);
        assert_eq!(off.lamp_glow, 0.0);
        assert_eq!(off.resolution, [1.0, 1.0]);
    }

    #[test]
    fn node_uniform_flags_texture_and_emission() {
        let node = SceneNode {
            name: "desk".into(),
            transform: Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            mesh: None,
            local_bounds: Aabb::ZERO,
            visible: true,
            material: NodeMaterial::Baked {
                texture: None,
                tint: [0.5, 0.4, 0.3],
            },
        };
        let u = NodeUniform::new(&node, true);
        assert_eq!(u.tint, [0.5, 0.4, 0.3, 0.0]);
        assert_eq!(u.params[0], 1.0);
        assert_eq!(u.model[3][..3], [1.0, 2.0, 3.0]);
        assert_eq!(NodeUniform::new(&node, false).params[0], 0.0);
    }

    #[test]
    fn sky_clock_accumulates() {
        let mut clock = SkyClock::default();
        let _ = clock.advance(0.5);
        let _ = clock.advance(-1.0);
        let _ = clock.advance(f32::NAN);
        assert_eq!(clock.advance(0.25), 0.75);
        assert_eq!(clock.time(), 0.75);
    }
}
