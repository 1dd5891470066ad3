//! Floating dust sparkles: camera-facing additive quads drifting around
//! fixed centers.

use rand::{Rng, SeedableRng};

use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::pipeline_helpers::{create_scene_pipeline, PipelineState};
use crate::options::SparkleOptions;

/// One sparkle (instance attributes of `sparkles.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SparkleInstance {
    /// Rest position.
    pub center: [f32; 3],
    /// Animation phase in radians.
    pub phase: f32,
    /// Drift amplitude per axis.
    pub drift: [f32; 3],
    /// Size multiplier.
    pub scale: f32,
}

impl SparkleInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x3,
        3 => Float32,
    ];

    /// Per-instance vertex buffer layout.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Scatter `options.count` sparkles uniformly inside the box of extent
/// `options.scale` centered on `options.position`.
pub fn scatter<R: Rng>(options: &SparkleOptions, rng: &mut R) -> Vec<SparkleInstance> {
    let scale = options.scale;
    let position = options.position;
    (0..options.count)
        .map(|_| {
            let mut center = [0.0; 3];
            let mut drift = [0.0; 3];
            for axis in 0..3 {
                center[axis] =
                    position[axis] + rng.random_range(-0.5..=0.5) * scale[axis];
                drift[axis] = rng.random_range(-0.05..=0.05) * scale[axis];
            }
            SparkleInstance {
                center,
                phase: rng.random_range(0.0..std::f32::consts::TAU),
                drift,
                scale: rng.random_range(0.5..=1.5),
            }
        })
        .collect()
}

/// Instanced sparkle pass.
pub struct SparkleRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: TypedBuffer<SparkleInstance>,
    options: SparkleOptions,
}

impl SparkleRenderer {
    /// Build the pipeline and scatter the initial field.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        layouts: &[&wgpu::BindGroupLayout],
        options: &SparkleOptions,
    ) -> Self {
        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };
        let pipeline = create_scene_pipeline(
            device,
            "Sparkles",
            shader,
            format,
            layouts,
            PipelineState {
                buffers: &[SparkleInstance::layout()],
                blend: Some(wgpu::BlendState {
                    color: additive,
                    alpha: additive,
                }),
                cull_mode: None,
                depth_write: false,
            },
        );
        let instances = TypedBuffer::with_capacity(
            device,
            "Sparkle Instances",
            options.count as usize,
            wgpu::BufferUsages::VERTEX,
        );
        let mut renderer = Self {
            pipeline,
            instances,
            options: options.clone(),
        };
        renderer.regenerate(device, queue);
        renderer
    }

    fn regenerate(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let field = scatter(&self.options, &mut rand::rngs::StdRng::from_os_rng());
        let _ = self.instances.write(device, queue, &field);
    }

    /// Re-scatter when the count or box changed. Size and speed live in the
    /// scene uniform and need no rebuild.
    pub fn apply_options(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        options: &SparkleOptions,
    ) {
        let rescatter = options.count != self.options.count
            || options.scale != self.options.scale
            || options.position != self.options.position;
        self.options = options.clone();
        if rescatter {
            self.regenerate(device, queue);
        }
    }

    /// Draw the field. Groups 0 and 1 must already be bound.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instances.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.instances.buffer().slice(..));
        pass.draw(0..6, 0..self.instances.count() as u32);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn instance_stride_matches_shader() {
        assert_eq!(size_of::<SparkleInstance>(), 32);
    }

    #[test]
    fn scatter_stays_inside_box() {
        let options = SparkleOptions::default();
        let field = scatter(&options, &mut StdRng::seed_from_u64(7));
        assert_eq!(field.len(), options.count as usize);
        for s in &field {
            for axis in 0..3 {
                let half = options.scale[axis] * 0.5;
                let d = (s.center[axis] - options.position[axis]).abs();
                assert!(d <= half + 1e-5);
            }
            assert!((0.5..=1.5).contains(&s.scale));
            assert!((0.0..std::f32::consts::TAU).contains(&s.phase));
        }
    }

    #[test]
    fn empty_field() {
        let options = SparkleOptions {
            count: 0,
            ..SparkleOptions::default()
        };
        assert!(scatter(&options, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
