//! Gradient-map colour grade, a full-screen pass after the final scene pass.
//!
//! While a gradient is loaded the scene renders into the pass's input
//! texture instead of the surface; the pass maps each pixel's luminance
//! through the gradient and blends the result over the scene.

use wgpu::util::DeviceExt;

use crate::error::DeskroomError;
use crate::gpu::pipeline_helpers::{
    create_screen_pipeline, filtering_sampler, linear_sampler, texture_2d,
    uniform_buffer,
};
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::GpuTexture;
use crate::scene::TextureData;

/// Rec. 601 luma weights.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Luminance cap; keeps highlights off the last gradient texel.
pub const MAX_LUMINANCE: f32 = 0.9;

/// Horizontal gradient coordinate for a linear RGB colour.
#[must_use]
pub fn gradient_coordinate(rgb: [f32; 3]) -> f32 {
    let luminance: f32 = rgb.iter().zip(LUMA_WEIGHTS).map(|(c, w)| c * w).sum();
    luminance.clamp(0.0, MAX_LUMINANCE)
}

/// Blend `gradient` over `input` by `opacity`.
#[must_use]
pub fn grade(input: [f32; 4], gradient: [f32; 4], opacity: f32) -> [f32; 4] {
    std::array::from_fn(|i| input[i] + (gradient[i] - input[i]) * opacity)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct GradeParams {
    opacity: f32,
    max_luminance: f32,
    _pad: [f32; 2],
}

impl GradeParams {
    fn new(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            max_luminance: MAX_LUMINANCE,
            _pad: [0.0; 2],
        }
    }
}

/// Input texture, gradient, sampler and params.
fn layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    [texture_2d(0), texture_2d(1), filtering_sampler(2), uniform_buffer(3)]
}

/// The full-screen grade pass.
pub struct GradientMapPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    format: wgpu::TextureFormat,
    input: wgpu::Texture,
    input_view: wgpu::TextureView,
    gradient: Option<GpuTexture>,
    opacity: f32,
}

impl GradientMapPass {
    /// Build the pipeline and an input target of `size`. The pass starts
    /// inactive until a gradient is set.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Shader`] if the shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        opacity: f32,
    ) -> Result<Self, DeskroomError> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gradient Map Bind Group Layout"),
            entries: &layout_entries(),
        });
        let pipeline = create_screen_pipeline(
            device,
            "Gradient Map",
            &composer.compose(device, Shader::GradientMap)?,
            format,
            &[&layout],
        );
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gradient Map Params"),
            contents: bytemuck::cast_slice(&[GradeParams::new(opacity)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (input, input_view) = Self::create_input(device, format, size);
        Ok(Self {
            pipeline,
            layout,
            bind_group: None,
            sampler: linear_sampler(device, "Gradient Map Sampler"),
            params_buffer,
            format,
            input,
            input_view,
            gradient: None,
            opacity: opacity.clamp(0.0, 1.0),
        })
    }

    fn create_input(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Gradient Map Input"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        self.bind_group = self.gradient.as_ref().map(|gradient| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Gradient Map Bind Group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&self.input_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&gradient.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                ],
            })
        });
    }

    /// Whether the scene should render through this pass.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bind_group.is_some() && self.opacity > 0.0
    }

    /// Target the final scene pass renders into while the pass is active.
    pub fn input_view(&self) -> &wgpu::TextureView {
        &self.input_view
    }

    /// Install a gradient, activating the pass.
    pub fn set_gradient(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
    ) {
        self.gradient = Some(GpuTexture::upload(device, queue, "Gradient Map", data, true));
        self.rebuild_bind_group(device);
        log::debug!("gradient map {}x{} installed", data.width, data.height);
    }

    /// Remove the gradient, deactivating the pass.
    pub fn clear_gradient(&mut self) {
        self.gradient = None;
        self.bind_group = None;
    }

    /// Update the blend opacity.
    pub fn set_opacity(&mut self, queue: &wgpu::Queue, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::cast_slice(&[GradeParams::new(self.opacity)]),
        );
    }

    /// Size of the input target.
    pub fn input_size(&self) -> (u32, u32) {
        (self.input.width(), self.input.height())
    }

    /// Follow a surface resize.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if self.input_size() == (size.0.max(1), size.1.max(1)) {
            return;
        }
        let (input, input_view) = Self::create_input(device, self.format, size);
        self.input = input;
        self.input_view = input_view;
        self.rebuild_bind_group(device);
    }

    /// Grade the input texture into `output`. Does nothing while inactive.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let Some(bind_group) = self.bind_group.as_ref().filter(|_| self.is_active()) else {
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Gradient Map Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn luminance_maps_to_gradient_coordinate() {
        assert!(close(gradient_coordinate([0.0; 3]), 0.0));
        assert!(close(gradient_coordinate([0.5; 3]), 0.5));
        assert!(close(gradient_coordinate([1.0, 0.0, 0.0]), 0.299));
        assert!(close(gradient_coordinate([0.0, 1.0, 0.0]), 0.587));
    }

    #[test]
    fn bright_colours_are_capped() {
        assert!(close(gradient_coordinate([1.0; 3]), MAX_LUMINANCE));
        assert!(close(gradient_coordinate([4.0, 4.0, 4.0]), MAX_LUMINANCE));
        assert!(close(gradient_coordinate([-1.0; 3]), 0.0));
    }

    #[test]
    fn grade_mixes_by_opacity() {
        let input = [1.0, 0.5, 0.0, 1.0];
        let gradient = [0.0, 0.5, 1.0, 1.0];
        assert_eq!(grade(input, gradient, 0.0), input);
        assert_eq!(grade(input, gradient, 1.0), gradient);
        let out = grade(input, gradient, 0.2);
        assert!(close(out[0], 0.8));
        assert!(close(out[1], 0.5));
        assert!(close(out[2], 0.2));
        assert!(close(out[3], 1.0));
    }

    #[test]
    fn params_clamp_opacity() {
        assert_eq!(GradeParams::new(1.7).opacity, 1.0);
        assert_eq!(GradeParams::new(0.2).max_luminance, MAX_LUMINANCE);
        assert_eq!(size_of::<GradeParams>() % 16, 0);
    }

    #[test]
    fn layout_matches_shader() {
        let source = include_str!("../../assets/shaders/gradient_map.wgsl");
        for entry in layout_entries() {
            let decl = format!("@group(0) @binding({})", entry.binding);
            assert!(source.contains(&decl), "missing {decl}");
        }
        assert!(source.contains("clamp(dot(color.rgb, vec3<f32>(0.299, 0.587, 0.114))"));
    }
}
