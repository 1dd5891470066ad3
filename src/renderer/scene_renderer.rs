//! GPU side of the desk scene.
//!
//! [`SceneRenderer`] owns the pipelines, per-node buffers and the
//! transmission buffer. Node resources are rebuilt from the
//! [`SceneGraph`] as it reports changes: all nodes after a structural
//! change, only the touched ones otherwise. Baked textures go through a
//! [`TextureCache`] and upload once per content change. Visibility is read
//! at draw time, so the per-frame glass/plate swap costs nothing.
//! [`SceneFrame`] records one frame's passes into a command encoder.

use wgpu::util::DeviceExt;

use super::gradient_map::GradientMapPass;
use super::sparkles::SparkleRenderer;
use super::texture_cache::TextureCache;
use super::transmission::{RenderTargetBinding, TransmissionTarget};
use super::uniforms::{NodeUniform, SceneUniform};
use crate::error::DeskroomError;
use crate::gpu::pipeline_helpers::{
    create_scene_pipeline, filtering_sampler, linear_sampler, repeat_sampler,
    texture_2d, uniform_buffer, PipelineState,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::{
    BufferSizing, DepthTexture, GpuTexture, OffscreenColorBuffer,
};
use crate::options::Options;
use crate::scene::{
    LampState, MeshData, MeshVertex, NodeHandle, NodeMaterial, SceneChanges,
    SceneGraph, TextureData,
};

/// Background behind everything the scene draws.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawKind {
    Baked,
    Glass,
    Sky,
}

struct NodeGpu {
    handle: NodeHandle,
    kind: DrawKind,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    bind_group: wgpu::BindGroup,
    _uniform: wgpu::Buffer,
}

/// Glass group: transmission buffer, normal map, a clamped sampler for the
/// buffer and a repeating one for the normal map.
fn glass_layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    [
        texture_2d(0),
        texture_2d(1),
        filtering_sampler(2),
        filtering_sampler(3),
    ]
}

/// Scene (group 1), node (group 2) and glass (group 3) layouts.
fn create_layouts(device: &wgpu::Device) -> [wgpu::BindGroupLayout; 3] {
    let layout = |label: &str, entries: &[wgpu::BindGroupLayoutEntry]| {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries,
        })
    };
    [
        layout("Scene Bind Group Layout", &[uniform_buffer(0)]),
        layout(
            "Node Bind Group Layout",
            &[uniform_buffer(0), texture_2d(1), filtering_sampler(2)],
        ),
        layout("Glass Bind Group Layout", &glass_layout_entries()),
    ]
}

struct ScenePipelines {
    mesh: wgpu::RenderPipeline,
    sky: wgpu::RenderPipeline,
    glass: wgpu::RenderPipeline,
}

impl ScenePipelines {
    /// `layouts` is camera, scene, node, glass.
    fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        format: wgpu::TextureFormat,
        layouts: [&wgpu::BindGroupLayout; 4],
    ) -> Result<Self, DeskroomError> {
        let opaque = PipelineState {
            buffers: &[MeshVertex::layout()],
            blend: None,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
        };
        let two_sided = PipelineState {
            cull_mode: None,
            ..opaque
        };
        Ok(Self {
            mesh: create_scene_pipeline(
                device,
                "Mesh",
                &composer.compose(device, Shader::Mesh)?,
                format,
                &layouts[..3],
                opaque,
            ),
            sky: create_scene_pipeline(
                device,
                "Sky",
                &composer.compose(device, Shader::Sky)?,
                format,
                &layouts[..3],
                two_sided,
            ),
            glass: create_scene_pipeline(
                device,
                "Glass",
                &composer.compose(device, Shader::Glass)?,
                format,
                &layouts,
                two_sided,
            ),
        })
    }
}

/// Pipelines, node resources and render targets for the desk scene.
pub struct SceneRenderer {
    pipelines: ScenePipelines,
    sparkles: SparkleRenderer,
    gradient_map: GradientMapPass,

    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    glass_layout: wgpu::BindGroupLayout,
    glass_bind_group: wgpu::BindGroup,

    baked_sampler: wgpu::Sampler,
    noise_sampler: wgpu::Sampler,
    glass_sampler: wgpu::Sampler,
    normal_sampler: wgpu::Sampler,
    fallback_texture: GpuTexture,
    noise_texture: Option<GpuTexture>,
    normal_map: GpuTexture,

    nodes: Vec<NodeGpu>,
    textures: TextureCache<GpuTexture>,
    needs_rebuild: bool,
    emissive_node: String,

    offscreen: OffscreenColorBuffer,
    screen_depth: DepthTexture,
}

impl SceneRenderer {
    /// Compile the pipelines and allocate the render targets.
    ///
    /// # Errors
    ///
    /// Returns [`DeskroomError::Shader`] if a scene shader fails to compose.
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        options: &Options,
    ) -> Result<Self, DeskroomError> {
        let device = &context.device;
        let queue = &context.queue;
        let format = context.format();
        let mut composer = ShaderComposer::new()?;

        let [scene_layout, node_layout, glass_layout] = create_layouts(device);
        let pipelines = ScenePipelines::new(
            device,
            &mut composer,
            format,
            [camera_layout, &scene_layout, &node_layout, &glass_layout],
        )?;
        let sparkles = SparkleRenderer::new(
            device,
            queue,
            &composer.compose(device, Shader::Sparkles)?,
            format,
            &[camera_layout, &scene_layout],
            &options.sparkles,
        );
        let gradient_map = GradientMapPass::new(
            device,
            &mut composer,
            format,
            context.size(),
            options.gradient_map.opacity,
        )?;

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SceneUniform::new(
                options,
                LampState::ON,
                context.size(),
                0.0,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let fallback_texture = GpuTexture::upload(
            device,
            queue,
            "Fallback Texture",
            &TextureData::solid([255, 255, 255, 255]),
            true,
        );
        let normal_map = GpuTexture::upload(
            device,
            queue,
            "Flat Normal Map",
            &TextureData::solid([128, 128, 255, 255]),
            false,
        );
        let glass_sampler = linear_sampler(device, "Glass Sampler");
        let normal_sampler =
            repeat_sampler(device, "Normal Map Sampler", wgpu::FilterMode::Linear);

        let sizing = options
            .transmission
            .buffer_size
            .map_or(BufferSizing::Viewport, |[w, h]| BufferSizing::Fixed(w, h));
        let offscreen = OffscreenColorBuffer::new(device, format, sizing, context.size());
        let (width, height) = context.size();
        let screen_depth = DepthTexture::new(device, "Screen Depth", width, height);

        let glass_bind_group = Self::create_glass_bind_group(
            device,
            &glass_layout,
            &offscreen,
            &normal_map,
            [&glass_sampler, &normal_sampler],
        );

        Ok(Self {
            pipelines,
            sparkles,
            gradient_map,
            scene_buffer,
            scene_bind_group,
            node_layout,
            glass_layout,
            glass_bind_group,
            baked_sampler: linear_sampler(device, "Baked Sampler"),
            noise_sampler: repeat_sampler(
                device,
                "Noise Sampler",
                wgpu::FilterMode::Nearest,
            ),
            glass_sampler,
            normal_sampler,
            fallback_texture,
            noise_texture: None,
            normal_map,
            nodes: Vec::new(),
            textures: TextureCache::new(),
            needs_rebuild: true,
            emissive_node: options.assets.lamp_node.clone(),
            offscreen,
            screen_depth,
        })
    }

    fn create_glass_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        offscreen: &OffscreenColorBuffer,
        normal_map: &GpuTexture,
        [buffer_sampler, normal_sampler]: [&wgpu::Sampler; 2],
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glass Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&offscreen.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(buffer_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(normal_sampler),
                },
            ],
        })
    }

    fn rebuild_glass_bind_group(&mut self, device: &wgpu::Device) {
        self.glass_bind_group = Self::create_glass_bind_group(
            device,
            &self.glass_layout,
            &self.offscreen,
            &self.normal_map,
            [&self.glass_sampler, &self.normal_sampler],
        );
    }

    /// Follow a surface resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.screen_depth = DepthTexture::new(device, "Screen Depth", width, height);
        self.gradient_map.resize(device, (width, height));
        if self.offscreen.resize(device, (width, height)) {
            self.rebuild_glass_bind_group(device);
        }
    }

    /// Replace the glass normal map.
    pub fn set_normal_map(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
    ) {
        self.normal_map = GpuTexture::upload(device, queue, "Glass Normal Map", data, false);
        self.rebuild_glass_bind_group(device);
    }

    /// Install the colour-grade gradient.
    pub fn set_gradient_map(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
    ) {
        self.gradient_map.set_gradient(device, queue, data);
    }

    /// Replace the sky noise texture.
    pub fn set_noise_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
    ) {
        self.noise_texture =
            Some(GpuTexture::upload(device, queue, "Sky Noise", data, false));
        self.needs_rebuild = true;
    }

    /// Push option changes that live on the GPU side.
    pub fn apply_options(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        options: &Options,
    ) {
        self.sparkles.apply_options(device, queue, &options.sparkles);
        self.gradient_map
            .set_opacity(queue, options.gradient_map.opacity);
        if options.gradient_map.texture.is_none() {
            self.gradient_map.clear_gradient();
        }
        if options.assets.lamp_node != self.emissive_node {
            self.emissive_node.clone_from(&options.assets.lamp_node);
            self.needs_rebuild = true;
        }
    }

    /// Upload the per-frame scene uniform.
    pub fn update_scene_uniform(&self, queue: &wgpu::Queue, uniform: &SceneUniform) {
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Bring node resources up to date with the scene.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &mut SceneGraph,
    ) {
        let (handles, full) = match scene.changes() {
            SceneChanges::Unchanged if !self.needs_rebuild => return,
            SceneChanges::Nodes(handles) if !self.needs_rebuild => (handles, false),
            _ => (scene.iter().map(|(h, _)| h).collect::<Vec<_>>(), true),
        };
        self.textures.prune(scene);
        let uploaded = self.textures.sync(scene, &handles, |name, data| {
            GpuTexture::upload(device, queue, name, data, true)
        });

        if full {
            self.nodes = handles
                .iter()
                .filter_map(|&h| self.build_node(device, scene, h))
                .collect();
        } else {
            for &handle in &handles {
                let gpu = self.build_node(device, scene, handle);
                let slot = self.nodes.iter().position(|n| n.handle == handle);
                match (slot, gpu) {
                    (Some(i), Some(gpu)) => self.nodes[i] = gpu,
                    (Some(i), None) => {
                        let _ = self.nodes.remove(i);
                    }
                    (None, Some(gpu)) => self.nodes.push(gpu),
                    (None, None) => {}
                }
            }
        }
        scene.mark_rendered();
        self.needs_rebuild = false;
        log::debug!(
            "rebuilt {} of {} scene nodes, uploaded {uploaded} textures",
            handles.len(),
            self.nodes.len()
        );
    }

    /// GPU resources for one node; `None` for nodes without geometry.
    fn build_node(
        &self,
        device: &wgpu::Device,
        scene: &SceneGraph,
        handle: NodeHandle,
    ) -> Option<NodeGpu> {
        let node = scene.node(handle)?;
        let mesh = scene.mesh(node.mesh?)?;
        if mesh.is_empty() {
            return None;
        }
        let (kind, texture) = match node.material {
            NodeMaterial::Baked { texture, .. } => {
                (DrawKind::Baked, texture.and_then(|id| self.textures.get(id)))
            }
            NodeMaterial::Glass => (DrawKind::Glass, None),
            NodeMaterial::Sky => (DrawKind::Sky, None),
        };
        let uniform = NodeUniform::new(node, node.name == self.emissive_node);
        Some(self.create_node(device, handle, kind, mesh, &uniform, texture))
    }

    fn create_node(
        &self,
        device: &wgpu::Device,
        handle: NodeHandle,
        kind: DrawKind,
        mesh: &MeshData,
        uniform: &NodeUniform,
        texture: Option<&GpuTexture>,
    ) -> NodeGpu {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Uniform"),
            contents: bytemuck::cast_slice(&[*uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let (view, sampler) = match kind {
            DrawKind::Sky => (
                self.noise_texture
                    .as_ref()
                    .map_or(&self.fallback_texture.view, |t| &t.view),
                &self.noise_sampler,
            ),
            DrawKind::Baked | DrawKind::Glass => (
                texture.map_or(&self.fallback_texture.view, |t| &t.view),
                &self.baked_sampler,
            ),
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Node Bind Group"),
            layout: &self.node_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        NodeGpu {
            handle,
            kind,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            bind_group,
            _uniform: uniform_buffer,
        }
    }

    /// Start recording a frame into `encoder`, finally presenting to
    /// `screen_view`.
    pub fn frame<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        screen_view: &'a wgpu::TextureView,
        camera_bind_group: &'a wgpu::BindGroup,
    ) -> SceneFrame<'a> {
        SceneFrame {
            renderer: self,
            encoder,
            screen_view,
            camera_bind_group,
            bound: RenderTargetBinding::Screen,
        }
    }

    fn draw_nodes(&self, pass: &mut wgpu::RenderPass<'_>, scene: &SceneGraph) {
        let visible = |n: &&NodeGpu| scene.is_visible(n.handle) == Some(true);
        // Opaque first, glass over them, sparkles last.
        for (kind, pipeline) in [
            (DrawKind::Sky, &self.pipelines.sky),
            (DrawKind::Baked, &self.pipelines.mesh),
            (DrawKind::Glass, &self.pipelines.glass),
        ] {
            let mut nodes = self
                .nodes
                .iter()
                .filter(|n| n.kind == kind)
                .filter(visible)
                .peekable();
            if nodes.peek().is_none() {
                continue;
            }
            pass.set_pipeline(pipeline);
            if kind == DrawKind::Glass {
                pass.set_bind_group(3, &self.glass_bind_group, &[]);
            }
            for node in nodes {
                pass.set_bind_group(2, &node.bind_group, &[]);
                pass.set_vertex_buffer(0, node.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    node.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..node.index_count, 0, 0..1);
            }
        }
        self.sparkles.draw(pass);
    }
}

/// One frame's render passes.
///
/// Implements [`TransmissionTarget`]: each
/// [`render_scene`](TransmissionTarget::render_scene) records a cleared
/// pass into whichever target is bound. [`finish`](Self::finish) runs the
/// colour grade once the scene passes are recorded.
pub struct SceneFrame<'a> {
    renderer: &'a SceneRenderer,
    encoder: &'a mut wgpu::CommandEncoder,
    screen_view: &'a wgpu::TextureView,
    camera_bind_group: &'a wgpu::BindGroup,
    bound: RenderTargetBinding,
}

impl SceneFrame<'_> {
    /// Grade the final image onto the surface if a gradient is loaded.
    pub fn finish(self) {
        self.renderer
            .gradient_map
            .render(self.encoder, self.screen_view);
    }
}

impl TransmissionTarget for SceneFrame<'_> {
    fn bind_target(&mut self, target: RenderTargetBinding) {
        self.bound = target;
    }

    fn render_scene(&mut self, scene: &SceneGraph) {
        let renderer = self.renderer;
        let (label, color, depth) = match self.bound {
            RenderTargetBinding::Screen => {
                let color = if renderer.gradient_map.is_active() {
                    renderer.gradient_map.input_view()
                } else {
                    self.screen_view
                };
                ("Screen Pass", color, &renderer.screen_depth.view)
            }
            RenderTargetBinding::Offscreen => (
                "Transmission Pass",
                &renderer.offscreen.view,
                &renderer.offscreen.depth.view,
            ),
        };
        let mut pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_bind_group(0, self.camera_bind_group, &[]);
        pass.set_bind_group(1, &renderer.scene_bind_group, &[]);
        renderer.draw_nodes(&mut pass, scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `(group, binding)` pairs a shader declares.
    fn shader_bindings(source: &str) -> Vec<(u32, u32)> {
        source
            .lines()
            .filter_map(|line| {
                let rest = line.trim().strip_prefix("@group(")?;
                let (group, rest) = rest.split_once(')')?;
                let rest = rest.trim().strip_prefix("@binding(")?;
                let (binding, _) = rest.split_once(')')?;
                Some((group.parse().ok()?, binding.parse().ok()?))
            })
            .collect()
    }

    #[test]
    fn glass_layout_matches_shader() {
        let source = include_str!("../../assets/shaders/glass.wgsl");
        let declared: Vec<u32> = shader_bindings(source)
            .into_iter()
            .filter(|(group, _)| *group == 3)
            .map(|(_, binding)| binding)
            .collect();
        let layout: Vec<u32> = glass_layout_entries().iter().map(|e| e.binding).collect();
        assert_eq!(declared, layout);
    }

    #[test]
    fn normal_map_has_its_own_sampler() {
        let source = include_str!("../../assets/shaders/glass.wgsl");
        assert!(source.contains("textureSample(normal_texture, normal_sampler"));
        assert!(!source.contains("textureSample(normal_texture, glass_sampler"));
        let entries = glass_layout_entries();
        assert!(matches!(
            entries[3].ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
        ));
    }
}
