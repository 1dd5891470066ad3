//! Render targets and sampled textures.

use wgpu::util::DeviceExt;

use crate::scene::TextureData;

/// Depth format shared by every scene pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A depth attachment and its default view.
pub struct DepthTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    /// Create a depth attachment of the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// How the offscreen buffer is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSizing {
    /// Follows the viewport.
    Viewport,
    /// Fixed size regardless of the viewport.
    Fixed(u32, u32),
}

/// The color target the transmission pass renders into, plus its depth.
///
/// The color texture is created with `RENDER_ATTACHMENT | TEXTURE_BINDING`
/// so glass can sample what was rendered behind it. Created once per scene
/// session; recreated only when a viewport-sized buffer sees a resize.
pub struct OffscreenColorBuffer {
    /// Color texture.
    pub texture: wgpu::Texture,
    /// View used both as attachment and for sampling.
    pub view: wgpu::TextureView,
    /// Depth attachment of matching size.
    pub depth: DepthTexture,
    sizing: BufferSizing,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl OffscreenColorBuffer {
    /// Create the buffer for a viewport of the given size.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        sizing: BufferSizing,
        viewport: (u32, u32),
    ) -> Self {
        let (width, height) = Self::resolve_size(sizing, viewport);
        let (texture, view) = Self::create_color(device, format, width, height);
        let depth = DepthTexture::new(device, "Transmission Depth", width, height);
        log::debug!("transmission buffer {width}x{height} ({sizing:?})");
        Self {
            texture,
            view,
            depth,
            sizing,
            format,
            width,
            height,
        }
    }

    fn resolve_size(sizing: BufferSizing, viewport: (u32, u32)) -> (u32, u32) {
        let (w, h) = match sizing {
            BufferSizing::Viewport => viewport,
            BufferSizing::Fixed(w, h) => (w, h),
        };
        (w.max(1), h.max(1))
    }

    fn create_color(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Transmission Color"),
            size: wgpu::Extent3d {
                width,
                height,
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

    /// Follow a viewport resize. Returns `true` when the textures were
    /// recreated (bind groups sampling the buffer must be rebuilt).
    pub fn resize(&mut self, device: &wgpu::Device, viewport: (u32, u32)) -> bool {
        let size = Self::resolve_size(self.sizing, viewport);
        if size == (self.width, self.height) {
            return false;
        }
        let (texture, view) = Self::create_color(device, self.format, size.0, size.1);
        self.texture = texture;
        self.view = view;
        self.depth = DepthTexture::new(device, "Transmission Depth", size.0, size.1);
        (self.width, self.height) = size;
        true
    }

    /// Current size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A sampled 2D texture uploaded from [`TextureData`].
pub struct GpuTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    /// Upload RGBA8 pixels. `srgb` selects the color-space of the format.
    #[must_use]
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &TextureData,
        srgb: bool,
    ) -> Self {
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width.max(1),
                    height: data.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}
