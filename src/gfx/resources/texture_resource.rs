//! Render target textures
//!
//! Depth buffers for the frame and pick passes, and the offscreen color
//! target the pick pass renders ids into.

/// Texture with its default view
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TextureResource {
    /// Depth format used by every pass
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Pick ids are read back as 8-bit channels; must stay a non-srgb format
    pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Depth buffer for a `width` x `height` target
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `width`, `height` - size of the color target it pairs with
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        Self::create(
            device,
            width,
            height,
            label,
            Self::DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
    }

    /// Offscreen color target for the pick pass; copyable so one pixel can be read back
    pub fn create_pick_target(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self::create(
            device,
            width,
            height,
            "pick_target",
            Self::PICK_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        )
    }

    fn create(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        label: &str,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
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
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }
}
