//! WGPU renderer for rigview's draw lists
//!
//! The viewer records a [`DrawList`] each frame; the engine uploads one
//! [`DrawUniform`] per command and replays the list with the pipeline its
//! material asks for. The pick pass replays a pick list into an offscreen
//! target and reads back the pixel under the cursor.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;

use crate::error::{Result as ViewerResult, ViewerError};
use crate::gfx::geometry::GeometryData;
use crate::gfx::resources::{MaterialTable, Shading, TextureResource};
use crate::scene::{DrawList, GeometryId};
use crate::viewer::PickTarget;
use crate::wgpu_utils::DynamicUniformBuffer;

use super::draw_uniform::DrawUniform;
use super::pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager};

const SHADER: &str = "scene";
const LIT: &str = "lit";
const SKYBOX: &str = "skybox";
const WIREFRAME: &str = "wireframe";
const PICK: &str = "pick";
const PICK_SKYBOX: &str = "pick_skybox";

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.12,
    a: 1.0,
};

/// Slots the draw uniform buffer starts with
const INITIAL_DRAW_CAPACITY: usize = 64;

/// Pipeline a draw goes through, by material shading and pass
pub fn pipeline_for(shading: Shading, pick: bool) -> &'static str {
    match (shading, pick) {
        (Shading::Skybox, false) => SKYBOX,
        (Shading::Skybox, true) => PICK_SKYBOX,
        (Shading::Wireframe, false) => WIREFRAME,
        (Shading::Lit | Shading::Unlit, false) => LIT,
        (_, true) => PICK,
    }
}

/// Vertex buffer plus triangle and edge index buffers of one geometry
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    triangle_buffer: wgpu::Buffer,
    triangle_index_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, data: &GeometryData) -> Self {
        let vertices = data.to_vertices();
        let edges = data.edge_indices();
        let index_buffer = |suffix: &str, indices: &[u32]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {suffix}")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        };
        Self {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} vertices")),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            triangle_buffer: index_buffer("triangles", &data.indices),
            triangle_index_count: data.indices.len() as u32,
            edge_buffer: index_buffer("edges", &edges),
            edge_index_count: edges.len() as u32,
        }
    }
}

/// Surface, device and every GPU resource the viewer draws with
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    depth_texture: TextureResource,
    pick_target: TextureResource,
    pick_depth: TextureResource,
    pick_readback: wgpu::Buffer,
    pipeline_manager: PipelineManager,
    draw_uniforms: DynamicUniformBuffer<DrawUniform>,
    meshes: HashMap<GeometryId, GpuMesh>,
    materials: MaterialTable,
}

impl RenderEngine {
    /// Creates a render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `materials` - Material lookup for the draws the engine will receive
    ///
    /// # Errors
    /// Fails when no adapter or device is available or the surface cannot be created
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        materials: MaterialTable,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("rigview device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to request a GPU device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("surface reports no texture formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();

        let depth_texture =
            TextureResource::create_depth_texture(&device, config.width, config.height, "depth_texture");
        let pick_target = TextureResource::create_pick_target(&device, config.width, config.height);
        let pick_depth =
            TextureResource::create_depth_texture(&device, config.width, config.height, "pick_depth");
        let pick_readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pick readback"),
            size: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let uniform_layout = DynamicUniformBuffer::<DrawUniform>::create_layout(&device);
        let draw_uniforms =
            DynamicUniformBuffer::new(&device, uniform_layout.clone(), INITIAL_DRAW_CAPACITY);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader(SHADER, include_str!("scene.wgsl"));
        register_pipelines(&mut pipeline_manager, uniform_layout, format);
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            anyhow::bail!("failed to build pipelines: {}", errors.join("; "));
        }

        Ok(Self {
            surface,
            device,
            queue,
            config,
            format,
            depth_texture,
            pick_target,
            pick_depth,
            pick_readback,
            pipeline_manager,
            draw_uniforms,
            meshes: HashMap::new(),
            materials,
        })
    }

    /// Uploads `data` as the mesh drawn for `id`, replacing any previous one
    pub fn upload_geometry(&mut self, id: GeometryId, data: &GeometryData) {
        debug!(
            "uploading geometry {:?}: {} vertices, {} triangles",
            id,
            data.vertex_count(),
            data.triangle_count()
        );
        let mesh = GpuMesh::upload(&self.device, &format!("geometry {}", id.0), data);
        self.meshes.insert(id, mesh);
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// # Arguments
    /// * `draws` - the frame's draw list, replayed in order
    /// * `ui_callback` - Optional function that renders UI elements on top
    pub fn render_frame<F>(&mut self, draws: &DrawList, ui_callback: Option<F>) -> anyhow::Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e).context("failed to acquire the next frame"),
        };
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.upload_uniforms(draws);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(depth_attachment(&self.depth_texture)),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.replay(&mut render_pass, draws, false);
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Writes the uniform block of every command into its slot
    fn upload_uniforms(&mut self, draws: &DrawList) {
        let blocks: Vec<DrawUniform> = draws
            .commands()
            .iter()
            .map(|command| DrawUniform::from_command(command, self.materials.get(command.material)))
            .collect();
        self.draw_uniforms.write(&self.device, &self.queue, &blocks);
    }

    /// Issues one draw per command; commands without an uploaded mesh are skipped
    fn replay(&self, pass: &mut wgpu::RenderPass<'_>, draws: &DrawList, pick: bool) {
        for (index, command) in draws.commands().iter().enumerate() {
            let Some(mesh) = self.meshes.get(&command.geometry) else {
                warn!("no mesh uploaded for {:?}", command.geometry);
                continue;
            };
            let shading = self.materials.get(command.material).shading;
            let name = pipeline_for(shading, pick);
            let Some(pipeline) = self.pipeline_manager.pipeline(name) else {
                warn!("pipeline '{name}' is missing");
                continue;
            };

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, self.draw_uniforms.bind_group(), &[self.draw_uniforms.offset(index)]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            if name == WIREFRAME {
                pass.set_index_buffer(mesh.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.edge_index_count, 0, 0..1);
            } else {
                pass.set_index_buffer(mesh.triangle_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.triangle_index_count, 0, 0..1);
            }
        }
    }

    /// Reconfigures the surface and recreates every size-dependent target
    ///
    /// # Arguments
    /// * `width` - New surface width in pixels
    /// * `height` - New surface height in pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, width, height, "depth_texture");
        self.pick_target = TextureResource::create_pick_target(&self.device, width, height);
        self.pick_depth =
            TextureResource::create_depth_texture(&self.device, width, height, "pick_depth");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used for creating compatible render targets and the UI renderer
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

impl PickTarget for RenderEngine {
    /// Renders `draws` into the pick target and returns the RGB of pixel `(x, y)`.
    ///
    /// Blocks until the GPU has finished the pass. Coordinates outside the
    /// target are clamped to its edge.
    fn read_pick_pixel(&mut self, draws: &DrawList, x: u32, y: u32) -> ViewerResult<[u8; 3]> {
        self.upload_uniforms(draws);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pick_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.pick_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(depth_attachment(&self.pick_depth)),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.replay(&mut render_pass, draws, true);
        }

        let x = x.min(self.pick_target.width().saturating_sub(1));
        let y = y.min(self.pick_target.height().saturating_sub(1));
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.pick_target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.pick_readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.pick_readback.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| ViewerError::Readback(e.to_string()))?;

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {
                let pixel = {
                    let mapped = slice.get_mapped_range();
                    [mapped[0], mapped[1], mapped[2]]
                };
                self.pick_readback.unmap();
                debug!("pick pixel ({x}, {y}) = {pixel:?}");
                Ok(pixel)
            }
            Ok(Err(e)) => Err(ViewerError::Readback(e.to_string())),
            Err(_) => Err(ViewerError::Readback("map callback dropped".to_string())),
        }
    }
}

fn depth_attachment(depth: &TextureResource) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view: &depth.view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(1.0),
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}

fn register_pipelines(
    manager: &mut PipelineManager,
    uniform_layout: wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) {
    let depth = TextureResource::DEPTH_FORMAT;
    let pick_format = TextureResource::PICK_FORMAT;
    let layouts = vec![uniform_layout];

    manager.register_pipeline(
        LIT,
        PipelineConfig::new("Lit Pipeline", SHADER, surface_format)
            .with_bind_group_layouts(layouts.clone())
            .with_depth(DepthConfig::standard(depth)),
    );
    manager.register_pipeline(
        SKYBOX,
        PipelineConfig::new("Skybox Pipeline", SHADER, surface_format)
            .with_entry_points("vs_sky", "fs_sky")
            .with_bind_group_layouts(layouts.clone())
            .with_cull_mode(None)
            .with_depth(DepthConfig::backdrop(depth)),
    );
    manager.register_pipeline(
        WIREFRAME,
        PipelineConfig::new("Wireframe Pipeline", SHADER, surface_format)
            .with_entry_points("vs_main", "fs_flat")
            .with_bind_group_layouts(layouts.clone())
            .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
            .with_cull_mode(None)
            .with_depth(DepthConfig::standard(depth)),
    );
    manager.register_pipeline(
        PICK,
        PipelineConfig::new("Pick Pipeline", SHADER, pick_format)
            .with_entry_points("vs_main", "fs_flat")
            .with_bind_group_layouts(layouts.clone())
            .with_depth(DepthConfig::standard(depth)),
    );
    manager.register_pipeline(
        PICK_SKYBOX,
        PipelineConfig::new("Pick Skybox Pipeline", SHADER, pick_format)
            .with_entry_points("vs_sky", "fs_sky_flat")
            .with_bind_group_layouts(layouts)
            .with_cull_mode(None)
            .with_depth(DepthConfig::backdrop(depth)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_pass_never_uses_surface_pipelines() {
        for shading in [Shading::Lit, Shading::Unlit, Shading::Wireframe] {
            assert_eq!(pipeline_for(shading, true), PICK);
        }
        assert_eq!(pipeline_for(Shading::Skybox, true), PICK_SKYBOX);
    }

    #[test]
    fn test_surface_pipelines_by_shading() {
        assert_eq!(pipeline_for(Shading::Lit, false), LIT);
        assert_eq!(pipeline_for(Shading::Unlit, false), LIT);
        assert_eq!(pipeline_for(Shading::Skybox, false), SKYBOX);
        assert_eq!(pipeline_for(Shading::Wireframe, false), WIREFRAME);
    }
}
