// src/ui/manager.rs
//! ImGui integration with wgpu and winit: frame timing, input capture and
//! drawing the overlay on top of the rendered scene.

use anyhow::Context as _;
use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

const FONT_SIZE: f32 = 18.0;

/// Owns the ImGui context, its winit platform glue and its wgpu renderer
pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Sets up ImGui with a locked DPI scale and the default font
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating renderer resources
    /// * `queue` - WGPU queue for renderer operations
    /// * `output_color_format` - Format of the surface the overlay draws into
    /// * `window` - Window for platform integration
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Feeds an input event to ImGui
    ///
    /// # Returns
    /// True if the overlay wants the event, so the viewer should ignore it
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        match event {
            Event::WindowEvent {
                event:
                    WindowEvent::CursorMoved { .. }
                    | WindowEvent::MouseInput { .. }
                    | WindowEvent::MouseWheel { .. }
                    | WindowEvent::KeyboardInput { .. }
                    | WindowEvent::Focused(_),
                ..
            } => {
                self.platform
                    .handle_event(self.context.io_mut(), window, event);
                let io = self.context.io();
                io.want_capture_mouse || io.want_capture_keyboard
            }
            _ => false,
        }
    }

    /// Builds this frame's overlay with `run_ui` and records it into `encoder`
    ///
    /// The pass loads the existing color so the scene stays underneath.
    ///
    /// # Arguments
    /// * `device` - WGPU device for render operations
    /// * `queue` - WGPU queue for buffer uploads
    /// * `encoder` - Command encoder to record render commands
    /// * `window` - Window reference for platform integration
    /// * `color_attachment` - Target texture view for rendering
    /// * `run_ui` - Callback function that builds the UI
    pub fn draw<F>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        color_attachment: &TextureView,
        run_ui: F,
    ) -> anyhow::Result<()>
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform
            .prepare_frame(self.context.io_mut(), window)
            .context("failed to prepare the UI frame")?;

        let ui = self.context.frame();
        run_ui(ui);
        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return Ok(());
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .map_err(|e| anyhow::anyhow!("failed to render the UI: {e:?}"))
    }

    /// Frames per second, averaged by ImGui
    pub fn framerate(&self) -> f32 {
        self.context.io().framerate
    }
}
