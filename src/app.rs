//! # Application
//!
//! winit event loop glue: owns the window, the render engine, the UI overlay
//! and the [`Viewer`], forwards input to the viewer and renders on redraw.
//! Playback ticks are paced by the player's frame rate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::gfx::geometry::{generate_cube, generate_plane, generate_sphere, load_obj};
use crate::gfx::rendering::RenderEngine;
use crate::gfx::resources::MaterialTable;
use crate::input::{InputAction, InputController};
use crate::scene::DrawList;
use crate::ui::{status_panel, UiManager, KEY_HELP};
use crate::viewer::{Viewer, CUBE, GROUND_HALF_SIZE, MODEL, PLANE, SPHERE};

const SPHERE_SLICES: u32 = 32;
const SPHERE_STACKS: u32 = 16;
const GROUND_SEGMENTS: u32 = 8;

/// Opens the window and runs the viewer until it is closed
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create the event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = AppState::new(config)?;
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;
    app.failure.map_or(Ok(()), Err)
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    viewer: Viewer,
    input: InputController,
    draws: DrawList,
    last_tick: Instant,
    /// Setup error that stopped the event loop
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let input = InputController::new(config.window_height, config.keyframe_file.clone());
        let viewer = Viewer::new(config).context("failed to build the scene")?;
        Ok(Self {
            window: None,
            render_engine: None,
            ui_manager: None,
            viewer,
            input,
            draws: DrawList::new(),
            last_tick: Instant::now(),
            failure: None,
        })
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let config = self.viewer.config();
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("rigview")
                    .with_inner_size(PhysicalSize::new(config.window_width, config.window_height)),
            )
            .context("failed to create the window")?;
        let window = Arc::new(window);
        let PhysicalSize { width, height } = window.inner_size();

        let window_clone = window.clone();
        let mut engine = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, MaterialTable::with_viewer_palette()).await
        })?;

        engine.upload_geometry(CUBE, &generate_cube());
        engine.upload_geometry(SPHERE, &generate_sphere(SPHERE_SLICES, SPHERE_STACKS));
        engine.upload_geometry(PLANE, &generate_plane(GROUND_HALF_SIZE as f32, GROUND_SEGMENTS));
        let model = match &config.model_path {
            Some(path) => load_obj(path)?,
            None => generate_sphere(SPHERE_SLICES, SPHERE_STACKS),
        };
        engine.upload_geometry(MODEL, &model);

        let ui_manager = UiManager::new(engine.device(), engine.queue(), engine.surface_format(), &window);

        self.viewer.resize(width, height);
        self.input.resize(height);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(engine);
        self.window = Some(window);
        info!("window {width}x{height} ready");
        Ok(())
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        let result = match action {
            InputAction::Command(command) => match self.render_engine.as_mut() {
                Some(engine) => self.viewer.execute(command, engine),
                None => Ok(()),
            },
            InputAction::Drag(drag) => self.viewer.manipulate(&drag),
            InputAction::EndDrag => {
                self.viewer.end_drag();
                Ok(())
            }
            InputAction::Help => {
                for (key, action) in KEY_HELP {
                    info!("{key:<32} {action}");
                }
                Ok(())
            }
            InputAction::Quit => {
                event_loop.exit();
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("{e}");
        }
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let (Some(engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref()) else {
            return Ok(());
        };

        if self.viewer.is_playing() {
            let interval =
                Duration::from_secs_f64(self.viewer.animator().player().tick_interval_secs());
            if self.last_tick.elapsed() >= interval {
                self.viewer.tick()?;
                self.last_tick = Instant::now();
            }
        }

        self.draws.clear();
        self.viewer.draw(&mut self.draws)?;

        let Some(ui_manager) = self.ui_manager.as_mut() else {
            return engine.render_frame(
                &self.draws,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            );
        };

        let status = self.viewer.status();
        let picking = self.input.is_picking();
        let fps = ui_manager.framerate();
        let mut ui_result = Ok(());
        engine.render_frame(
            &self.draws,
            Some(|device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                ui_result = ui_manager.draw(device, queue, encoder, window, view, |ui| {
                    status_panel(ui, &status, fps, picking)
                });
            }),
        )?;
        ui_result
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            error!("{e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        let action = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                None
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(engine) = self.render_engine.as_mut() {
                    engine.resize(width, height);
                }
                self.viewer.resize(width, height);
                self.input.resize(height);
                None
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.input.key(code, state, repeat),
            WindowEvent::MouseInput { state, button, .. } => self.input.mouse_button(button, state),
            WindowEvent::CursorMoved { position, .. } => self.input.cursor_moved(position.x, position.y),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    error!("{e:#}");
                }
                return;
            }
            _ => return,
        };

        if let Some(action) = action {
            self.handle_action(action, event_loop);
        }
        window.request_redraw();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_playing() {
            event_loop.set_control_flow(ControlFlow::Poll);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}
