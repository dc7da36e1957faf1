// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, per-draw uniforms, frame rendering and pick readback.

pub mod draw_uniform;
pub mod pipeline_manager;
pub mod render_engine;
pub mod vertex;

pub use draw_uniform::DrawUniform;
pub use pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager};
pub use render_engine::{pipeline_for, RenderEngine};
pub use vertex::Vertex3D;
