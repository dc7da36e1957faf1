//! # Graphics Module
//!
//! GPU side of the viewer: camera projection, mesh generation and loading,
//! materials, and the wgpu render engine that replays a [`DrawList`].
//!
//! - **Camera** ([`camera`]) - Frustum and projection matrix
//! - **Geometry** ([`geometry`]) - Built-in shapes and OBJ loading
//! - **Rendering** ([`rendering`]) - Pipelines, per-draw uniforms, frame and pick passes
//! - **Resources** ([`resources`]) - Materials and render targets
//!
//! [`DrawList`]: crate::scene::DrawList

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;

pub use camera::Frustum;
pub use rendering::RenderEngine;
