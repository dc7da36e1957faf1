// src/lib.rs
//! rigview
//!
//! An interactive 3D scene viewer built on wgpu and winit: a scene graph of
//! rigid body transforms, color-ID object picking, arcball manipulation and
//! keyframe animation with cubic quaternion interpolation.
//!
//! The scene, animation and math modules have no GPU dependency; the
//! [`gfx`] and [`app`] modules put them on screen.

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod manipulation;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::run;
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use viewer::Viewer;
