//! # User Interface
//!
//! Dear ImGui overlay drawn on top of the scene.
//!
//! - [`UiManager`] - ImGui context, winit input capture and the wgpu renderer
//! - [`panel`] - the status window: fps, picked node, keyframes, playback and key help
//!
//! When ImGui wants the mouse or keyboard, the app does not forward those
//! events to the viewer.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{status_panel, KEY_HELP};
