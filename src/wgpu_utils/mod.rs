// src/wgpu_utils/mod.rs
//! WGPU helpers shared by the renderer

pub mod uniform_buffer;

pub use uniform_buffer::{aligned_stride, DynamicUniformBuffer};
