// src/gfx/resources/mod.rs
//! GPU-facing resources: render targets and materials

pub mod material;
pub mod texture_resource;

pub use material::{Material, MaterialTable, Shading};
pub use texture_resource::TextureResource;
