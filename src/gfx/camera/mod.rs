pub mod frustum;

pub use frustum::{Frustum, OPENGL_TO_WGPU_MATRIX};
