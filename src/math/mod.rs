//! # Math Module
//!
//! Rigid body transforms and the quaternion machinery used to animate them.
//!
//! - [`Rbt`] - rotation + translation with composition, inversion and factorization
//! - [`quat`] - quaternion powers and scaled-axis conversion
//! - [`interpolation`] - cubic keyframe blending ([`slerp_cubic`])
//!
//! Everything here is `f64`; matrices are narrowed to `f32` only when they are
//! handed to the GPU.

pub mod interpolation;
pub mod quat;
pub mod rbt;

pub use interpolation::slerp_cubic;
pub use rbt::Rbt;

use cgmath::{Matrix4, Vector3};

/// Affine model matrix `T(translation) * Rx * Ry * Rz * S(scale)`, angles in degrees
pub fn affine_matrix(
    translation: Vector3<f64>,
    euler_degrees: Vector3<f64>,
    scale: Vector3<f64>,
) -> Matrix4<f64> {
    Matrix4::from_translation(translation)
        * Matrix4::from_angle_x(cgmath::Deg(euler_degrees.x))
        * Matrix4::from_angle_y(cgmath::Deg(euler_degrees.y))
        * Matrix4::from_angle_z(cgmath::Deg(euler_degrees.z))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

/// Narrows a matrix to the column arrays uploaded to uniform buffers
pub fn to_gpu_matrix(m: &Matrix4<f64>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = m[i][j] as f32;
        }
    }
    result
}
