//! Per-draw uniform block
//!
//! MUST match `DrawUniform` in `scene.wgsl`. The block is exactly 256 bytes
//! so consecutive draws sit at the usual dynamic offset alignment.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::gfx::resources::material::{Material, Shading};
use crate::math::to_gpu_matrix;
use crate::scene::{DrawCommand, LIGHT_COUNT};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    /// Inverse transpose of `model_view`, for eye-space normals
    pub normal_matrix: [[f32; 4]; 4],
    /// Eye-space light positions, `w` unused
    pub lights: [[f32; 4]; LIGHT_COUNT],
    pub color: [f32; 4],
    /// `x` is 1 when the fragment is lit, 0 for a flat color
    pub flags: [f32; 4],
}

impl DrawUniform {
    /// Packs a recorded draw. A pick color overrides the material and disables lighting.
    pub fn from_command(command: &DrawCommand, material: &Material) -> Self {
        let u = &command.uniforms;
        let normal_matrix = u
            .model_view
            .invert()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix4::identity);

        let (color, lit) = match u.id_color {
            Some([r, g, b]) => ([r, g, b, 1.0], false),
            None => (material.base_color, material.shading == Shading::Lit),
        };

        Self {
            projection: to_gpu_matrix(&u.projection),
            model_view: to_gpu_matrix(&u.model_view),
            normal_matrix: to_gpu_matrix(&normal_matrix),
            lights: u
                .lights
                .map(|l| [l.x as f32, l.y as f32, l.z as f32, 1.0]),
            color,
            flags: [if lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    use crate::scene::{GeometryId, MaterialId, Uniforms};

    fn command(uniforms: Uniforms) -> DrawCommand {
        DrawCommand {
            geometry: GeometryId(0),
            material: MaterialId(0),
            uniforms,
        }
    }

    #[test]
    fn test_block_size_matches_offset_alignment() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 256);
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let uniforms = Uniforms {
            model_view: Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0),
            ..Uniforms::default()
        };
        let u = DrawUniform::from_command(&command(uniforms), &Material::default());
        assert_eq!(u.normal_matrix[0][0], 0.5);
        assert_eq!(u.normal_matrix[1][1], 0.25);
        assert_eq!(u.normal_matrix[2][2], 1.0);
        assert_eq!(u.flags[0], 1.0);
    }

    #[test]
    fn test_pick_color_is_flat() {
        let uniforms = Uniforms {
            id_color: Some([0.25, 0.5, 0.75]),
            lights: [Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 0.0)],
            ..Uniforms::default()
        };
        let u = DrawUniform::from_command(&command(uniforms), &Material::default());
        assert_eq!(u.color, [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(u.flags[0], 0.0);
        assert_eq!(u.lights[0], [1.0, 2.0, 3.0, 1.0]);
    }
}
