//! # Geometry
//!
//! CPU-side meshes ready for upload: procedural primitives for the scene's
//! built-in shapes and OBJ loading for the model.
//!
//! ```rust
//! use rigview::gfx::geometry::{generate_cube, generate_plane, generate_sphere};
//!
//! let cube = generate_cube();
//! let ball = generate_sphere(24, 16);
//! let ground = generate_plane(10.0, 4);
//! assert_eq!(cube.triangle_count(), 12);
//! # let _ = (ball, ground);
//! ```

pub mod obj;
pub mod primitives;

use std::collections::BTreeSet;

pub use obj::load_obj;
pub use primitives::*;

use crate::gfx::rendering::vertex::Vertex3D;

/// Triangle mesh data, counter-clockwise winding seen from outside
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaved vertices for the vertex buffer
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex3D {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }

    /// Index pairs of every distinct triangle edge, for line-list drawing
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }

    /// Replaces the normals with area-weighted averages of the adjacent face normals
    pub fn compute_smooth_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| self.positions[i as usize]);
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let face = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            for &i in tri {
                let n = &mut normals[i as usize];
                n[0] += face[0];
                n[1] += face[1];
                n[2] += face[2];
            }
        }
        for n in &mut normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > 0.0 {
                n.iter_mut().for_each(|c| *c /= len);
            }
        }
        self.normals = normals;
    }
}
