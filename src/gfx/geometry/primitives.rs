//! # Primitive Shapes
//!
//! Procedural meshes for the built-in scene shapes. All are centered at the
//! origin and Y is up.

use std::f32::consts::PI;

use super::GeometryData;

/// Unit cube, corners at `±0.5`, four vertices per face so each face has a flat normal
pub fn generate_cube() -> GeometryData {
    // (normal, u, v) with u x v = normal so corners wind counter-clockwise
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut data = GeometryData::new();
    for (n, u, v) in FACES {
        let base = data.positions.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            data.positions.push([
                0.5 * n[0] + su * u[0] + sv * v[0],
                0.5 * n[1] + su * u[1] + sv * v[1],
                0.5 * n[2] + su * u[2] + sv * v[2],
            ]);
            data.normals.push(n);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// UV sphere of radius 1.
///
/// # Arguments
/// * `slices` - segments around the Y axis, at least 3
/// * `stacks` - segments from pole to pole, at least 2
pub fn generate_sphere(slices: u32, stacks: u32) -> GeometryData {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut data = GeometryData::new();

    for stack in 0..=stacks {
        let theta = stack as f32 * PI / stacks as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for slice in 0..=slices {
            let phi = slice as f32 * 2.0 * PI / slices as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            let p = [sin_t * cos_p, cos_t, -sin_t * sin_p];
            data.positions.push(p);
            data.normals.push(p);
        }
    }

    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let top = stack * row + slice;
            let bottom = top + row;
            data.indices
                .extend_from_slice(&[top, bottom, bottom + 1, top, bottom + 1, top + 1]);
        }
    }
    data
}

/// Square in the XZ plane facing +Y.
///
/// # Arguments
/// * `half_size` - distance from the center to each edge
/// * `segments` - subdivisions per side, at least 1
pub fn generate_plane(half_size: f32, segments: u32) -> GeometryData {
    let segments = segments.max(1);
    let mut data = GeometryData::new();
    let step = 2.0 * half_size / segments as f32;

    for row in 0..=segments {
        let z = half_size - row as f32 * step;
        for col in 0..=segments {
            data.positions.push([-half_size + col as f32 * step, 0.0, z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    let stride = segments + 1;
    for row in 0..segments {
        for col in 0..segments {
            let near = row * stride + col;
            let far = near + stride;
            data.indices
                .extend_from_slice(&[near, near + 1, far + 1, near, far + 1, far]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Normal of triangle `t` from its winding
    fn winding_normal(g: &GeometryData, t: usize) -> [f32; 3] {
        let [a, b, c] = [0, 1, 2].map(|k| g.positions[g.indices[3 * t + k] as usize]);
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_cube_counts() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube
            .positions
            .iter()
            .all(|p| p.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6)));
    }

    #[test]
    fn test_cube_winds_outward() {
        let cube = generate_cube();
        for t in 0..cube.triangle_count() {
            let n = cube.normals[cube.indices[3 * t] as usize];
            assert!(dot(winding_normal(&cube, t), n) > 0.0, "triangle {t}");
        }
    }

    #[test]
    fn test_sphere_is_unit_and_winds_outward() {
        let sphere = generate_sphere(12, 8);
        assert_eq!(sphere.vertex_count(), 13 * 9);
        assert_eq!(sphere.triangle_count(), 2 * 12 * 8);
        for p in &sphere.positions {
            assert!((dot(*p, *p) - 1.0).abs() < 1e-5);
        }
        for t in 0..sphere.triangle_count() {
            let n = winding_normal(&sphere, t);
            // pole triangles are degenerate
            if dot(n, n) < 1e-10 {
                continue;
            }
            let [a, b, c] = [0, 1, 2].map(|k| sphere.positions[sphere.indices[3 * t + k] as usize]);
            let centroid = [a[0] + b[0] + c[0], a[1] + b[1] + c[1], a[2] + b[2] + c[2]];
            assert!(dot(n, centroid) > 0.0, "triangle {t}");
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let plane = generate_plane(10.0, 2);
        assert_eq!(plane.vertex_count(), 9);
        assert_eq!(plane.triangle_count(), 8);
        for t in 0..plane.triangle_count() {
            assert!(winding_normal(&plane, t)[1] > 0.0);
        }
        let max_x = plane.positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert_eq!(max_x, 10.0);
    }
}
