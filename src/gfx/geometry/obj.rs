//! Wavefront OBJ loading

use std::path::Path;

use anyhow::{ensure, Context};
use log::{debug, info};

use super::GeometryData;

/// Loads every model in an OBJ file into one mesh.
///
/// Faces are triangulated. Materials are ignored; the model is drawn with
/// the scene's model material. Files without per-vertex normals get smooth
/// normals computed from the faces.
pub fn load_obj(path: &Path) -> anyhow::Result<GeometryData> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("failed to load OBJ file {}", path.display()))?;

    let mut data = GeometryData::new();
    let mut needs_normals = false;
    for model in &models {
        let mesh = &model.mesh;
        let base = data.positions.len() as u32;
        let count = mesh.positions.len() / 3;
        debug!(
            "obj model {:?}: {} vertices, {} triangles",
            model.name,
            count,
            mesh.indices.len() / 3
        );

        data.positions
            .extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));
        if mesh.normals.len() == mesh.positions.len() {
            data.normals
                .extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        } else {
            needs_normals = true;
            data.normals.extend(std::iter::repeat([0.0; 3]).take(count));
        }
        data.indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    ensure!(
        !data.indices.is_empty(),
        "OBJ file {} has no faces",
        path.display()
    );
    if needs_normals {
        data.compute_smooth_normals();
    }

    info!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        data.vertex_count(),
        data.triangle_count()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_a_triangle_and_computes_normals() {
        let path = std::env::temp_dir().join(format!("rigview-tri-{}.obj", std::process::id()));
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mesh = load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!((mesh.normals[0][2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_obj(Path::new("/definitely/not/here.obj")).unwrap_err();
        assert!(err.to_string().contains("here.obj"));
    }
}
