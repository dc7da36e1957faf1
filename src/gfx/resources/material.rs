//! Materials for the viewer's shapes
//!
//! A material picks the pipeline a shape is drawn with and the color that
//! pipeline shades with. Shapes reference materials by [`MaterialId`].

use std::collections::HashMap;

use crate::scene::MaterialId;
use crate::viewer::{ARCBALL_MATERIAL, LIGHT_MATERIAL, MODEL_MATERIAL, SKYBOX_MATERIAL};

/// Pipeline family a material draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Diffuse plus specular from the scene lights
    Lit,
    /// Constant color, still depth tested
    Unlit,
    /// Rotation-only backdrop pinned to the far plane
    Skybox,
    /// Triangle edges as lines
    Wireframe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub shading: Shading,
}

impl Material {
    pub fn new(name: &str, base_color: [f32; 4], shading: Shading) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            shading,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", [0.8, 0.8, 0.8, 1.0], Shading::Lit)
    }
}

/// Material lookup; unknown ids fall back to a lit grey
#[derive(Debug, Clone)]
pub struct MaterialTable {
    materials: HashMap<MaterialId, Material>,
    fallback: Material,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            fallback: Material::default(),
        }
    }

    /// Materials for the ids [`build_default_scene`](crate::viewer::build_default_scene) uses
    pub fn with_viewer_palette() -> Self {
        let mut table = Self::new();
        table.insert(
            SKYBOX_MATERIAL,
            Material::new("skybox", [0.55, 0.7, 0.9, 1.0], Shading::Skybox),
        );
        table.insert(
            LIGHT_MATERIAL,
            Material::new("light", [1.0, 0.95, 0.7, 1.0], Shading::Unlit),
        );
        table.insert(
            MODEL_MATERIAL,
            Material::new("model", [0.7, 0.65, 0.6, 1.0], Shading::Lit),
        );
        table.insert(
            ARCBALL_MATERIAL,
            Material::new("arcball", [0.1, 0.9, 0.3, 1.0], Shading::Wireframe),
        );
        table
    }

    pub fn insert(&mut self, id: MaterialId, material: Material) {
        self.materials.insert(id, material);
    }

    pub fn get(&self, id: MaterialId) -> &Material {
        self.materials.get(&id).unwrap_or(&self.fallback)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_covers_viewer_materials() {
        let table = MaterialTable::with_viewer_palette();
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(SKYBOX_MATERIAL).shading, Shading::Skybox);
        assert_eq!(table.get(ARCBALL_MATERIAL).shading, Shading::Wireframe);
        assert_eq!(table.get(LIGHT_MATERIAL).shading, Shading::Unlit);
    }

    #[test]
    fn test_unknown_material_falls_back() {
        let table = MaterialTable::with_viewer_palette();
        assert_eq!(table.get(MaterialId(99)), &Material::default());
    }
}
