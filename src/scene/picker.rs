//! # Picker
//!
//! Color-coded object selection. The pick pass draws every shape in a flat
//! color encoding a small integer id; reading one pixel back and decoding it
//! yields the transform node that owns the shape under the cursor.
//!
//! Ids are packed four bits per channel, red holding the low nibble:
//!
//! ```text
//! id = 0xBGR   ->   red   = R / 16 + 0.5 / 16
//!                   green = G / 16 + 0.5 / 16
//!                   blue  = B / 16 + 0.5 / 16
//! ```
//!
//! The half-step offset keeps the value in the middle of its bucket so 8-bit
//! framebuffer rounding never moves it into a neighbour. Decoding is
//! `byte >> 4` per channel. Id `0` is the clear color and means "nothing".

use std::collections::HashMap;

use log::debug;

use crate::error::{Result, ViewerError};
use crate::math::Rbt;

use super::drawer::{Drawer, ShapeRenderer, Uniforms};
use super::graph::{NodeId, ShapeNode, TransformNode};
use super::visitor::SceneVisitor;

/// Largest id three nibbles can encode; scenes with more shapes cannot be picked
pub const MAX_PICK_ID: u32 = 0xfff;

/// Flat color for an id, each channel in `[0, 1]`
pub fn id_to_color(id: u32) -> [f32; 3] {
    let channel = |shift: u32| ((id >> shift) & 0xf) as f32 / 16.0 + 0.5 / 16.0;
    [channel(0), channel(4), channel(8)]
}

/// Id encoded in a read-back 8-bit RGB pixel
pub fn color_to_id(rgb: [u8; 3]) -> u32 {
    (rgb[0] >> 4) as u32 | ((rgb[1] >> 4) as u32) << 4 | ((rgb[2] >> 4) as u32) << 8
}

/// Id to node lookup produced by one pick pass
#[derive(Debug, Default, Clone)]
pub struct PickMap {
    ids: HashMap<u32, NodeId>,
}

impl PickMap {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<NodeId> {
        self.ids.get(&id).copied()
    }

    /// Node owning the shape drawn with this pixel color.
    ///
    /// `None` for the background and for shapes with no enclosing rbt node.
    pub fn resolve(&self, rgb: [u8; 3]) -> Option<NodeId> {
        let id = color_to_id(rgb);
        let node = self.get(id);
        debug!("pick pixel {rgb:?} -> id {id} -> {node:?}");
        node
    }
}

/// Drawer that paints each shape with its id color and records who owns it
pub struct Picker<'a, R: ShapeRenderer + ?Sized> {
    drawer: Drawer<'a, R>,
    /// Enclosing transform nodes, innermost last, flagged when editable
    node_stack: Vec<(NodeId, bool)>,
    next_id: u32,
    map: PickMap,
    overflowed: bool,
}

impl<'a, R: ShapeRenderer + ?Sized> Picker<'a, R> {
    /// # Arguments
    /// * `renderer` - receives the flat-colored draws
    /// * `uniforms` - frame-wide values, as for [`Drawer::new`]
    /// * `base` - frame the stack starts at
    pub fn new(renderer: &'a mut R, uniforms: Uniforms, base: Rbt) -> Self {
        Self {
            drawer: Drawer::new(renderer, uniforms, base),
            node_stack: Vec::new(),
            next_id: 0,
            map: PickMap::default(),
            overflowed: false,
        }
    }

    /// Ends the pass and hands out the id map.
    ///
    /// # Errors
    /// [`ViewerError::PickOverflow`] when the scene had more shapes than
    /// [`MAX_PICK_ID`]; the traversal was cut short and the map is unusable.
    pub fn finish(self) -> Result<PickMap> {
        if self.overflowed {
            return Err(ViewerError::PickOverflow { max: MAX_PICK_ID });
        }
        debug!("pick pass assigned {} ids", self.next_id);
        Ok(self.map)
    }
}

impl<R: ShapeRenderer + ?Sized> SceneVisitor for Picker<'_, R> {
    fn visit_transform(&mut self, id: NodeId, node: &TransformNode) -> bool {
        self.node_stack.push((id, node.is_rbt()));
        self.drawer.visit_transform(id, node)
    }

    fn post_visit_transform(&mut self, id: NodeId, node: &TransformNode) -> bool {
        self.node_stack.pop();
        self.drawer.post_visit_transform(id, node)
    }

    fn visit_shape(&mut self, id: NodeId, node: &ShapeNode) -> bool {
        if self.next_id == MAX_PICK_ID {
            self.overflowed = true;
            return false;
        }
        self.next_id += 1;
        let pick_id = self.next_id;

        // shapes hanging directly off the root are drawn but never picked
        if let Some((owner, _)) = self.node_stack.iter().rev().find(|(_, rbt)| *rbt) {
            self.map.ids.insert(pick_id, *owner);
        }

        self.drawer.set_id_color(Some(id_to_color(pick_id)));
        self.drawer.visit_shape(id, node)
    }

    fn post_visit_shape(&mut self, id: NodeId, node: &ShapeNode) -> bool {
        self.drawer.post_visit_shape(id, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DrawList, GeometryId, MaterialId, SceneGraph};

    /// What an 8-bit unorm framebuffer stores for a color
    fn unorm8(color: [f32; 3]) -> [u8; 3] {
        color.map(|c| (c * 255.0).round() as u8)
    }

    fn shape() -> ShapeNode {
        ShapeNode::new(GeometryId(0), MaterialId(0))
    }

    #[test]
    fn test_every_id_survives_the_framebuffer() {
        for id in 0..=MAX_PICK_ID {
            assert_eq!(color_to_id(unorm8(id_to_color(id))), id);
        }
    }

    #[test]
    fn test_background_is_no_pick() {
        assert_eq!(color_to_id([0, 0, 0]), 0);
        assert_eq!(PickMap::default().resolve([0, 0, 0]), None);
    }

    #[test]
    fn test_resolves_innermost_rbt_owner() {
        let mut g = SceneGraph::new();
        let sky_box = g.add_shape_node(g.root(), shape()).unwrap();
        let t1 = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        g.add_shape_node(t1, shape()).unwrap();
        let t2 = g.add_rbt_node(t1, Rbt::identity()).unwrap();
        g.add_shape_node(t2, shape()).unwrap();
        g.add_shape_node(t1, shape()).unwrap();

        let mut list = DrawList::new();
        let mut picker = Picker::new(&mut list, Uniforms::default(), Rbt::identity());
        assert!(g.accept(g.root(), &mut picker));
        let map = picker.finish().unwrap();

        let colors: Vec<_> = list
            .commands()
            .iter()
            .map(|c| unorm8(c.uniforms.id_color.unwrap()))
            .collect();
        assert_eq!(colors.len(), 4);
        assert_eq!(map.resolve(colors[0]), None, "{sky_box:?} has no rbt owner");
        assert_eq!(map.resolve(colors[1]), Some(t1));
        assert_eq!(map.resolve(colors[2]), Some(t2));
        assert_eq!(map.resolve(colors[3]), Some(t1));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut g = SceneGraph::new();
        let t = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        for _ in 0..=MAX_PICK_ID {
            g.add_shape_node(t, shape()).unwrap();
        }

        let mut list = DrawList::new();
        let mut picker = Picker::new(&mut list, Uniforms::default(), Rbt::identity());
        assert!(!g.accept(g.root(), &mut picker));
        assert!(matches!(
            picker.finish(),
            Err(ViewerError::PickOverflow { max: MAX_PICK_ID })
        ));
        assert_eq!(list.len(), MAX_PICK_ID as usize);
    }
}
