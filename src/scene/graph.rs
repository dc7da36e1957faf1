//! # Scene Graph
//!
//! An arena-backed tree of transform and shape nodes. Nodes are addressed by
//! [`NodeId`]; node identity is handle identity, never structural equality.
//!
//! Transform nodes carry a rigid body transform relative to their parent and
//! own an ordered list of children. Shape nodes are drawable leaves carrying a
//! model-space affine matrix and shared geometry/material handles.
//!
//! ```no_run
//! use rigview::math::Rbt;
//! use rigview::scene::{GeometryId, MaterialId, SceneGraph, ShapeNode};
//!
//! let mut graph = SceneGraph::new();
//! let arm = graph.add_rbt_node(graph.root(), Rbt::identity()).unwrap();
//! graph
//!     .add_shape_node(arm, ShapeNode::new(GeometryId(0), MaterialId(0)))
//!     .unwrap();
//! ```

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::error::{Result, ViewerError};
use crate::math::{affine_matrix, Rbt};

use super::visitor::SceneVisitor;

/// Handle to a node in a [`SceneGraph`].
///
/// Slots are never reused, so a handle stays valid for the lifetime of the graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Shared geometry resource handle, resolved by the renderer
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GeometryId(pub u32);

/// Shared material resource handle, resolved by the renderer
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MaterialId(pub u32);

/// The two flavours of transform node
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransformKind {
    /// The world root; its transform is always the identity
    Root,
    /// A node with an editable rigid body transform
    Rbt,
}

/// A node that places its children in a frame relative to its parent
#[derive(Debug, Clone)]
pub struct TransformNode {
    kind: TransformKind,
    rbt: Rbt,
    children: Vec<NodeId>,
}

impl TransformNode {
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Frame of this node relative to its parent
    pub fn rbt(&self) -> Rbt {
        match self.kind {
            TransformKind::Root => Rbt::identity(),
            TransformKind::Rbt => self.rbt,
        }
    }

    pub fn is_rbt(&self) -> bool {
        self.kind == TransformKind::Rbt
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A drawable leaf
#[derive(Debug, Clone)]
pub struct ShapeNode {
    pub geometry: GeometryId,
    pub material: MaterialId,
    affine: Matrix4<f64>,
}

impl ShapeNode {
    /// Shape with an identity model matrix
    pub fn new(geometry: GeometryId, material: MaterialId) -> Self {
        Self {
            geometry,
            material,
            affine: Matrix4::identity(),
        }
    }

    /// Shape placed by `T(translation) * Rx * Ry * Rz * S(scale)`, Euler angles in degrees
    pub fn with_transform(
        geometry: GeometryId,
        material: MaterialId,
        translation: Vector3<f64>,
        euler_degrees: Vector3<f64>,
        scale: Vector3<f64>,
    ) -> Self {
        Self {
            geometry,
            material,
            affine: affine_matrix(translation, euler_degrees, scale),
        }
    }

    pub fn affine_matrix(&self) -> Matrix4<f64> {
        self.affine
    }
}

/// A scene graph node
#[derive(Debug, Clone)]
pub enum Node {
    Transform(TransformNode),
    Shape(ShapeNode),
}

impl Node {
    pub fn as_transform(&self) -> Option<&TransformNode> {
        match self {
            Node::Transform(t) => Some(t),
            Node::Shape(_) => None,
        }
    }
}

struct Slot {
    node: Node,
    parent: Option<NodeId>,
}

/// Tree of transform and shape nodes rooted at a single world node
pub struct SceneGraph {
    slots: Vec<Slot>,
    root: NodeId,
}

impl SceneGraph {
    /// Creates a graph holding only the root node
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                node: Node::Transform(TransformNode {
                    kind: TransformKind::Root,
                    rbt: Rbt::identity(),
                    children: Vec::new(),
                }),
                parent: None,
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever created, attached or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|slot| slot.parent)
    }

    /// Adds a transform node with the given frame as the last child of `parent`
    pub fn add_rbt_node(&mut self, parent: NodeId, rbt: Rbt) -> Result<NodeId> {
        self.insert(
            parent,
            Node::Transform(TransformNode {
                kind: TransformKind::Rbt,
                rbt,
                children: Vec::new(),
            }),
        )
    }

    /// Adds a shape as the last child of `parent`
    pub fn add_shape_node(&mut self, parent: NodeId, shape: ShapeNode) -> Result<NodeId> {
        self.insert(parent, Node::Shape(shape))
    }

    fn insert(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.transform_mut(parent)?;
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node, parent: None });
        self.link(parent, id)?;
        Ok(id)
    }

    /// Detaches `child` from `parent`.
    ///
    /// The detached subtree stays in the arena and can be attached again with
    /// [`attach_child`](Self::attach_child).
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let children = &mut self.transform_mut(parent)?.children;
        let position = children
            .iter()
            .position(|c| *c == child)
            .ok_or(ViewerError::InvalidAttach { parent, child })?;
        children.remove(position);
        self.slots[child.0].parent = None;
        Ok(())
    }

    /// Re-attaches a detached node as the last child of `parent`
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.slot(child)?;
        if self.slots[child.0].parent.is_some() || child == self.root {
            return Err(ViewerError::InvalidAttach { parent, child });
        }
        // parent must not live inside child's subtree
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(ViewerError::InvalidAttach { parent, child });
            }
            cursor = self.parent(id);
        }
        self.link(parent, child)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.transform_mut(parent)?.children.push(child);
        self.slots[child.0].parent = Some(parent);
        Ok(())
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id)
            .and_then(Node::as_transform)
            .map_or(0, |t| t.children.len())
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id)
            .and_then(Node::as_transform)
            .and_then(|t| t.children.get(index).copied())
    }

    /// Local frame of a transform node
    pub fn rbt(&self, id: NodeId) -> Result<Rbt> {
        match &self.slot(id)?.node {
            Node::Transform(t) => Ok(t.rbt()),
            Node::Shape(_) => Err(ViewerError::NotATransform(id)),
        }
    }

    /// Replaces the local frame of an rbt node. The root cannot be moved.
    pub fn set_rbt(&mut self, id: NodeId, rbt: Rbt) -> Result<()> {
        let transform = self.transform_mut(id)?;
        if transform.kind != TransformKind::Rbt {
            return Err(ViewerError::NotAnRbtNode(id));
        }
        transform.rbt = rbt;
        Ok(())
    }

    /// Walks the subtree at `start` depth first, children in insertion order.
    ///
    /// Returns `false` as soon as any visitor hook returns `false`; nothing
    /// else is visited after that, not even pending post-visits.
    pub fn accept<V: SceneVisitor + ?Sized>(&self, start: NodeId, visitor: &mut V) -> bool {
        let Some(node) = self.node(start) else {
            return true;
        };
        match node {
            Node::Shape(shape) => {
                visitor.visit_shape(start, shape) && visitor.post_visit_shape(start, shape)
            }
            Node::Transform(transform) => {
                if !visitor.visit_transform(start, transform) {
                    return false;
                }
                for child in &transform.children {
                    if !self.accept(*child, visitor) {
                        return false;
                    }
                }
                visitor.post_visit_transform(start, transform)
            }
        }
    }

    fn slot(&self, id: NodeId) -> Result<&Slot> {
        self.slots.get(id.0).ok_or(ViewerError::UnknownNode(id))
    }

    fn transform_mut(&mut self, id: NodeId) -> Result<&mut TransformNode> {
        match self.slots.get_mut(id.0) {
            Some(Slot {
                node: Node::Transform(t),
                ..
            }) => Ok(t),
            Some(_) => Err(ViewerError::NotATransform(id)),
            None => Err(ViewerError::UnknownNode(id)),
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OrderRecorder {
        events: Vec<String>,
        stop_at: Option<NodeId>,
    }

    impl SceneVisitor for OrderRecorder {
        fn visit_transform(&mut self, id: NodeId, _node: &TransformNode) -> bool {
            self.events.push(format!("in {}", id.0));
            self.stop_at != Some(id)
        }

        fn post_visit_transform(&mut self, id: NodeId, _node: &TransformNode) -> bool {
            self.events.push(format!("out {}", id.0));
            true
        }

        fn visit_shape(&mut self, id: NodeId, _node: &ShapeNode) -> bool {
            self.events.push(format!("shape {}", id.0));
            self.stop_at != Some(id)
        }
    }

    fn shape() -> ShapeNode {
        ShapeNode::new(GeometryId(0), MaterialId(0))
    }

    /// root(0) -> a(1) -> s(2); root -> b(3) -> s(4), b -> c(5)
    fn sample() -> SceneGraph {
        let mut g = SceneGraph::new();
        let a = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        g.add_shape_node(a, shape()).unwrap();
        let b = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        g.add_shape_node(b, shape()).unwrap();
        g.add_rbt_node(b, Rbt::identity()).unwrap();
        g
    }

    #[test]
    fn test_preorder_traversal() {
        let g = sample();
        let mut v = OrderRecorder {
            events: Vec::new(),
            stop_at: None,
        };
        assert!(g.accept(g.root(), &mut v));
        assert_eq!(
            v.events,
            vec![
                "in 0", "in 1", "shape 2", "out 1", "in 3", "shape 4", "in 5", "out 5", "out 3",
                "out 0"
            ]
        );
    }

    #[test]
    fn test_traversal_aborts_immediately() {
        let g = sample();
        let mut v = OrderRecorder {
            events: Vec::new(),
            stop_at: Some(NodeId(2)),
        };
        assert!(!g.accept(g.root(), &mut v));
        assert_eq!(v.events, vec!["in 0", "in 1", "shape 2"]);
    }

    #[test]
    fn test_shapes_cannot_have_children() {
        let mut g = sample();
        assert!(matches!(
            g.add_rbt_node(NodeId(2), Rbt::identity()),
            Err(ViewerError::NotATransform(NodeId(2)))
        ));
    }

    #[test]
    fn test_root_is_fixed() {
        let mut g = sample();
        let moved = Rbt::from_translation(Vector3::new(1.0, 0.0, 0.0));
        assert!(matches!(
            g.set_rbt(g.root(), moved),
            Err(ViewerError::NotAnRbtNode(_))
        ));
        assert_eq!(g.rbt(g.root()).unwrap(), Rbt::identity());
    }

    #[test]
    fn test_remove_and_reattach() {
        let mut g = sample();
        let b = NodeId(3);
        g.remove_child(g.root(), b).unwrap();
        assert_eq!(g.child_count(g.root()), 1);
        assert_eq!(g.parent(b), None);

        // attaching b below its own descendant would create a cycle
        assert!(g.attach_child(NodeId(5), b).is_err());

        g.attach_child(NodeId(1), b).unwrap();
        assert_eq!(g.child(NodeId(1), 1), Some(b));
        assert_eq!(g.parent(b), Some(NodeId(1)));
    }
}
