//! Visitor interface for [`SceneGraph::accept`](super::SceneGraph::accept).

use super::graph::{NodeId, ShapeNode, TransformNode};

/// Hooks called during a depth-first walk of the scene graph.
///
/// Every hook returns whether the traversal should continue. Returning `false`
/// from any hook stops the walk immediately: no further siblings, descendants
/// or post-visits are delivered.
pub trait SceneVisitor {
    fn visit_transform(&mut self, _id: NodeId, _node: &TransformNode) -> bool {
        true
    }

    fn post_visit_transform(&mut self, _id: NodeId, _node: &TransformNode) -> bool {
        true
    }

    fn visit_shape(&mut self, _id: NodeId, _node: &ShapeNode) -> bool {
        true
    }

    fn post_visit_shape(&mut self, _id: NodeId, _node: &ShapeNode) -> bool {
        true
    }
}

/// Collects every rbt transform node in traversal order.
///
/// Run once after scene setup, the result is the tracked-node list whose
/// order every keyframe follows.
#[derive(Debug, Default)]
pub struct RbtNodeScanner {
    nodes: Vec<NodeId>,
}

impl RbtNodeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }
}

impl SceneVisitor for RbtNodeScanner {
    fn visit_transform(&mut self, id: NodeId, node: &TransformNode) -> bool {
        if node.is_rbt() {
            self.nodes.push(id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rbt;
    use crate::scene::{GeometryId, MaterialId, SceneGraph};

    #[test]
    fn test_scanner_skips_root_and_shapes() {
        let mut g = SceneGraph::new();
        g.add_shape_node(g.root(), ShapeNode::new(GeometryId(0), MaterialId(0)))
            .unwrap();
        let a = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        let b = g.add_rbt_node(a, Rbt::identity()).unwrap();
        let c = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();

        let mut scanner = RbtNodeScanner::new();
        g.accept(g.root(), &mut scanner);
        assert_eq!(scanner.into_nodes(), vec![a, b, c]);
    }
}
