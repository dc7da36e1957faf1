//! World-frame queries: composes the transforms on the unique path from a
//! source node down to a target.

use crate::error::{Result, ViewerError};
use crate::math::Rbt;

use super::graph::{NodeId, SceneGraph, ShapeNode, TransformNode};
use super::visitor::SceneVisitor;

/// Tracks the transform stack and stops the walk once the target is reached
struct PathFinder {
    target: NodeId,
    stack: Vec<Rbt>,
    found: Option<Vec<Rbt>>,
}

impl SceneVisitor for PathFinder {
    fn visit_transform(&mut self, id: NodeId, node: &TransformNode) -> bool {
        self.stack.push(node.rbt());
        if id == self.target {
            self.found = Some(self.stack.clone());
            return false;
        }
        true
    }

    fn post_visit_transform(&mut self, _id: NodeId, _node: &TransformNode) -> bool {
        self.stack.pop();
        true
    }

    fn visit_shape(&mut self, id: NodeId, _node: &ShapeNode) -> bool {
        if id == self.target {
            self.found = Some(self.stack.clone());
            return false;
        }
        true
    }
}

/// Accumulated frame of `target` as seen from `source`.
///
/// Composes the local transforms of every transform node on the path from
/// `source` to `target`, source first. `offset` drops that many transform
/// levels from the target end: `0` includes the target's own transform, `1`
/// yields its parent's frame. A shape target contributes no transform of its
/// own, so its accumulated frame is that of its enclosing transforms.
///
/// # Errors
/// [`ViewerError::InvalidPath`] when `target` is not in the subtree of `source`.
pub fn accumulate_transform(
    graph: &SceneGraph,
    source: NodeId,
    target: NodeId,
    offset: usize,
) -> Result<Rbt> {
    let mut finder = PathFinder {
        target,
        stack: Vec::new(),
        found: None,
    };
    graph.accept(source, &mut finder);

    let path = finder.found.ok_or(ViewerError::InvalidPath {
        source_node: source,
        target,
    })?;
    let keep = path.len().saturating_sub(offset);
    Ok(path[..keep]
        .iter()
        .fold(Rbt::identity(), |acc, rbt| acc * *rbt))
}
