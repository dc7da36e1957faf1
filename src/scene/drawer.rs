//! # Drawer
//!
//! Scene visitor that keeps the accumulated frame of the current node on a
//! stack and hands every shape to a [`ShapeRenderer`] with its composed
//! model-view matrix.
//!
//! The renderer is a seam: the GPU backend records draws into a [`DrawList`]
//! and submits them once the traversal is done, tests inspect the same list.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::math::Rbt;

use super::graph::{GeometryId, MaterialId, NodeId, ShapeNode, TransformNode};
use super::visitor::SceneVisitor;

/// Number of point lights the lit pass shades with
pub const LIGHT_COUNT: usize = 2;

/// Per-draw values published to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub projection: Matrix4<f64>,
    /// `to_matrix(top of stack) * shape.affine`
    pub model_view: Matrix4<f64>,
    /// Light positions in eye space
    pub lights: [Vector3<f64>; LIGHT_COUNT],
    /// Flat pick color; when set the renderer ignores the shape's material
    pub id_color: Option<[f32; 3]>,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            projection: Matrix4::identity(),
            model_view: Matrix4::identity(),
            lights: [Vector3::new(0.0, 0.0, 0.0); LIGHT_COUNT],
            id_color: None,
        }
    }
}

/// Something that can draw a shape with a set of uniforms
pub trait ShapeRenderer {
    fn draw_shape(&mut self, shape: &ShapeNode, uniforms: &Uniforms);
}

/// One recorded draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub uniforms: Uniforms,
}

/// A [`ShapeRenderer`] that records draws in traversal order
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl ShapeRenderer for DrawList {
    fn draw_shape(&mut self, shape: &ShapeNode, uniforms: &Uniforms) {
        self.commands.push(DrawCommand {
            geometry: shape.geometry,
            material: shape.material,
            uniforms: *uniforms,
        });
    }
}

/// Visitor issuing one draw per shape with the correct composed transform
pub struct Drawer<'a, R: ShapeRenderer + ?Sized> {
    stack: Vec<Rbt>,
    uniforms: Uniforms,
    renderer: &'a mut R,
}

impl<'a, R: ShapeRenderer + ?Sized> Drawer<'a, R> {
    /// Creates a drawer whose stack starts at `base`.
    ///
    /// # Arguments
    /// * `renderer` - receives every shape draw
    /// * `uniforms` - frame-wide values (projection, lights) copied into each draw
    /// * `base` - usually the inverse of the eye frame, so the published
    ///   matrices are model-view matrices
    pub fn new(renderer: &'a mut R, uniforms: Uniforms, base: Rbt) -> Self {
        Self {
            stack: vec![base],
            uniforms,
            renderer,
        }
    }

    /// Frame at the top of the stack
    pub fn top(&self) -> Rbt {
        self.stack.last().copied().unwrap_or_default()
    }

    pub(crate) fn set_id_color(&mut self, color: Option<[f32; 3]>) {
        self.uniforms.id_color = color;
    }
}

impl<R: ShapeRenderer + ?Sized> SceneVisitor for Drawer<'_, R> {
    fn visit_transform(&mut self, _id: NodeId, node: &TransformNode) -> bool {
        let top = self.top();
        self.stack.push(top * node.rbt());
        true
    }

    fn post_visit_transform(&mut self, _id: NodeId, _node: &TransformNode) -> bool {
        self.stack.pop();
        true
    }

    fn visit_shape(&mut self, _id: NodeId, node: &ShapeNode) -> bool {
        self.uniforms.model_view = self.top().to_matrix() * node.affine_matrix();
        self.renderer.draw_shape(node, &self.uniforms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use cgmath::{Deg, Quaternion, Rotation3, Vector4};

    fn assert_matrix_eq(a: Matrix4<f64>, b: Matrix4<f64>) {
        for c in 0..4 {
            for r in 0..4 {
                assert!((a[c][r] - b[c][r]).abs() < 1e-9, "{a:?} != {b:?}");
            }
        }
    }

    #[test]
    fn test_nested_shapes_get_composed_matrices() {
        let mut g = SceneGraph::new();
        let outer = Rbt::new(Vector3::new(1.0, 0.0, 0.0), Quaternion::from_angle_z(Deg(90.0)));
        let inner = Rbt::from_translation(Vector3::new(0.0, 2.0, 0.0));
        let a = g.add_rbt_node(g.root(), outer).unwrap();
        let b = g.add_rbt_node(a, inner).unwrap();
        let scaled = ShapeNode::with_transform(
            GeometryId(1),
            MaterialId(2),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        g.add_shape_node(b, scaled.clone()).unwrap();
        g.add_shape_node(a, ShapeNode::new(GeometryId(3), MaterialId(4)))
            .unwrap();

        let base = Rbt::from_translation(Vector3::new(0.0, 0.0, -10.0));
        let mut list = DrawList::new();
        let mut drawer = Drawer::new(&mut list, Uniforms::default(), base);
        assert!(g.accept(g.root(), &mut drawer));

        let cmds = list.commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].geometry, GeometryId(1));
        assert_eq!(cmds[0].material, MaterialId(2));
        assert_matrix_eq(
            cmds[0].uniforms.model_view,
            (base * outer * inner).to_matrix() * scaled.affine_matrix(),
        );
        // the stack was popped back to `outer` for the sibling shape
        assert_matrix_eq(cmds[1].uniforms.model_view, (base * outer).to_matrix());

        // a point at the origin of the inner shape lands at base * outer * (0,2,0)
        let p = cmds[0].uniforms.model_view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((p.x - -1.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
        assert!((p.z - -10.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_uniforms_are_forwarded() {
        let mut g = SceneGraph::new();
        g.add_shape_node(g.root(), ShapeNode::new(GeometryId(0), MaterialId(0)))
            .unwrap();
        let uniforms = Uniforms {
            projection: Matrix4::from_scale(3.0),
            lights: [Vector3::new(1.0, 2.0, 3.0), Vector3::new(-1.0, 0.0, 0.0)],
            ..Uniforms::default()
        };

        let mut list = DrawList::new();
        g.accept(g.root(), &mut Drawer::new(&mut list, uniforms, Rbt::identity()));

        let drawn = list.commands()[0].uniforms;
        assert_eq!(drawn.projection, uniforms.projection);
        assert_eq!(drawn.lights, uniforms.lights);
        assert_eq!(drawn.id_color, None);
    }
}
