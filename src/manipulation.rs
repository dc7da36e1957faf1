//! # Manipulation
//!
//! Mouse drags turned into rigid motions of either the sky camera or the
//! picked node.
//!
//! A motion `M` is always expressed in an auxiliary frame `A` and applied to
//! the node's local frame `L` as `L' = A * M * inv(A) * L`. For a picked
//! object, `A` has the object's origin and the eye's axes, so dragging right
//! moves the object right on screen no matter how it is oriented. Since `L`
//! is relative to the node's parent, `A` is first brought into the parent
//! frame: `As = inv(C_s) * A`.
//!
//! The sky camera either orbits the world origin or turns in place (ego
//! mode), toggled with [`SkyMode::toggle`].

use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector2, Vector3, Vector4};

use crate::error::Result;
use crate::gfx::camera::Frustum;
use crate::math::Rbt;
use crate::scene::{accumulate_transform, NodeId, SceneGraph};

/// Sky translation per pixel of drag
const SKY_TRANSLATE_SPEED: f64 = 0.01;

/// What a drag does, decided by the buttons held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Left button
    Rotate,
    /// Right button
    Translate,
    /// Middle button, both buttons, or left with space held
    Zoom,
}

/// One mouse motion step in window coordinates with the origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub kind: DragKind,
    /// Cursor position before the motion
    pub from: Vector2<f64>,
    pub delta: Vector2<f64>,
}

/// How the sky camera rotates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkyMode {
    /// Rotate about the world origin
    #[default]
    Orbit,
    /// Rotate in place
    Ego,
}

impl SkyMode {
    pub fn toggle(self) -> Self {
        match self {
            SkyMode::Orbit => SkyMode::Ego,
            SkyMode::Ego => SkyMode::Orbit,
        }
    }
}

/// Applies `m` to `o` with respect to the frame `a`
pub fn apply_in_frame(m: Rbt, o: Rbt, a: Rbt) -> Rbt {
    a * m * a.inverse() * o
}

/// Unit vector from the arcball center to the sphere point under `point`.
///
/// Points outside the ball's silhouette snap to its rim.
pub fn point_on_arcball(point: Vector2<f64>, center: Vector2<f64>, radius: f64) -> Vector3<f64> {
    let d = point - center;
    let z2 = radius * radius - d.magnitude2();
    if z2 >= 0.0 {
        Vector3::new(d.x, d.y, z2.sqrt()) / radius
    } else {
        let len = d.magnitude();
        Vector3::new(d.x / len, d.y / len, 0.0)
    }
}

/// Arcball state and the sky camera mode
#[derive(Debug, Clone)]
pub struct Manipulator {
    pub sky_mode: SkyMode,
    radius_factor: f64,
    arcball_radius: f64,
    arcball_scale: f64,
}

impl Manipulator {
    /// # Arguments
    /// * `radius_factor` - arcball radius as a fraction of the smaller window side
    /// * `frustum` - current view volume, used for the initial radius
    pub fn new(radius_factor: f64, frustum: &Frustum) -> Self {
        let mut manipulator = Self {
            sky_mode: SkyMode::default(),
            radius_factor,
            arcball_radius: 0.0,
            arcball_scale: 1.0,
        };
        manipulator.resize(frustum);
        manipulator
    }

    pub fn resize(&mut self, frustum: &Frustum) {
        self.arcball_radius = self.radius_factor * frustum.width().min(frustum.height()) as f64;
    }

    /// Arcball radius in pixels
    pub fn arcball_radius(&self) -> f64 {
        self.arcball_radius
    }

    /// Eye-space size of one pixel at the picked object's depth
    pub fn arcball_scale(&self) -> f64 {
        self.arcball_scale
    }

    /// Re-measures the pixel size at eye-space depth `z`.
    ///
    /// Skipped while zooming, so the object moves at a steady rate toward the eye.
    pub fn refresh_scale(&mut self, frustum: &Frustum, z: f64) {
        self.arcball_scale = frustum.screen_to_eye_scale(z);
    }

    /// Moves `target` according to `drag`.
    ///
    /// # Arguments
    /// * `graph` - scene holding both nodes
    /// * `sky` - the camera node
    /// * `target` - node being moved, `sky` itself to move the camera
    /// * `frustum` - projection used to find the object on screen
    pub fn manipulate(
        &self,
        graph: &mut SceneGraph,
        sky: NodeId,
        target: NodeId,
        drag: &Drag,
        frustum: &Frustum,
    ) -> Result<()> {
        let world = graph.root();
        let (dx, dy) = (drag.delta.x, drag.delta.y);
        let moving_sky = target == sky;

        let c_e = accumulate_transform(graph, world, sky, 0)?;
        let c_s = accumulate_transform(graph, world, target, 1)?;
        let c_l = accumulate_transform(graph, world, target, 0)?;
        let a = c_l.translation_part() * c_e.rotation_part();
        let a_s = c_s.inverse() * a;
        let mut l = graph.rbt(target)?;

        match drag.kind {
            DragKind::Rotate if moving_sky => {
                let my = Rbt::from_rotation(Quaternion::from_angle_y(Deg(-dx)));
                let mx = Rbt::from_rotation(Quaternion::from_angle_x(Deg(dy)));
                match self.sky_mode {
                    SkyMode::Orbit => {
                        l = apply_in_frame(my, l, c_s);
                        l = apply_in_frame(mx, l, l.rotation_part());
                    }
                    SkyMode::Ego => {
                        l = apply_in_frame(my, l, c_l.translation_part());
                        l = apply_in_frame(mx, l, l);
                    }
                }
            }
            DragKind::Rotate => {
                let center_eye = (c_e.inverse() * c_l).transform(Vector4::new(0.0, 0.0, 0.0, 1.0));
                let center = frustum.screen_space_coord(center_eye.truncate());
                let v1 = point_on_arcball(drag.from, center, self.arcball_radius);
                let v2 = point_on_arcball(drag.from + drag.delta, center, self.arcball_radius);
                let m = Quaternion::from_sv(0.0, v2) * Quaternion::from_sv(0.0, -v1);
                l = apply_in_frame(Rbt::from_rotation(m), l, a_s);
            }
            DragKind::Translate => {
                let t = if moving_sky {
                    Vector3::new(-dx, -dy, 0.0) * SKY_TRANSLATE_SPEED
                } else {
                    Vector3::new(dx, dy, 0.0) * self.arcball_scale
                };
                l = apply_in_frame(Rbt::from_translation(t), l, a_s);
            }
            DragKind::Zoom => {
                let t = if moving_sky {
                    Vector3::new(0.0, 0.0, dy) * SKY_TRANSLATE_SPEED
                } else {
                    Vector3::new(0.0, 0.0, -dy) * self.arcball_scale
                };
                l = apply_in_frame(Rbt::from_translation(t), l, a_s);
            }
        }

        graph.set_rbt(target, l.renormalized())
    }
}
