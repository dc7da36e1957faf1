//! # Rigid Body Transforms
//!
//! [`Rbt`] is a rotation followed by a translation, with no scale or shear.
//! Rotations are stored as unit quaternions so composition stays rigid without
//! re-orthogonalizing matrices.

use std::ops::Mul;

use cgmath::{InnerSpace, Matrix4, One, Quaternion, Vector3, Vector4, Zero};

/// A rigid body transform: `x -> r * x + t`
///
/// Composition `a * b` applies `b` expressed in `a`'s frame, then `a`. It is
/// associative but not commutative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rbt {
    translation: Vector3<f64>,
    rotation: Quaternion<f64>,
}

impl Rbt {
    /// The identity transform
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zero(),
            rotation: Quaternion::one(),
        }
    }

    /// Creates a transform from a translation and a unit quaternion
    pub fn new(translation: Vector3<f64>, rotation: Quaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// A pure translation
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            translation,
            rotation: Quaternion::one(),
        }
    }

    /// A pure rotation about the origin
    pub fn from_rotation(rotation: Quaternion<f64>) -> Self {
        Self {
            translation: Vector3::zero(),
            rotation,
        }
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    pub fn rotation(&self) -> Quaternion<f64> {
        self.rotation
    }

    /// Inverse transform, `self * self.inverse() == identity`
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.conjugate();
        Self {
            translation: inv_rotation * (-self.translation),
            rotation: inv_rotation,
        }
    }

    /// The translation factor of this transform, with identity rotation
    pub fn translation_part(&self) -> Self {
        Self::from_translation(self.translation)
    }

    /// The linear (rotation) factor of this transform, with zero translation
    pub fn rotation_part(&self) -> Self {
        Self::from_rotation(self.rotation)
    }

    /// Homogeneous matrix `T(t) * R(r)`
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_translation(self.translation) * Matrix4::from(self.rotation)
    }

    /// Applies the transform to a homogeneous coordinate.
    ///
    /// Points (`w = 1`) are rotated and translated; directions (`w = 0`) are
    /// only rotated.
    pub fn transform(&self, p: Vector4<f64>) -> Vector4<f64> {
        let xyz = self.rotation * p.truncate() + self.translation * p.w;
        xyz.extend(p.w)
    }

    /// Rescales the rotation back to unit length.
    ///
    /// Used when a rotation comes from outside the algebra (a file, user input)
    /// and may have drifted. A degenerate quaternion becomes the identity.
    pub fn renormalized(&self) -> Self {
        let magnitude = self.rotation.magnitude();
        let rotation = if magnitude > f64::EPSILON {
            self.rotation / magnitude
        } else {
            Quaternion::one()
        };
        Self {
            translation: self.translation,
            rotation,
        }
    }

    /// Compares two transforms, treating `q` and `-q` as the same rotation
    pub fn approx_eq(&self, other: &Rbt, epsilon: f64) -> bool {
        let dt = self.translation - other.translation;
        let translation_close = dt.x.abs() <= epsilon && dt.y.abs() <= epsilon && dt.z.abs() <= epsilon;
        translation_close && super::quat::same_rotation(self.rotation, other.rotation, epsilon)
    }
}

impl Default for Rbt {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Rbt {
    type Output = Rbt;

    fn mul(self, rhs: Rbt) -> Rbt {
        Rbt {
            translation: self.translation + self.rotation * rhs.translation,
            rotation: self.rotation * rhs.rotation,
        }
    }
}

impl Mul<Vector4<f64>> for Rbt {
    type Output = Vector4<f64>;

    fn mul(self, rhs: Vector4<f64>) -> Vector4<f64> {
        self.transform(rhs)
    }
}
