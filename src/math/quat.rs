//! Quaternion helpers that cgmath does not provide: fractional powers and the
//! scaled-axis (rotation vector) representation used for spline blending.

use cgmath::{InnerSpace, One, Quaternion, Vector3, Zero};

/// Below this sine of the half angle a rotation is treated as the identity
const AXIS_EPSILON: f64 = 1e-12;

/// Flips `q` onto the hemisphere with a non-negative scalar part.
///
/// `q` and `-q` encode the same rotation; the positive one takes the short way round.
pub fn shortest_arc(q: Quaternion<f64>) -> Quaternion<f64> {
    if q.s < 0.0 {
        -q
    } else {
        q
    }
}

/// Fractional rotation: `power(q, 1) == q`, `power(q, 0) == identity`.
///
/// Computed on the short arc through the log map: the half angle is scaled by
/// `alpha` and mapped back. A rotation too close to the identity has no
/// well-defined axis and yields the identity.
pub fn power(q: Quaternion<f64>, alpha: f64) -> Quaternion<f64> {
    let q = shortest_arc(q);
    let sin_half = q.v.magnitude();
    if sin_half < AXIS_EPSILON {
        return Quaternion::one();
    }
    let half_angle = sin_half.atan2(q.s);
    let axis = q.v / sin_half;
    let scaled = half_angle * alpha;
    Quaternion::from_sv(scaled.cos(), axis * scaled.sin())
}

/// Rotation vector of `q`: unit axis scaled by the rotation angle in radians
pub fn to_scaled_axis(q: Quaternion<f64>) -> Vector3<f64> {
    let q = shortest_arc(q);
    let sin_half = q.v.magnitude();
    if sin_half < AXIS_EPSILON {
        return Vector3::zero();
    }
    let angle = 2.0 * sin_half.atan2(q.s);
    q.v / sin_half * angle
}

/// Inverse of [`to_scaled_axis`]
pub fn from_scaled_axis(v: Vector3<f64>) -> Quaternion<f64> {
    let angle = v.magnitude();
    if angle < AXIS_EPSILON {
        return Quaternion::one();
    }
    let half = 0.5 * angle;
    Quaternion::from_sv(half.cos(), v / angle * half.sin())
}

/// True when `a` and `b` describe the same rotation within `epsilon`
pub fn same_rotation(a: Quaternion<f64>, b: Quaternion<f64>, epsilon: f64) -> bool {
    let dot = a.s * b.s + a.v.dot(b.v);
    1.0 - dot.abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_power_endpoints() {
        let q = Quaternion::from_angle_x(Deg(70.0));
        assert!(same_rotation(power(q, 1.0), q, EPS));
        assert!(same_rotation(power(q, 0.0), Quaternion::one(), EPS));
    }

    #[test]
    fn test_power_scales_angle() {
        let q = Quaternion::from_angle_y(Deg(90.0));
        let expected = Quaternion::from_angle_y(Deg(15.0));
        assert!(same_rotation(power(q, 1.0 / 6.0), expected, EPS));

        let backwards = Quaternion::from_angle_y(Deg(-15.0));
        assert!(same_rotation(power(q, -1.0 / 6.0), backwards, EPS));
    }

    #[test]
    fn test_power_takes_short_arc() {
        // -q is the same 90 degree rotation, its half power must still be 45 degrees
        let q = -Quaternion::from_angle_z(Deg(90.0));
        let half = power(q, 0.5);
        assert!(same_rotation(half, Quaternion::from_angle_z(Deg(45.0)), EPS));
    }

    #[test]
    fn test_power_of_identity_is_identity() {
        let near = Quaternion::from_sv(1.0, Vector3::new(1e-14, 0.0, 0.0));
        assert_eq!(power(near, 0.3), Quaternion::one());
    }

    #[test]
    fn test_scaled_axis_round_trip() {
        let q = Quaternion::from_axis_angle(Vector3::new(1.0, 2.0, -1.0).normalize(), Deg(123.0));
        let v = to_scaled_axis(q);
        assert!((v.magnitude() - 123.0_f64.to_radians()).abs() < EPS);
        assert!(same_rotation(from_scaled_axis(v), q, EPS));
    }

    #[test]
    fn test_scaled_axis_of_identity() {
        assert_eq!(to_scaled_axis(Quaternion::one()), Vector3::zero());
        assert_eq!(from_scaled_axis(Vector3::zero()), Quaternion::one());
    }
}
