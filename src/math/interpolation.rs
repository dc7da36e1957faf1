//! # Keyframe Interpolation
//!
//! Cubic Bezier blending between two keyframes, with control points built
//! Catmull-Rom style from the neighbouring keyframes. The curve passes through
//! every keyframe with continuous velocity, which linear or single-slerp
//! interpolation cannot give.

use cgmath::Vector3;

use super::{quat, rbt::Rbt};

/// Cubic Bernstein weights `(1-a)^3, 3a(1-a)^2, 3a^2(1-a), a^3`
pub fn bernstein(alpha: f64) -> [f64; 4] {
    let beta = 1.0 - alpha;
    [
        beta * beta * beta,
        3.0 * alpha * beta * beta,
        3.0 * alpha * alpha * beta,
        alpha * alpha * alpha,
    ]
}

/// Interpolates between `f1` and `f2` at `alpha` in `[0, 1)`.
///
/// `f_prev` is the keyframe before `f1` and `f_next` the one after `f2`; they
/// only shape the tangents.
///
/// # Arguments
/// * `alpha` - Blend factor, `0` yields `f1` and values approaching `1` yield `f2`
/// * `f1` - Segment start
/// * `f2` - Segment end
/// * `f_prev` - Keyframe preceding `f1`
/// * `f_next` - Keyframe following `f2`
pub fn slerp_cubic(alpha: f64, f1: Rbt, f2: Rbt, f_prev: Rbt, f_next: Rbt) -> Rbt {
    let w = bernstein(alpha);

    let t1 = f1.translation();
    let t2 = f2.translation();
    let t_d = (t2 - f_prev.translation()) / 6.0 + t1;
    let t_e = (f_next.translation() - t1) / -6.0 + t2;
    let translation = t1 * w[0] + t_d * w[1] + t_e * w[2] + t2 * w[3];

    let r1 = f1.rotation();
    let r2 = f2.rotation();
    let r_d = quat::power(r2 * f_prev.rotation().conjugate(), 1.0 / 6.0) * r1;
    let r_e = quat::power(f_next.rotation() * r1.conjugate(), -1.0 / 6.0) * r2;
    let sk: Vector3<f64> = quat::to_scaled_axis(r1) * w[0]
        + quat::to_scaled_axis(r_d) * w[1]
        + quat::to_scaled_axis(r_e) * w[2]
        + quat::to_scaled_axis(r2) * w[3];

    Rbt::new(translation, quat::from_scaled_axis(sk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3};

    fn frame(x: f64, yaw: f64) -> Rbt {
        Rbt::new(Vector3::new(x, 0.0, 0.0), Quaternion::from_angle_y(Deg(yaw)))
    }

    #[test]
    fn test_bernstein_partition_of_unity() {
        for i in 0..=10 {
            let sum: f64 = bernstein(i as f64 / 10.0).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_starts_at_first_keyframe() {
        let (prev, f1, f2, next) = (frame(-1.0, -20.0), frame(0.0, 0.0), frame(2.0, 30.0), frame(3.0, 80.0));
        let out = slerp_cubic(0.0, f1, f2, prev, next);
        assert!(out.approx_eq(&f1, 1e-9));
    }

    #[test]
    fn test_approaches_second_keyframe() {
        let (prev, f1, f2, next) = (frame(-1.0, -20.0), frame(0.0, 0.0), frame(2.0, 30.0), frame(3.0, 80.0));
        let out = slerp_cubic(1.0 - 1e-9, f1, f2, prev, next);
        assert!(out.approx_eq(&f2, 1e-6));
    }

    #[test]
    fn test_identical_keyframes_are_stable() {
        let x = Rbt::new(
            Vector3::new(1.0, -2.0, 3.0),
            Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0).normalize(), Deg(40.0)),
        );
        for i in 0..10 {
            let out = slerp_cubic(i as f64 / 10.0, x, x, x, x);
            assert!(out.approx_eq(&x, 1e-9));
        }
    }

    #[test]
    fn test_evenly_spaced_translation_is_linear() {
        // Catmull-Rom tangents on equally spaced points reproduce the straight line
        let out = slerp_cubic(0.5, frame(1.0, 0.0), frame(2.0, 0.0), frame(0.0, 0.0), frame(3.0, 0.0));
        assert!((out.translation() - Vector3::new(1.5, 0.0, 0.0)).magnitude() < 1e-12);
    }

    #[test]
    fn test_rotation_midpoint_between_keys() {
        let out = slerp_cubic(0.5, frame(0.0, 10.0), frame(0.0, 20.0), frame(0.0, 0.0), frame(0.0, 30.0));
        let expected = Quaternion::from_angle_y(Deg(15.0));
        assert!(quat::same_rotation(out.rotation(), expected, 1e-9));
    }
}
