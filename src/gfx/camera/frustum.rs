use cgmath::{perspective, Deg, Matrix4, Vector2, Vector3};
use log::warn;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f64> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Points closer to the eye plane than this cannot be projected
const EYE_PLANE_EPSILON: f64 = 1e-8;

/// Perspective view volume of the sky camera.
///
/// The vertical field of view widens on portrait windows so that the
/// horizontal field never drops below `min_fov_deg`.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub min_fov_deg: f64,
    pub near: f64,
    pub far: f64,
    fov_y_deg: f64,
    width: u32,
    height: u32,
}

impl Frustum {
    pub fn new(min_fov_deg: f64, near: f64, far: f64, width: u32, height: u32) -> Self {
        let mut frustum = Self {
            min_fov_deg,
            near,
            far,
            fov_y_deg: min_fov_deg,
            width: 1,
            height: 1,
        };
        frustum.resize(width, height);
        frustum
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.fov_y_deg = if self.width >= self.height {
            self.min_fov_deg
        } else {
            let half = (self.min_fov_deg / 2.0).to_radians();
            let widened = (half.sin() * self.height as f64 / self.width as f64).atan2(half.cos());
            widened.to_degrees() * 2.0
        };
    }

    pub fn fov_y_deg(&self) -> f64 {
        self.fov_y_deg
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Right-handed projection with clip depth in `[-1, 1]`
    pub fn projection(&self) -> Matrix4<f64> {
        perspective(Deg(self.fov_y_deg), self.aspect(), self.near, self.far)
    }

    /// [`projection`](Self::projection) remapped to wgpu's `[0, 1]` depth range
    pub fn gpu_projection(&self) -> Matrix4<f64> {
        OPENGL_TO_WGPU_MATRIX * self.projection()
    }

    /// Window position of an eye-space point, origin bottom-left.
    ///
    /// Points on or behind the eye plane map to the window center.
    pub fn screen_space_coord(&self, eye_point: Vector3<f64>) -> Vector2<f64> {
        let (w, h) = (self.width as f64, self.height as f64);
        if eye_point.z > -EYE_PLANE_EPSILON {
            warn!("screen space coordinate requested for a point behind the eye");
            return Vector2::new((w - 1.0) / 2.0, (h - 1.0) / 2.0);
        }
        let clip = self.projection() * eye_point.extend(1.0);
        Vector2::new(
            clip.x / clip.w * w / 2.0 + (w - 1.0) / 2.0,
            clip.y / clip.w * h / 2.0 + (h - 1.0) / 2.0,
        )
    }

    /// Eye-space length of one pixel at depth `z` (negative in front of the eye)
    pub fn screen_to_eye_scale(&self, z: f64) -> f64 {
        if z > -EYE_PLANE_EPSILON {
            warn!("screen to eye scale requested for a point behind the eye");
            return 1.0;
        }
        -(z * (self.fov_y_deg / 2.0).to_radians().tan()) * 2.0 / self.height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_keeps_min_fov() {
        let f = Frustum::new(60.0, 0.1, 1000.0, 1024, 768);
        assert_eq!(f.fov_y_deg(), 60.0);
    }

    #[test]
    fn test_portrait_widens_fov() {
        let f = Frustum::new(60.0, 0.1, 1000.0, 500, 1000);
        assert!(f.fov_y_deg() > 60.0);
        // horizontal half-angle stays at 30 degrees
        let half_y = (f.fov_y_deg() / 2.0).to_radians();
        let half_x = (half_y.tan() * f.aspect()).atan().to_degrees();
        assert!((half_x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_center_projects_to_window_center() {
        let f = Frustum::new(60.0, 0.1, 1000.0, 801, 601);
        let c = f.screen_space_coord(Vector3::new(0.0, 0.0, -5.0));
        assert!((c.x - 400.0).abs() < 1e-9);
        assert!((c.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_scale_matches_projection() {
        let f = Frustum::new(60.0, 0.1, 1000.0, 800, 600);
        let z = -7.0;
        let scale = f.screen_to_eye_scale(z);
        let a = f.screen_space_coord(Vector3::new(0.0, 0.0, z));
        let b = f.screen_space_coord(Vector3::new(0.0, 100.0 * scale, z));
        assert!((b.y - a.y - 100.0).abs() < 1e-6);
    }
}
