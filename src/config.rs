//! Viewer settings.
//!
//! Everything has a sensible default; the binary only overrides the model
//! and keyframe file paths from the command line.

use std::path::PathBuf;

/// Startup configuration for [`Viewer`](crate::viewer::Viewer) and the window
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Smallest field of view in either direction, in degrees
    pub min_fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub ms_between_keyframes: u32,
    pub frames_per_second: u32,
    pub keyframe_file: PathBuf,
    /// Arcball radius as a fraction of the smaller window side
    pub arcball_radius_factor: f64,
    /// OBJ mesh shown on the model node; a sphere when absent
    pub model_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
            min_fov_deg: 60.0,
            near: 0.1,
            far: 1000.0,
            ms_between_keyframes: 2000,
            frames_per_second: 60,
            keyframe_file: PathBuf::from("key_frame.dat"),
            arcball_radius_factor: 0.25,
            model_path: None,
        }
    }
}

impl ViewerConfig {
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_min_fov(mut self, degrees: f64) -> Self {
        self.min_fov_deg = degrees;
        self
    }

    pub fn with_clip_planes(mut self, near: f64, far: f64) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_ms_between_keyframes(mut self, ms: u32) -> Self {
        self.ms_between_keyframes = ms;
        self
    }

    pub fn with_frames_per_second(mut self, fps: u32) -> Self {
        self.frames_per_second = fps;
        self
    }

    pub fn with_keyframe_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.keyframe_file = path.into();
        self
    }

    pub fn with_arcball_radius_factor(mut self, factor: f64) -> Self {
        self.arcball_radius_factor = factor;
        self
    }

    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_defaults() {
        let config = ViewerConfig::default()
            .with_window_size(640, 480)
            .with_min_fov(45.0)
            .with_clip_planes(0.5, 200.0)
            .with_ms_between_keyframes(500)
            .with_frames_per_second(30)
            .with_arcball_radius_factor(0.5)
            .with_keyframe_file("walk.dat")
            .with_model("bunny.obj");

        assert_eq!((config.window_width, config.window_height), (640, 480));
        assert_eq!(config.min_fov_deg, 45.0);
        assert_eq!((config.near, config.far), (0.5, 200.0));
        assert_eq!(config.ms_between_keyframes, 500);
        assert_eq!(config.frames_per_second, 30);
        assert_eq!(config.arcball_radius_factor, 0.5);
        assert_eq!(config.keyframe_file, PathBuf::from("walk.dat"));
        assert_eq!(config.model_path, Some(PathBuf::from("bunny.obj")));
    }

    #[test]
    fn test_default_has_no_model() {
        let config = ViewerConfig::default();
        assert!(config.model_path.is_none());
        assert_eq!(config.keyframe_file, PathBuf::from("key_frame.dat"));
    }
}
