//! Timed playback over a [`Timeline`].
//!
//! Segment `i` runs from keyframe `i + 1` to `i + 2`, with keyframes `i` and
//! `i + 3` shaping the tangents, so a timeline of `n` frames plays `n - 3`
//! segments. The first and last keyframes are control points only.

use log::{debug, info};

use crate::error::{Result, ViewerError};
use crate::math::slerp_cubic;

use super::timeline::{Keyframe, Timeline};

/// Frames a timeline needs before it can play
pub const MIN_PLAYABLE_FRAMES: usize = 4;

/// Smallest allowed segment duration
const MIN_SEGMENT_MS: u32 = 1;

/// Factor applied by [`Player::faster`] and [`Player::slower`]
const SPEED_STEP: f64 = 1.5;

/// Result of one playback tick
#[derive(Debug, Clone, PartialEq)]
pub enum Playback {
    /// Not playing; nothing to apply
    Idle,
    /// Interpolated poses to write into the tracked nodes
    Frame(Keyframe),
    /// The last segment completed this tick; the cursor now sits on the
    /// second to last keyframe
    Finished,
}

/// Playback clock and settings
#[derive(Debug, Clone)]
pub struct Player {
    playing: bool,
    elapsed_ms: f64,
    ms_per_segment: u32,
    frames_per_second: u32,
}

impl Player {
    /// # Arguments
    /// * `ms_per_segment` - time spent travelling between two keyframes
    /// * `frames_per_second` - tick rate; each tick advances `1000 / fps` ms
    pub fn new(ms_per_segment: u32, frames_per_second: u32) -> Self {
        Self {
            playing: false,
            elapsed_ms: 0.0,
            ms_per_segment: ms_per_segment.max(MIN_SEGMENT_MS),
            frames_per_second: frames_per_second.max(1),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn ms_per_segment(&self) -> u32 {
        self.ms_per_segment
    }

    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Wall-clock time between two ticks
    pub fn tick_interval_secs(&self) -> f64 {
        1.0 / self.frames_per_second as f64
    }

    /// Starts playback from the beginning.
    ///
    /// # Errors
    /// [`ViewerError::InsufficientKeyframes`] with fewer than four keyframes.
    pub fn play(&mut self, timeline: &Timeline) -> Result<()> {
        if timeline.len() < MIN_PLAYABLE_FRAMES {
            return Err(ViewerError::InsufficientKeyframes {
                required: MIN_PLAYABLE_FRAMES,
                available: timeline.len(),
            });
        }
        info!(
            "playing {} keyframes, {} ms per segment",
            timeline.len(),
            self.ms_per_segment
        );
        self.playing = true;
        self.elapsed_ms = 0.0;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.elapsed_ms = 0.0;
    }

    /// Segments take 1.5 times less time, down to 1 ms
    pub fn faster(&mut self) -> u32 {
        let shorter = (self.ms_per_segment as f64 / SPEED_STEP) as u32;
        self.ms_per_segment = shorter.max(MIN_SEGMENT_MS);
        self.ms_per_segment
    }

    /// Segments take 1.5 times longer
    pub fn slower(&mut self) -> u32 {
        self.ms_per_segment = (self.ms_per_segment as f64 * SPEED_STEP) as u32;
        self.ms_per_segment
    }

    /// Samples the current time, then advances the clock by one tick.
    ///
    /// Once the end is reached playback stops, the clock resets and the
    /// timeline cursor moves to the second to last keyframe.
    pub fn tick(&mut self, timeline: &mut Timeline) -> Playback {
        if !self.playing {
            return Playback::Idle;
        }
        let t = self.elapsed_ms / self.ms_per_segment as f64;
        match sample(timeline.frames(), t) {
            Some(frame) => {
                self.elapsed_ms += 1000.0 / self.frames_per_second as f64;
                Playback::Frame(frame)
            }
            None => {
                debug!("playback finished at t = {t:.3}");
                self.stop();
                timeline.set_cursor(timeline.len().checked_sub(2));
                Playback::Finished
            }
        }
    }
}

/// Poses at time `t`, measured in segments.
///
/// `None` once `t >= frames.len() - 3`, i.e. past the last segment.
pub fn sample(frames: &[Keyframe], t: f64) -> Option<Keyframe> {
    let segments = frames.len().checked_sub(3)?;
    if t < 0.0 || t >= segments as f64 {
        return None;
    }
    let i = t.floor() as usize;
    let alpha = t - t.floor();
    let (prev, start, end, next) = (&frames[i], &frames[i + 1], &frames[i + 2], &frames[i + 3]);

    Some(
        start
            .iter()
            .zip(end)
            .zip(prev.iter().zip(next))
            .map(|((f1, f2), (f_prev, f_next))| slerp_cubic(alpha, *f1, *f2, *f_prev, *f_next))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rbt;
    use cgmath::{Deg, Quaternion, Rotation3, Vector3};

    fn keyframe(x: f64) -> Keyframe {
        vec![Rbt::new(
            Vector3::new(x, 0.0, 0.0),
            Quaternion::from_angle_y(Deg(10.0 * x)),
        )]
    }

    fn timeline(n: usize) -> Timeline {
        Timeline::from_frames((0..n).map(|i| keyframe(i as f64)).collect())
    }

    #[test]
    fn test_play_needs_four_frames() {
        let mut player = Player::new(2000, 60);
        assert!(matches!(
            player.play(&timeline(3)),
            Err(ViewerError::InsufficientKeyframes {
                required: 4,
                available: 3
            })
        ));
        assert!(!player.is_playing());
        assert!(player.play(&timeline(4)).is_ok());
        assert!(player.is_playing());
    }

    #[test]
    fn test_identical_frames_are_stable() {
        let x = Rbt::new(
            Vector3::new(1.0, -2.0, 0.5),
            Quaternion::from_angle_x(Deg(35.0)),
        );
        let frames = vec![vec![x]; 4];
        for alpha in [0.0, 0.1, 0.25, 0.5, 0.75, 0.999] {
            let pose = sample(&frames, alpha).unwrap();
            assert!(pose[0].approx_eq(&x, 1e-9), "alpha {alpha}");
        }
    }

    #[test]
    fn test_segment_starts_at_second_frame() {
        let frames = timeline(5);
        let pose = sample(frames.frames(), 0.0).unwrap();
        assert!(pose[0].approx_eq(&keyframe(1.0)[0], 1e-9));
        let pose = sample(frames.frames(), 1.0).unwrap();
        assert!(pose[0].approx_eq(&keyframe(2.0)[0], 1e-9));
        assert!(sample(frames.frames(), 2.0).is_none());
        assert!(sample(&frames.frames()[..3], 0.0).is_none());
    }

    #[test]
    fn test_tick_runs_to_end() {
        let mut tl = timeline(5);
        let mut player = Player::new(100, 10);
        player.play(&tl).unwrap();

        // 100 ms per tick and per segment: t = 0, 1 are sampled, t = 2 ends
        assert!(matches!(player.tick(&mut tl), Playback::Frame(_)));
        assert!(matches!(player.tick(&mut tl), Playback::Frame(_)));
        assert_eq!(player.tick(&mut tl), Playback::Finished);

        assert!(!player.is_playing());
        assert_eq!(player.elapsed_ms(), 0.0);
        assert_eq!(tl.cursor(), Some(3));
        assert_eq!(player.tick(&mut tl), Playback::Idle);
    }

    #[test]
    fn test_speed_controls() {
        let mut player = Player::new(2000, 60);
        assert_eq!(player.slower(), 3000);
        assert_eq!(player.faster(), 2000);

        let mut quick = Player::new(1, 60);
        assert_eq!(quick.faster(), 1);
    }
}
