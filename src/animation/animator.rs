//! Keyframe commands against a live scene graph.
//!
//! The [`Animator`] owns the list of tracked nodes, the [`Timeline`] and the
//! [`Player`]. Snapshots read every tracked node's frame; applying a keyframe
//! writes them back positionally.
//!
//! Editing while playing is not guarded: callers stop playback first.

use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::scene::{NodeId, RbtNodeScanner, SceneGraph};

use super::persistence;
use super::player::{Playback, Player};
use super::timeline::{Keyframe, Timeline};

pub struct Animator {
    tracked: Vec<NodeId>,
    timeline: Timeline,
    player: Player,
}

impl Animator {
    /// Tracks every rbt node of `graph`, in traversal order.
    ///
    /// Call once the scene is built; nodes added later are not animated.
    pub fn new(graph: &SceneGraph, player: Player) -> Self {
        let mut scanner = RbtNodeScanner::new();
        graph.accept(graph.root(), &mut scanner);
        let tracked = scanner.into_nodes();
        info!("tracking {} rbt nodes for keyframes", tracked.len());
        Self::with_tracked(tracked, player)
    }

    pub fn with_tracked(tracked: Vec<NodeId>, player: Player) -> Self {
        Self {
            tracked,
            timeline: Timeline::new(),
            player,
        }
    }

    pub fn tracked(&self) -> &[NodeId] {
        &self.tracked
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Current frame of every tracked node
    pub fn snapshot(&self, graph: &SceneGraph) -> Result<Keyframe> {
        self.tracked.iter().map(|id| graph.rbt(*id)).collect()
    }

    /// Writes `frame` into the tracked nodes, pairing them up by position
    pub fn apply(&self, graph: &mut SceneGraph, frame: &Keyframe) -> Result<()> {
        for (id, rbt) in self.tracked.iter().zip(frame) {
            graph.set_rbt(*id, *rbt)?;
        }
        Ok(())
    }

    /// Restores the current keyframe; does nothing without one
    pub fn apply_current(&self, graph: &mut SceneGraph) -> Result<()> {
        match self.timeline.current() {
            Some(frame) => self.apply(graph, frame),
            None => Ok(()),
        }
    }

    pub fn new_keyframe(&mut self, graph: &SceneGraph) -> Result<usize> {
        let frame = self.snapshot(graph)?;
        let index = self.timeline.insert_after_cursor(frame);
        info!("new keyframe {index} of {}", self.timeline.len());
        Ok(index)
    }

    pub fn overwrite_keyframe(&mut self, graph: &SceneGraph) -> Result<usize> {
        let frame = self.snapshot(graph)?;
        let index = self.timeline.overwrite_at_cursor(frame);
        info!("updated keyframe {index}");
        Ok(index)
    }

    /// Deletes the current keyframe and restores the one that becomes current
    pub fn delete_keyframe(&mut self, graph: &mut SceneGraph) -> Result<Option<usize>> {
        let cursor = self.timeline.delete_at_cursor()?;
        info!(
            "deleted keyframe, {} left, current {cursor:?}",
            self.timeline.len()
        );
        self.apply_current(graph)?;
        Ok(cursor)
    }

    /// Steps back and restores; `false` when already at the first keyframe
    pub fn prev_keyframe(&mut self, graph: &mut SceneGraph) -> Result<bool> {
        let moved = self.timeline.prev()?;
        if moved {
            self.apply_current(graph)?;
        }
        Ok(moved)
    }

    /// Steps forward and restores; `false` when already at the last keyframe
    pub fn next_keyframe(&mut self, graph: &mut SceneGraph) -> Result<bool> {
        let moved = self.timeline.next()?;
        if moved {
            self.apply_current(graph)?;
        }
        Ok(moved)
    }

    /// Replaces the timeline with the file's keyframes and restores the first
    pub fn load(&mut self, graph: &mut SceneGraph, path: &Path) -> Result<usize> {
        let frames = persistence::load(path, self.tracked.len())?;
        self.timeline = Timeline::from_frames(frames);
        self.apply_current(graph)?;
        Ok(self.timeline.len())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save(path, self.timeline.frames())
    }

    /// Starts playback, or stops it and restores the current keyframe.
    ///
    /// Returns whether playback is now running.
    pub fn toggle_play(&mut self, graph: &mut SceneGraph) -> Result<bool> {
        if !self.player.is_playing() {
            match self.player.play(&self.timeline) {
                Ok(()) => return Ok(true),
                Err(e) => warn!("{e}"),
            }
        }
        self.player.stop();
        self.apply_current(graph)?;
        Ok(false)
    }

    pub fn faster(&mut self) -> u32 {
        let ms = self.player.faster();
        info!("{ms} ms between keyframes");
        ms
    }

    pub fn slower(&mut self) -> u32 {
        let ms = self.player.slower();
        info!("{ms} ms between keyframes");
        ms
    }

    /// Advances playback one tick, writing the interpolated poses into the graph
    pub fn tick(&mut self, graph: &mut SceneGraph) -> Result<Playback> {
        let playback = self.player.tick(&mut self.timeline);
        if let Playback::Frame(frame) = &playback {
            self.apply(graph, frame)?;
        }
        Ok(playback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewerError;
    use crate::math::Rbt;
    use cgmath::Vector3;

    fn at(x: f64) -> Rbt {
        Rbt::from_translation(Vector3::new(x, 0.0, 0.0))
    }

    fn two_node_scene() -> (SceneGraph, NodeId, NodeId) {
        let mut g = SceneGraph::new();
        let a = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        let b = g.add_rbt_node(g.root(), Rbt::identity()).unwrap();
        (g, a, b)
    }

    #[test]
    fn test_tracks_rbt_nodes_in_order() {
        let (g, a, b) = two_node_scene();
        let animator = Animator::new(&g, Player::new(2000, 60));
        assert_eq!(animator.tracked(), &[a, b]);
    }

    #[test]
    fn test_next_restores_every_tracked_node() {
        let (mut g, a, b) = two_node_scene();
        let mut animator = Animator::new(&g, Player::new(2000, 60));

        g.set_rbt(b, at(1.0)).unwrap();
        animator.new_keyframe(&g).unwrap();
        g.set_rbt(b, at(3.0)).unwrap();
        animator.new_keyframe(&g).unwrap();

        animator.prev_keyframe(&mut g).unwrap();
        assert_eq!(g.rbt(b).unwrap(), at(1.0));

        assert!(animator.next_keyframe(&mut g).unwrap());
        assert_eq!(g.rbt(b).unwrap(), at(3.0));
        assert_eq!(g.rbt(a).unwrap(), Rbt::identity());

        // already at the end: nothing moves
        g.set_rbt(b, at(7.0)).unwrap();
        assert!(!animator.next_keyframe(&mut g).unwrap());
        assert_eq!(g.rbt(b).unwrap(), at(7.0));
    }

    #[test]
    fn test_delete_restores_previous() {
        let (mut g, _, b) = two_node_scene();
        let mut animator = Animator::new(&g, Player::new(2000, 60));
        for x in [1.0, 2.0] {
            g.set_rbt(b, at(x)).unwrap();
            animator.new_keyframe(&g).unwrap();
        }

        assert_eq!(animator.delete_keyframe(&mut g).unwrap(), Some(0));
        assert_eq!(g.rbt(b).unwrap(), at(1.0));
        assert_eq!(animator.delete_keyframe(&mut g).unwrap(), None);
        assert!(matches!(
            animator.delete_keyframe(&mut g),
            Err(ViewerError::EmptyTimeline)
        ));
    }

    #[test]
    fn test_prev_after_deleting_first_keyframe() {
        let (mut g, _, b) = two_node_scene();
        let mut animator = Animator::new(&g, Player::new(2000, 60));
        for x in [1.0, 2.0, 3.0] {
            g.set_rbt(b, at(x)).unwrap();
            animator.new_keyframe(&g).unwrap();
        }
        animator.prev_keyframe(&mut g).unwrap();
        animator.prev_keyframe(&mut g).unwrap();
        assert_eq!(animator.timeline().cursor(), Some(0));

        assert_eq!(animator.delete_keyframe(&mut g).unwrap(), None);
        assert_eq!(animator.timeline().len(), 2);
        assert!(!animator.next_keyframe(&mut g).unwrap());

        assert!(animator.prev_keyframe(&mut g).unwrap());
        assert_eq!(animator.timeline().cursor(), Some(1));
        assert_eq!(g.rbt(b).unwrap(), at(3.0));
    }

    #[test]
    fn test_toggle_play_needs_four_frames() {
        let (mut g, _, b) = two_node_scene();
        let mut animator = Animator::new(&g, Player::new(2000, 60));
        for x in [0.0, 1.0, 2.0] {
            g.set_rbt(b, at(x)).unwrap();
            animator.new_keyframe(&g).unwrap();
        }
        g.set_rbt(b, at(9.0)).unwrap();

        // refusing to play restores the current keyframe
        assert!(!animator.toggle_play(&mut g).unwrap());
        assert_eq!(g.rbt(b).unwrap(), at(2.0));

        animator.new_keyframe(&g).unwrap();
        assert!(animator.toggle_play(&mut g).unwrap());
        assert!(animator.is_playing());
        assert!(!animator.toggle_play(&mut g).unwrap());
        assert!(!animator.is_playing());
    }

    #[test]
    fn test_playback_drives_the_graph() {
        let (mut g, _, b) = two_node_scene();
        let mut animator = Animator::new(&g, Player::new(1000, 4));
        for x in [0.0, 1.0, 2.0, 3.0] {
            g.set_rbt(b, at(x)).unwrap();
            animator.new_keyframe(&g).unwrap();
        }
        animator.toggle_play(&mut g).unwrap();

        let mut xs = Vec::new();
        while let Playback::Frame(_) = animator.tick(&mut g).unwrap() {
            xs.push(g.rbt(b).unwrap().translation().x);
        }
        // evenly spaced keyframes give linear motion from 1 to 2
        assert_eq!(xs.len(), 4);
        for (i, x) in xs.iter().enumerate() {
            assert!((x - (1.0 + i as f64 * 0.25)).abs() < 1e-9, "{xs:?}");
        }
        assert_eq!(animator.timeline().cursor(), Some(2));
        assert!(!animator.is_playing());
    }

    #[test]
    fn test_load_restores_first_keyframe() {
        let (mut g, a, b) = two_node_scene();
        let mut animator = Animator::new(&g, Player::new(2000, 60));
        let path = std::env::temp_dir().join(format!("rigview-animator-{}.dat", std::process::id()));
        persistence::save(&path, &[vec![at(4.0), at(5.0)], vec![at(0.0), at(0.0)]]).unwrap();

        assert_eq!(animator.load(&mut g, &path).unwrap(), 2);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(g.rbt(a).unwrap(), at(4.0));
        assert_eq!(g.rbt(b).unwrap(), at(5.0));
        assert_eq!(animator.timeline().cursor(), Some(0));
    }
}
