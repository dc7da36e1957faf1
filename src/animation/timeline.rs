//! Ordered keyframe list with a current-keyframe cursor.
//!
//! The timeline only stores snapshots; reading the live scene and writing
//! keyframes back into it is done by [`Animator`](super::Animator).

use crate::error::{Result, ViewerError};
use crate::math::Rbt;

/// One rigid body transform per tracked node, in tracked-node order
pub type Keyframe = Vec<Rbt>;

/// Keyframes plus a cursor; `None` means there is no current keyframe
#[derive(Debug, Default, Clone)]
pub struct Timeline {
    frames: Vec<Keyframe>,
    cursor: Option<usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline holding `frames`, cursor on the first one
    pub fn from_frames(frames: Vec<Keyframe>) -> Self {
        let cursor = if frames.is_empty() { None } else { Some(0) };
        Self { frames, cursor }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Moves the cursor; out of range indices clear it
    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor.filter(|i| *i < self.frames.len());
    }

    pub fn current(&self) -> Option<&Keyframe> {
        self.cursor.and_then(|i| self.frames.get(i))
    }

    /// Inserts `frame` right after the cursor and makes it current.
    ///
    /// With no cursor the frame goes to the end of the list.
    pub fn insert_after_cursor(&mut self, frame: Keyframe) -> usize {
        let index = self.cursor.map_or(self.frames.len(), |i| i + 1);
        self.frames.insert(index, frame);
        self.cursor = Some(index);
        index
    }

    /// Replaces the current keyframe, or inserts one when there is none
    pub fn overwrite_at_cursor(&mut self, frame: Keyframe) -> usize {
        match self.cursor {
            Some(i) => {
                self.frames[i] = frame;
                i
            }
            None => self.insert_after_cursor(frame),
        }
    }

    /// Removes the current keyframe.
    ///
    /// The cursor moves to the previous keyframe when there is one and is
    /// cleared otherwise. Returns the new cursor.
    ///
    /// # Errors
    /// [`ViewerError::EmptyTimeline`] when there is no current keyframe.
    pub fn delete_at_cursor(&mut self) -> Result<Option<usize>> {
        let i = self.cursor.ok_or(ViewerError::EmptyTimeline)?;
        self.frames.remove(i);
        self.cursor = if self.frames.is_empty() {
            None
        } else {
            i.checked_sub(1)
        };
        Ok(self.cursor)
    }

    /// Steps back one keyframe; `false` when already at the first one.
    ///
    /// Without a cursor this moves onto the last keyframe.
    pub fn prev(&mut self) -> Result<bool> {
        if self.frames.is_empty() {
            return Err(ViewerError::EmptyTimeline);
        }
        let Some(i) = self.cursor else {
            self.cursor = Some(self.frames.len() - 1);
            return Ok(true);
        };
        if i == 0 {
            return Ok(false);
        }
        self.cursor = Some(i - 1);
        Ok(true)
    }

    /// Steps forward one keyframe; `false` when already at the last one
    /// or when there is no cursor
    pub fn next(&mut self) -> Result<bool> {
        if self.frames.is_empty() {
            return Err(ViewerError::EmptyTimeline);
        }
        let Some(i) = self.cursor else {
            return Ok(false);
        };
        if i + 1 >= self.frames.len() {
            return Ok(false);
        }
        self.cursor = Some(i + 1);
        Ok(true)
    }
}
