//! # Animation Module
//!
//! Keyframe animation of the scene's rigid body nodes.
//!
//! - [`timeline`] - keyframe list and cursor
//! - [`player`] - playback clock and cubic sampling
//! - [`persistence`] - the keyframe text file
//! - [`animator`] - ties the three to a live scene graph

pub mod animator;
pub mod persistence;
pub mod player;
pub mod timeline;

pub use animator::Animator;
pub use player::{Playback, Player, MIN_PLAYABLE_FRAMES};
pub use timeline::{Keyframe, Timeline};
