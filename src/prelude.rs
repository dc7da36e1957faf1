//! # rigview Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use rigview::prelude::*;
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.root();
//! let node = graph.add_rbt_node(root, Rbt::from_translation(Vector3::new(0.0, 1.0, 0.0)));
//! assert!(node.is_ok());
//! ```

// Core viewer types
pub use crate::config::ViewerConfig;
pub use crate::error::{Result, ViewerError};
pub use crate::viewer::{Command, PickTarget, Viewer, ViewerStatus};

// Math
pub use crate::math::{slerp_cubic, Rbt};

// Scene graph
pub use crate::scene::{
    accumulate_transform, DrawList, Drawer, NodeId, Picker, SceneGraph, SceneVisitor,
};

// Animation
pub use crate::animation::{Animator, Keyframe, Playback, Player, Timeline};

// Common external types
pub use cgmath::{InnerSpace, Quaternion, Vector3};
