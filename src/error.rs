//! Error types for the scene, picking and animation core.
//!
//! Structural errors (an unreachable node, a child attached to a shape) are
//! programming mistakes and are propagated to the application, which logs them
//! loudly. State errors (an empty timeline, too few keyframes to play) are
//! recoverable: callers treat them as "nothing happened".

use std::path::PathBuf;

use thiserror::Error;

use crate::scene::NodeId;

/// Errors produced by the viewer core
#[derive(Debug, Error)]
pub enum ViewerError {
    /// `accumulate_transform` was asked for a node that is not reachable from the source
    #[error("node {target:?} is not reachable from {source_node:?}")]
    InvalidPath { source_node: NodeId, target: NodeId },

    /// A keyframe operation needs a current keyframe but the timeline is empty
    #[error("the keyframe timeline is empty")]
    EmptyTimeline,

    /// Playback needs a previous, start, end and next keyframe
    #[error("playback needs at least {required} keyframes, the timeline has {available}")]
    InsufficientKeyframes { required: usize, available: usize },

    /// More drawable shapes than the 12-bit pick color can encode
    #[error("pick pass saw more than {max} drawable shapes")]
    PickOverflow { max: u32 },

    /// A persisted timeline did not hold a whole number of keyframes
    #[error("keyframe file holds {records} records, not a multiple of {tracked} tracked nodes")]
    MalformedTimeline { records: usize, tracked: usize },

    /// The node is a shape and cannot take children or a transform
    #[error("node {0:?} is not a transform node")]
    NotATransform(NodeId),

    /// The node does not carry an editable rigid body transform
    #[error("node {0:?} is not an rbt node")]
    NotAnRbtNode(NodeId),

    /// Attaching `child` under `parent` would break the tree (already attached, or a cycle)
    #[error("cannot attach {child:?} under {parent:?}")]
    InvalidAttach { parent: NodeId, child: NodeId },

    /// The node id does not belong to this scene graph
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// The pick pass could not be rendered or its pixel read back
    #[error("pick read-back failed: {0}")]
    Readback(String),

    /// A number in a keyframe file could not be parsed
    #[error("invalid number {token:?} in keyframe file at token {index}")]
    Parse { token: String, index: usize },

    #[error("keyframe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, ViewerError>;
