//! # Scene Module
//!
//! The scene graph and everything that walks it.
//!
//! - [`graph`] - arena of transform and shape nodes
//! - [`visitor`] - traversal hooks and the tracked-node scanner
//! - [`path`] - world-frame queries ([`accumulate_transform`])
//! - [`drawer`] - per-shape draw issuing
//! - [`picker`] - id-color pick pass and read-back decoding

pub mod drawer;
pub mod graph;
pub mod path;
pub mod picker;
pub mod visitor;

pub use drawer::{DrawCommand, DrawList, Drawer, ShapeRenderer, Uniforms, LIGHT_COUNT};
pub use graph::{
    GeometryId, MaterialId, Node, NodeId, SceneGraph, ShapeNode, TransformKind, TransformNode,
};
pub use path::accumulate_transform;
pub use picker::{color_to_id, id_to_color, PickMap, Picker, MAX_PICK_ID};
pub use visitor::{RbtNodeScanner, SceneVisitor};
