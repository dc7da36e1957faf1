//! # Viewer
//!
//! The application context: scene graph, camera, picked node, keyframe
//! animator and manipulation state, plus the command surface the input layer
//! drives.
//!
//! Nothing here touches the GPU. Drawing produces a [`DrawList`]; picking
//! hands a pick [`DrawList`] to a [`PickTarget`] that renders it and reads
//! one pixel back.

use std::path::PathBuf;

use cgmath::{Deg, Matrix4, Quaternion, Rotation3, Vector3};
use log::{debug, info, warn};

use crate::animation::{Animator, Playback, Player};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::gfx::camera::Frustum;
use crate::manipulation::{Drag, DragKind, Manipulator, SkyMode};
use crate::math::Rbt;
use crate::scene::{
    accumulate_transform, DrawList, Drawer, GeometryId, MaterialId, NodeId, PickMap, Picker,
    SceneGraph, ShapeNode, ShapeRenderer, Uniforms, LIGHT_COUNT,
};

pub const CUBE: GeometryId = GeometryId(0);
pub const SPHERE: GeometryId = GeometryId(1);
/// Ground square, `2 * GROUND_HALF_SIZE` on a side
pub const PLANE: GeometryId = GeometryId(2);
/// The loaded OBJ mesh, or a sphere when none was given
pub const MODEL: GeometryId = GeometryId(3);

pub const SKYBOX_MATERIAL: MaterialId = MaterialId(0);
pub const LIGHT_MATERIAL: MaterialId = MaterialId(1);
pub const MODEL_MATERIAL: MaterialId = MaterialId(2);
/// Wireframe sphere drawn around the picked node
pub const ARCBALL_MATERIAL: MaterialId = MaterialId(3);

const LIGHT_POSITIONS: [[f64; 3]; LIGHT_COUNT] = [[-2.0, 5.0, 4.0], [2.0, 5.0, -5.0]];
const LIGHT_MARKER_SCALE: f64 = 0.15;
pub const GROUND_Y: f64 = -2.0;
pub const GROUND_HALF_SIZE: f64 = 10.0;

/// Everything the input layer can ask the viewer to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select the node under a pixel, physical coordinates, origin top-left
    Pick { x: u32, y: u32 },
    NewKeyframe,
    OverwriteKeyframe,
    DeleteKeyframe,
    PrevKeyframe,
    NextKeyframe,
    /// Restore the current keyframe into the scene
    ApplyKeyframe,
    LoadKeyframes(PathBuf),
    SaveKeyframes(PathBuf),
    TogglePlay,
    Faster,
    Slower,
    ToggleSkyMode,
}

/// Renders a pick pass and reads back one pixel
pub trait PickTarget {
    fn read_pick_pixel(&mut self, draws: &DrawList, x: u32, y: u32) -> Result<[u8; 3]>;
}

/// Nodes of the scene built by [`build_default_scene`]
#[derive(Debug, Clone)]
pub struct DefaultScene {
    pub sky: NodeId,
    pub lights: Vec<NodeId>,
    pub model: NodeId,
}

/// Builds the startup scene.
///
/// ```text
/// root
/// ├── skybox cube
/// ├── ground plane
/// ├── sky (camera) at (0, 0, 10)
/// ├── light 0 ── small sphere
/// ├── light 1 ── small sphere
/// └── model, turned -45 degrees about Y ── mesh
/// ```
pub fn build_default_scene(graph: &mut SceneGraph) -> Result<DefaultScene> {
    let root = graph.root();
    graph.add_shape_node(root, ShapeNode::new(CUBE, SKYBOX_MATERIAL))?;
    graph.add_shape_node(
        root,
        ShapeNode::with_transform(
            PLANE,
            MODEL_MATERIAL,
            Vector3::new(0.0, GROUND_Y, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        ),
    )?;

    let sky = graph.add_rbt_node(root, Rbt::from_translation(Vector3::new(0.0, 0.0, 10.0)))?;

    let mut lights = Vec::with_capacity(LIGHT_COUNT);
    for [x, y, z] in LIGHT_POSITIONS {
        let light = graph.add_rbt_node(root, Rbt::from_translation(Vector3::new(x, y, z)))?;
        graph.add_shape_node(
            light,
            ShapeNode::with_transform(
                SPHERE,
                LIGHT_MATERIAL,
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(LIGHT_MARKER_SCALE, LIGHT_MARKER_SCALE, LIGHT_MARKER_SCALE),
            ),
        )?;
        lights.push(light);
    }

    let model = graph.add_rbt_node(
        root,
        Rbt::from_rotation(Quaternion::from_angle_y(Deg(-45.0))),
    )?;
    graph.add_shape_node(model, ShapeNode::new(MODEL, MODEL_MATERIAL))?;

    info!(
        "scene built: {} nodes, {} lights",
        graph.len(),
        lights.len()
    );
    Ok(DefaultScene { sky, lights, model })
}

/// Read-only snapshot for the UI overlay
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerStatus {
    pub keyframes: usize,
    pub cursor: Option<usize>,
    pub playing: bool,
    pub ms_between_keyframes: u32,
    pub picked: String,
    pub sky_mode: &'static str,
}

pub struct Viewer {
    config: ViewerConfig,
    graph: SceneGraph,
    scene: DefaultScene,
    picked: NodeId,
    animator: Animator,
    manipulator: Manipulator,
    frustum: Frustum,
    active_drag: Option<DragKind>,
}

impl Viewer {
    /// Builds the default scene and starts with the camera selected
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let mut graph = SceneGraph::new();
        let scene = build_default_scene(&mut graph)?;
        let frustum = Frustum::new(
            config.min_fov_deg,
            config.near,
            config.far,
            config.window_width,
            config.window_height,
        );
        let manipulator = Manipulator::new(config.arcball_radius_factor, &frustum);
        let animator = Animator::new(
            &graph,
            Player::new(config.ms_between_keyframes, config.frames_per_second),
        );
        Ok(Self {
            picked: scene.sky,
            config,
            graph,
            scene,
            animator,
            manipulator,
            frustum,
            active_drag: None,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn scene(&self) -> &DefaultScene {
        &self.scene
    }

    pub fn sky(&self) -> NodeId {
        self.scene.sky
    }

    /// Node that drags move; the sky node when nothing is picked
    pub fn picked(&self) -> NodeId {
        self.picked
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    pub fn is_playing(&self) -> bool {
        self.animator.is_playing()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.frustum.resize(width, height);
        self.manipulator.resize(&self.frustum);
        debug!(
            "viewport {}x{}, fov {:.2}",
            self.frustum.width(),
            self.frustum.height(),
            self.frustum.fov_y_deg()
        );
    }

    /// World frame of the camera
    pub fn eye(&self) -> Result<Rbt> {
        accumulate_transform(&self.graph, self.graph.root(), self.scene.sky, 0)
    }

    /// Projection and eye-space lights shared by every draw of a frame
    pub fn frame_uniforms(&self) -> Result<Uniforms> {
        let inv_eye = self.eye()?.inverse();
        let mut lights = [Vector3::new(0.0, 0.0, 0.0); LIGHT_COUNT];
        for (slot, light) in lights.iter_mut().zip(&self.scene.lights) {
            let world = accumulate_transform(&self.graph, self.graph.root(), *light, 0)?;
            *slot = (inv_eye * world).translation();
        }
        Ok(Uniforms {
            projection: self.frustum.gpu_projection(),
            lights,
            ..Uniforms::default()
        })
    }

    /// Records the lit pass, plus the arcball around the picked node
    pub fn draw(&mut self, list: &mut DrawList) -> Result<()> {
        let uniforms = self.frame_uniforms()?;
        let inv_eye = self.eye()?.inverse();
        self.graph
            .accept(self.graph.root(), &mut Drawer::new(&mut *list, uniforms, inv_eye));

        if self.picked != self.scene.sky {
            let object = accumulate_transform(&self.graph, self.graph.root(), self.picked, 0)?;
            let object_eye = inv_eye * object;
            if self.active_drag != Some(DragKind::Zoom) {
                self.manipulator
                    .refresh_scale(&self.frustum, object_eye.translation().z);
            }
            let radius = self.manipulator.arcball_scale() * self.manipulator.arcball_radius();
            let arcball = Uniforms {
                model_view: object_eye.to_matrix() * Matrix4::from_scale(radius),
                ..uniforms
            };
            list.draw_shape(&ShapeNode::new(SPHERE, ARCBALL_MATERIAL), &arcball);
        }
        Ok(())
    }

    /// Records the id-color pass and returns its id map
    pub fn draw_pick(&self, list: &mut DrawList) -> Result<PickMap> {
        let uniforms = self.frame_uniforms()?;
        let inv_eye = self.eye()?.inverse();
        let mut picker = Picker::new(&mut *list, uniforms, inv_eye);
        self.graph.accept(self.graph.root(), &mut picker);
        picker.finish()
    }

    /// Selects the node under `(x, y)`; the background selects the camera
    pub fn pick(&mut self, target: &mut dyn PickTarget, x: u32, y: u32) -> Result<NodeId> {
        let mut list = DrawList::new();
        let map = self.draw_pick(&mut list)?;
        let pixel = target.read_pick_pixel(&list, x, y)?;
        self.picked = map.resolve(pixel).unwrap_or(self.scene.sky);
        info!("picked {} at ({x}, {y})", self.node_label(self.picked));
        Ok(self.picked)
    }

    /// Applies one drag step to the picked node, or to the camera
    pub fn manipulate(&mut self, drag: &Drag) -> Result<()> {
        self.active_drag = Some(drag.kind);
        if drag.kind != DragKind::Zoom && self.picked != self.scene.sky {
            let object = accumulate_transform(&self.graph, self.graph.root(), self.picked, 0)?;
            let z = (self.eye()?.inverse() * object).translation().z;
            self.manipulator.refresh_scale(&self.frustum, z);
        }
        self.manipulator.manipulate(
            &mut self.graph,
            self.scene.sky,
            self.picked,
            drag,
            &self.frustum,
        )
    }

    /// All mouse buttons were released
    pub fn end_drag(&mut self) {
        self.active_drag = None;
    }

    /// Advances playback by one tick when playing
    pub fn tick(&mut self) -> Result<Playback> {
        self.animator.tick(&mut self.graph)
    }

    /// Runs a command.
    ///
    /// Commands that find nothing to act on (no current keyframe, too few
    /// keyframes to play) log a warning and succeed.
    pub fn execute(&mut self, command: Command, target: &mut dyn PickTarget) -> Result<()> {
        debug!("command {command:?}");
        let result = match command {
            Command::Pick { x, y } => self.pick(target, x, y).map(|_| ()),
            Command::NewKeyframe => self.animator.new_keyframe(&self.graph).map(|_| ()),
            Command::OverwriteKeyframe => {
                self.animator.overwrite_keyframe(&self.graph).map(|_| ())
            }
            Command::DeleteKeyframe => self.animator.delete_keyframe(&mut self.graph).map(|_| ()),
            Command::PrevKeyframe => self.animator.prev_keyframe(&mut self.graph).map(|_| ()),
            Command::NextKeyframe => self.animator.next_keyframe(&mut self.graph).map(|_| ()),
            Command::ApplyKeyframe => self.animator.apply_current(&mut self.graph),
            Command::LoadKeyframes(path) => self.animator.load(&mut self.graph, &path).map(|_| ()),
            Command::SaveKeyframes(path) => self.animator.save(&path),
            Command::TogglePlay => self.animator.toggle_play(&mut self.graph).map(|_| ()),
            Command::Faster => {
                self.animator.faster();
                Ok(())
            }
            Command::Slower => {
                self.animator.slower();
                Ok(())
            }
            Command::ToggleSkyMode => {
                self.manipulator.sky_mode = self.manipulator.sky_mode.toggle();
                info!("sky mode {:?}", self.manipulator.sky_mode);
                Ok(())
            }
        };
        match result {
            Err(e @ (ViewerError::EmptyTimeline | ViewerError::InsufficientKeyframes { .. })) => {
                warn!("{e}");
                Ok(())
            }
            other => other,
        }
    }

    /// Human readable name of a node for logs and the overlay
    pub fn node_label(&self, id: NodeId) -> String {
        if id == self.scene.sky {
            "sky".to_string()
        } else if id == self.scene.model {
            "model".to_string()
        } else if let Some(i) = self.scene.lights.iter().position(|l| *l == id) {
            format!("light {i}")
        } else {
            format!("node {}", id.0)
        }
    }

    pub fn status(&self) -> ViewerStatus {
        let timeline = self.animator.timeline();
        ViewerStatus {
            keyframes: timeline.len(),
            cursor: timeline.cursor(),
            playing: self.animator.is_playing(),
            ms_between_keyframes: self.animator.player().ms_per_segment(),
            picked: self.node_label(self.picked),
            sky_mode: match self.manipulator.sky_mode {
                SkyMode::Orbit => "orbit",
                SkyMode::Ego => "ego",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::color_to_id;

    /// Pretends each pick draw covers exactly one pixel column
    struct ColumnTarget;

    impl PickTarget for ColumnTarget {
        fn read_pick_pixel(&mut self, draws: &DrawList, x: u32, _y: u32) -> Result<[u8; 3]> {
            Ok(draws
                .commands()
                .get(x as usize)
                .and_then(|c| c.uniforms.id_color)
                .map(|c| c.map(|v| (v * 255.0).round() as u8))
                .unwrap_or([0, 0, 0]))
        }
    }

    fn viewer() -> Viewer {
        Viewer::new(ViewerConfig::default()).unwrap()
    }

    #[test]
    fn test_default_scene_tracks_every_rbt_node() {
        let v = viewer();
        let scene = v.scene();
        let mut expected = vec![scene.sky];
        expected.extend(&scene.lights);
        expected.push(scene.model);
        assert_eq!(v.animator().tracked(), expected.as_slice());
        assert_eq!(v.picked(), scene.sky);
    }

    #[test]
    fn test_draw_issues_every_shape() {
        let mut v = viewer();
        let mut list = DrawList::new();
        v.draw(&mut list).unwrap();
        // skybox, ground, two light markers, model
        assert_eq!(list.len(), 5);
        assert!(list.commands().iter().all(|c| c.uniforms.id_color.is_none()));
    }

    #[test]
    fn test_pick_selects_owner_or_sky() {
        let mut v = viewer();
        let mut target = ColumnTarget;

        // draw order: skybox, ground, light 0, light 1, model
        v.execute(Command::Pick { x: 4, y: 0 }, &mut target).unwrap();
        assert_eq!(v.picked(), v.scene().model);
        v.execute(Command::Pick { x: 3, y: 0 }, &mut target).unwrap();
        assert_eq!(v.picked(), v.scene().lights[1]);

        // skybox and ground hang off the root and the background is empty
        v.execute(Command::Pick { x: 0, y: 0 }, &mut target).unwrap();
        assert_eq!(v.picked(), v.sky());
        v.execute(Command::Pick { x: 1, y: 0 }, &mut target).unwrap();
        assert_eq!(v.picked(), v.sky());
        v.execute(Command::Pick { x: 99, y: 0 }, &mut target).unwrap();
        assert_eq!(v.picked(), v.sky());
        assert_eq!(color_to_id([0, 0, 0]), 0);

        // picking the model adds the arcball draw
        v.execute(Command::Pick { x: 4, y: 0 }, &mut target).unwrap();
        let mut list = DrawList::new();
        v.draw(&mut list).unwrap();
        assert_eq!(list.len(), 6);
        assert_eq!(list.commands()[5].material, ARCBALL_MATERIAL);
    }

    #[test]
    fn test_state_errors_are_no_ops() {
        let mut v = viewer();
        let mut target = ColumnTarget;
        assert!(v.execute(Command::DeleteKeyframe, &mut target).is_ok());
        assert!(v.execute(Command::NextKeyframe, &mut target).is_ok());
        assert!(v.execute(Command::TogglePlay, &mut target).is_ok());
        assert!(!v.is_playing());
    }

    #[test]
    fn test_keyframes_capture_camera_moves() {
        let mut v = viewer();
        let mut target = ColumnTarget;
        let sky = v.sky();
        v.execute(Command::NewKeyframe, &mut target).unwrap();

        v.manipulate(&Drag {
            kind: DragKind::Translate,
            from: cgmath::Vector2::new(0.0, 0.0),
            delta: cgmath::Vector2::new(100.0, 0.0),
        })
        .unwrap();
        v.end_drag();
        let moved = v.graph().rbt(sky).unwrap();
        assert!((moved.translation().x - -1.0).abs() < 1e-9);

        v.execute(Command::NewKeyframe, &mut target).unwrap();
        v.execute(Command::PrevKeyframe, &mut target).unwrap();
        assert_eq!(v.graph().rbt(sky).unwrap().translation().x, 0.0);
        v.execute(Command::NextKeyframe, &mut target).unwrap();
        assert!(v.graph().rbt(sky).unwrap().approx_eq(&moved, 1e-12));

        let status = v.status();
        assert_eq!((status.keyframes, status.cursor), (2, Some(1)));
        assert_eq!(status.picked, "sky");
    }

    #[test]
    fn test_lights_are_in_eye_space() {
        let v = viewer();
        let uniforms = v.frame_uniforms().unwrap();
        // eye sits at (0, 0, 10) without rotation
        assert_eq!(uniforms.lights[0], Vector3::new(-2.0, 5.0, -6.0));
    }

    #[test]
    fn test_sky_mode_toggles() {
        let mut v = viewer();
        v.execute(Command::ToggleSkyMode, &mut ColumnTarget).unwrap();
        assert_eq!(v.status().sky_mode, "ego");
    }
}
