//! # Input
//!
//! Turns window mouse and keyboard events into viewer actions.
//!
//! Mouse buttons decide the kind of drag: left rotates, right translates,
//! and the middle button, both buttons, or left with space held zoom.
//! Drags are reported with the origin at the bottom-left of the window.
//! Picking is armed with `p`; the next left press picks under the cursor.

use std::path::PathBuf;

use cgmath::Vector2;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use crate::manipulation::{Drag, DragKind};
use crate::viewer::Command;

/// What the app should do in response to an input event
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Command(Command),
    Drag(Drag),
    /// Every mouse button is up again
    EndDrag,
    /// Print the key bindings
    Help,
    Quit,
}

pub struct InputController {
    left: bool,
    right: bool,
    middle: bool,
    space: bool,
    shift: bool,
    picking: bool,
    /// Last cursor position, physical pixels, origin top-left
    cursor: Option<Vector2<f64>>,
    window_height: u32,
    keyframe_file: PathBuf,
}

impl InputController {
    /// # Arguments
    /// * `window_height` - physical height, used to flip y for drags
    /// * `keyframe_file` - file the read and write keys use
    pub fn new(window_height: u32, keyframe_file: PathBuf) -> Self {
        Self {
            left: false,
            right: false,
            middle: false,
            space: false,
            shift: false,
            picking: false,
            cursor: None,
            window_height,
            keyframe_file,
        }
    }

    pub fn resize(&mut self, window_height: u32) {
        self.window_height = window_height;
    }

    /// Whether the next left press picks
    pub fn is_picking(&self) -> bool {
        self.picking
    }

    /// Drag kind for the buttons currently held
    pub fn drag_kind(&self) -> Option<DragKind> {
        if self.left && !self.right && !self.space {
            Some(DragKind::Rotate)
        } else if self.right && !self.left {
            Some(DragKind::Translate)
        } else if self.middle || (self.left && self.right) || (self.left && self.space) {
            Some(DragKind::Zoom)
        } else {
            None
        }
    }

    fn any_button(&self) -> bool {
        self.left || self.right || self.middle
    }

    fn to_drag_space(&self, p: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(p.x, self.window_height as f64 - p.y - 1.0)
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<InputAction> {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
            MouseButton::Middle => self.middle = pressed,
            _ => return None,
        }

        if pressed && button == MouseButton::Left && self.picking && !self.right {
            self.picking = false;
            let p = self.cursor?;
            return Some(InputAction::Command(Command::Pick {
                x: p.x.max(0.0) as u32,
                y: p.y.max(0.0) as u32,
            }));
        }
        if !pressed && !self.any_button() {
            return Some(InputAction::EndDrag);
        }
        None
    }

    /// Cursor moved to `(x, y)`, physical pixels, origin top-left
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<InputAction> {
        let to = Vector2::new(x, y);
        let from = self.cursor.replace(to)?;
        let kind = self.drag_kind()?;
        let from = self.to_drag_space(from);
        Some(InputAction::Drag(Drag {
            kind,
            from,
            delta: self.to_drag_space(to) - from,
        }))
    }

    /// A key changed state; `repeat` is true for auto-repeated presses
    pub fn key(&mut self, code: KeyCode, state: ElementState, repeat: bool) -> Option<InputAction> {
        let pressed = state == ElementState::Pressed;
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.shift = pressed;
                return None;
            }
            KeyCode::Space => {
                self.space = pressed;
                return None;
            }
            _ => {}
        }
        if !pressed {
            return None;
        }

        let command = match code {
            KeyCode::Escape => return Some(InputAction::Quit),
            KeyCode::KeyH => return Some(InputAction::Help),
            KeyCode::KeyP => {
                self.picking = true;
                return None;
            }
            KeyCode::KeyM => Command::ToggleSkyMode,
            KeyCode::KeyC => Command::ApplyKeyframe,
            KeyCode::KeyU => Command::OverwriteKeyframe,
            KeyCode::KeyN => Command::NewKeyframe,
            KeyCode::KeyD => Command::DeleteKeyframe,
            KeyCode::Period if self.shift => Command::NextKeyframe,
            KeyCode::Comma if self.shift => Command::PrevKeyframe,
            KeyCode::KeyI => Command::LoadKeyframes(self.keyframe_file.clone()),
            KeyCode::KeyW => Command::SaveKeyframes(self.keyframe_file.clone()),
            KeyCode::KeyY if !repeat => Command::TogglePlay,
            KeyCode::Minus => Command::Slower,
            KeyCode::Equal if self.shift => Command::Faster,
            _ => return None,
        };
        Some(InputAction::Command(command))
    }
}
