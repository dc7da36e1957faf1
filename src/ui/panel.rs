// src/ui/panel.rs
//! The viewer's status overlay

use crate::viewer::ViewerStatus;

/// Key bindings listed in the overlay, in the order they are shown
pub const KEY_HELP: [(&str, &str); 15] = [
    ("p, then left click", "pick a node (background picks the camera)"),
    ("left drag", "rotate"),
    ("right drag", "translate"),
    ("middle / both / space+left drag", "zoom"),
    ("m", "toggle orbit / ego camera"),
    ("n", "new keyframe after the cursor"),
    ("u", "overwrite the current keyframe"),
    ("c", "apply the current keyframe"),
    ("d", "delete the current keyframe"),
    ("< / >", "previous / next keyframe"),
    ("i / w", "read / write the keyframe file"),
    ("y", "play / stop"),
    ("+ / -", "faster / slower"),
    ("h", "log this help"),
    ("esc", "quit"),
];

/// Keyframe cursor as shown to the user, 1-based
pub fn cursor_label(status: &ViewerStatus) -> String {
    match status.cursor {
        Some(i) => format!("{} / {}", i + 1, status.keyframes),
        None => format!("- / {}", status.keyframes),
    }
}

/// Draws the status window
///
/// # Arguments
/// * `ui` - ImGui frame
/// * `status` - snapshot of the viewer taken this frame
/// * `fps` - frames per second reported by the UI manager
/// * `picking` - whether the next left click picks
pub fn status_panel(ui: &imgui::Ui, status: &ViewerStatus, fps: f32, picking: bool) {
    ui.window("rigview")
        .size([360.0, 0.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .collapsible(true)
        .build(|| {
            ui.text(format!("{fps:.1} fps"));
            ui.separator();

            ui.text(format!("picked: {}", status.picked));
            ui.text(format!("camera: {}", status.sky_mode));
            if picking {
                ui.text_colored([1.0, 0.8, 0.2, 1.0], "click to pick");
            }
            ui.separator();

            ui.text(format!("keyframe: {}", cursor_label(status)));
            ui.text(format!(
                "playback: {} ({} ms per keyframe)",
                if status.playing { "playing" } else { "stopped" },
                status.ms_between_keyframes
            ));

            if ui.collapsing_header("Keys", imgui::TreeNodeFlags::empty()) {
                for (key, action) in KEY_HELP {
                    ui.text(format!("{key:<12} {action}"));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(keyframes: usize, cursor: Option<usize>) -> ViewerStatus {
        ViewerStatus {
            keyframes,
            cursor,
            playing: false,
            ms_between_keyframes: 2000,
            picked: "sky".to_string(),
            sky_mode: "orbit",
        }
    }

    #[test]
    fn test_cursor_label_is_one_based() {
        assert_eq!(cursor_label(&status(3, Some(0))), "1 / 3");
        assert_eq!(cursor_label(&status(0, None)), "- / 0");
    }
}
