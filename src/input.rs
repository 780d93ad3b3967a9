// Pure input state shared by the DOM handlers and the frame loop.

use glam::Vec2;

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    /// Last position in canvas backing pixels.
    pub pos: Vec2,
    pub dragging: bool,
    /// False until the first pointer event; before that the pointer sits
    /// off-canvas so nothing is pressed or near.
    pub seen: bool,
}

impl PointerState {
    pub fn moved(&mut self, pos: Vec2) {
        self.pos = pos;
        self.seen = true;
    }

    pub fn pressed(&mut self, pos: Vec2) {
        self.moved(pos);
        self.dragging = true;
    }

    pub fn released(&mut self) {
        self.dragging = false;
    }

    /// Position handed to the controller this frame.
    pub fn frame_position(&self) -> Vec2 {
        if self.seen {
            self.pos
        } else {
            Vec2::splat(-10_000.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    StartAudio,
    StopAudio,
}

#[inline]
pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        "Enter" | " " | "Spacebar" => Some(KeyAction::StartAudio),
        "Escape" | "Esc" => Some(KeyAction::StopAudio),
        _ => None,
    }
}
