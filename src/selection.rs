use egui::{Pos2, Rect};

/// Primary-button state for one frame, positions relative to the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerFrame {
    /// Pressed this frame while hovering the image view.
    pub pressed: bool,
    pub released: bool,
    pub down: bool,
    pub pos: Option<Pos2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Dragging { start: Pos2, current: Pos2 },
    Ready { start: Pos2, end: Pos2 },
}

impl SelectionState {
    pub fn press(&mut self, at: Pos2) {
        log::debug!("selection: press at ({:.1}, {:.1})", at.x, at.y);
        *self = SelectionState::Dragging {
            start: at,
            current: at,
        };
    }

    pub fn drag_to(&mut self, at: Pos2) {
        if let SelectionState::Dragging { current, .. } = self {
            *current = at;
        }
    }

    pub fn release(&mut self, at: Pos2) -> Option<(Pos2, Pos2)> {
        match *self {
            SelectionState::Dragging { start, .. } => {
                log::debug!("selection: release at ({:.1}, {:.1})", at.x, at.y);
                *self = SelectionState::Ready { start, end: at };
                Some((start, at))
            }
            _ => None,
        }
    }

    /// Advances the gesture by one frame of input. Returns the corners once a drag ends.
    ///
    /// A press and release landing in the same frame finish immediately. A drag whose
    /// release was never seen (button up, or pointer lost outside the window) ends at
    /// the last known position.
    pub fn on_pointer(&mut self, frame: PointerFrame) -> Option<(Pos2, Pos2)> {
        if frame.pressed {
            if let Some(at) = frame.pos {
                self.press(at);
            }
        }
        let SelectionState::Dragging { current, .. } = *self else {
            return None;
        };
        if frame.released || !frame.down {
            self.release(frame.pos.unwrap_or(current))
        } else {
            if let Some(at) = frame.pos {
                self.drag_to(at);
            }
            None
        }
    }

    pub fn clear(&mut self) {
        *self = SelectionState::Idle;
    }

    pub fn visible_rect(&self) -> Option<Rect> {
        match *self {
            SelectionState::Idle => None,
            SelectionState::Dragging { start, current } => Some(Rect::from_two_pos(start, current)),
            SelectionState::Ready { start, end } => Some(Rect::from_two_pos(start, end)),
        }
    }
}
