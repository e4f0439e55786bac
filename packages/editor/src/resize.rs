use crate::selection::ElementRef;
use crate::surface::{ListenerId, Point, Size};

/// Resize drag lifecycle: Idle -> Dragging (pointer down on the handle)
/// -> Idle (pointer up, or the content was replaced mid-drag)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Drag),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub element: ElementRef,
    /// Pointer position at drag start, surface-local
    pub start: Point,
    pub start_size: Size,
    pub moved: bool,
    pub move_listener: ListenerId,
    pub up_listener: ListenerId,
}

impl Drag {
    /// Size for the current pointer position, never smaller than `min_px`
    pub fn size_at(&self, pointer: Point, min_px: f64) -> Size {
        let floor = min_px.max(0.0);
        Size {
            width: (self.start_size.width + pointer.x - self.start.x).max(floor),
            height: (self.start_size.height + pointer.y - self.start.y).max(floor),
        }
    }
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn drag(&self) -> Option<&Drag> {
        match self {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }

    pub fn drag_mut(&mut self) -> Option<&mut Drag> {
        match self {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }

    /// Return to Idle, handing back the finished drag
    pub fn finish(&mut self) -> Option<Drag> {
        match std::mem::take(self) {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }
}
