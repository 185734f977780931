//! Pointer tracking for the manual orbit camera.
//!
//! Pointers are kept in insertion order and the most recently inserted one
//! drives the camera. Any release or leave clears every tracked pointer, not
//! just the one that was lifted.

use shared::glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(PointerId, Vec2),
    Move(PointerId, Vec2),
    Up,
    Leave,
}

/// Positions are window coordinates in physical pixels, origin top-left.
#[derive(Debug, Default)]
pub struct PointerTracker {
    touching: bool,
    pointers: Vec<(PointerId, Vec2)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(id, position) => {
                self.touching = true;
                self.upsert(id, position);
            }
            PointerEvent::Move(id, position) => {
                if self.touching {
                    self.upsert(id, position);
                }
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.touching = false;
                self.pointers.clear();
            }
        }
    }

    fn upsert(&mut self, id: PointerId, position: Vec2) {
        match self.pointers.iter_mut().find(|(tracked, _)| *tracked == id) {
            Some((_, tracked)) => *tracked = position,
            None => self.pointers.push((id, position)),
        }
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn count(&self) -> usize {
        self.pointers.len()
    }

    /// Position of the most recently inserted pointer.
    pub fn active(&self) -> Option<Vec2> {
        self.pointers.last().map(|&(_, position)| position)
    }
}
