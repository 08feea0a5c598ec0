#![forbid(unsafe_code)]

//! Per-frame coalescing of drag-move input.
//!
//! Pointer moves arrive far more often than frames are drawn. The coalescer
//! keeps only the latest pending page x; the host applies it once per
//! animation frame. Release handling must [`MoveCoalescer::take`] first so the
//! final move is never lost.

/// Latest-wins buffer for horizontal pointer positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveCoalescer {
    pending: Option<i32>,
}

impl MoveCoalescer {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Record a move. Returns `true` when no move was pending, i.e. the host
    /// must schedule a frame.
    pub fn push(&mut self, page_x: i32) -> bool {
        self.pending.replace(page_x).is_none()
    }

    /// Take the pending move, if any.
    pub fn take(&mut self) -> Option<i32> {
        self.pending.take()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
