//! Scrolling - content sizing, event translation and per-node scroll state.
//!
//! Architecture:
//! - `content_size` derives an auto-sizing container's content extent from
//!   committed child geometry (fed back through one corrective pass)
//! - `translator` cleans raw backend scroll reports into a stable stream
//! - [`ScrollState`] is the per-node runtime record: axis, current offset,
//!   scroll bounds from the last pass, translator and subscriber hub

pub mod content_size;
mod translator;

pub use content_size::{ChildSpan, content_extent};
pub use translator::{ScrollEvent, ScrollTranslator, Translation};

use crate::events::EventHub;
use crate::types::{Point, ScrollAxis};

// =============================================================================
// Scroll state
// =============================================================================

/// Per-node scroll runtime state.
///
/// The offset is user state; `max_offset` is computed by the layout pass
/// (content extent minus viewport extent) and the offset is re-clamped
/// whenever the bounds shrink.
#[derive(Debug, Default)]
pub struct ScrollState {
    pub axis: ScrollAxis,
    pub offset: Point,
    pub max_offset: Point,
    pub translator: ScrollTranslator,
    pub events: EventHub<ScrollEvent>,
}

impl ScrollState {
    /// Clamp a target offset to the valid scroll range.
    pub fn clamp(&self, target: Point) -> Point {
        Point::new(
            target.x.clamp(0.0, self.max_offset.x),
            target.y.clamp(0.0, self.max_offset.y),
        )
    }

    /// Update the scroll bounds after a pass and re-clamp the offset.
    pub fn set_bounds(&mut self, max_offset: Point) {
        self.max_offset = Point::new(max_offset.x.max(0.0), max_offset.y.max(0.0));
        self.offset = self.clamp(self.offset);
    }
}

// =============================================================================
// Tests
// =============================================================================
