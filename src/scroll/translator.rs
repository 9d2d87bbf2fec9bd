//! Scroll event translator.
//!
//! Converts raw per-callback scroll-position reports into a stable stream of
//! `{translation, absolute_offset}` events. The raw reports arrive as
//! (current, previous) offset pairs keyed by node identity and are noisy in
//! two known ways:
//!
//! - components go negative during overscroll/bounce
//! - one backend invokes the callback twice per physical scroll tick with an
//!   identical pair
//!
//! Both anomalies are corrected here and never surfaced as errors.

use crate::types::Point;

// =============================================================================
// Events
// =============================================================================

/// Movement since the previously reported position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translation {
    pub dx: f32,
    pub dy: f32,
}

/// One cleaned scroll notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub translation: Translation,
    pub absolute_offset: Point,
}

// =============================================================================
// Translator
// =============================================================================

/// Per-node translator state.
///
/// Duplicate suppression compares the full (current, previous) pair
/// bit-for-bit against the pair of the immediately preceding emission; a
/// numerically equal pair with a different bit pattern is not a duplicate.
#[derive(Debug, Clone, Default)]
pub struct ScrollTranslator {
    last_pair: Option<(Point, Point)>,
}

impl ScrollTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one raw report. Returns the event to emit, or `None` when the
    /// report is a duplicate of the previous emission.
    pub fn translate(&mut self, current: Point, previous: Point) -> Option<ScrollEvent> {
        let current = clamp_origin(current);
        let previous = clamp_origin(previous);

        if let Some((last_current, last_previous)) = &self.last_pair
            && last_current.bits_eq(&current)
            && last_previous.bits_eq(&previous)
        {
            return None;
        }
        self.last_pair = Some((current, previous));

        Some(ScrollEvent {
            translation: Translation {
                dx: current.x - previous.x,
                dy: current.y - previous.y,
            },
            absolute_offset: current,
        })
    }

    /// Forget the previous emission, e.g. after a programmatic jump.
    pub fn reset(&mut self) {
        self.last_pair = None;
    }
}

/// Backends report spurious negative offsets during bounce; clamp each
/// component to the scrollable range.
#[inline]
fn clamp_origin(p: Point) -> Point {
    Point::new(p.x.max(0.0), p.y.max(0.0))
}

// =============================================================================
// Tests
// =============================================================================
