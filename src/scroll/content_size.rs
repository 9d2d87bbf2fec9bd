//! Scroll content sizer.
//!
//! Derives the content extent of an auto-sizing scrollable container from its
//! children's committed geometry. The computation runs strictly *after* the
//! flex pass that produced that geometry, and its result is applied through a
//! second, subtree-restricted pass; folding it into the producing pass would
//! re-dirty the subtree it is reading and loop.

use crate::error::Result;
use crate::tree::{LayoutTree, NodeId};
use crate::types::ScrollAxis;

// =============================================================================
// Extent computation
// =============================================================================

/// One child's contribution along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildSpan {
    /// Offset of the child from the content origin.
    pub offset: f32,
    /// Extent of the child along the scroll axis.
    pub extent: f32,
    /// Margin on the trailing edge (bottom for vertical, right for
    /// horizontal).
    pub trailing_margin: f32,
}

impl ChildSpan {
    pub const fn new(offset: f32, extent: f32, trailing_margin: f32) -> Self {
        Self {
            offset,
            extent,
            trailing_margin,
        }
    }
}

/// Compute the content extent along the scroll axis.
///
/// `max over children of (offset + extent + trailing margin)` plus the
/// container's trailing padding, floored at the viewport extent: content
/// never shrinks below what is visible. A container with zero children
/// degenerates to exactly the viewport extent.
pub fn content_extent(children: &[ChildSpan], trailing_padding: f32, viewport_extent: f32) -> f32 {
    if children.is_empty() {
        return viewport_extent;
    }

    let farthest = children
        .iter()
        .map(|c| c.offset + c.extent + c.trailing_margin)
        .fold(0.0f32, f32::max);

    (farthest + trailing_padding).max(viewport_extent)
}

// =============================================================================
// Tree measurement
// =============================================================================

/// Gather the child spans of a scroll host from committed geometry and
/// compute its content extent.
///
/// Must be called only after a pass has committed geometry for the host and
/// its user children; children an in-flight removal already excluded are
/// skipped rather than read.
pub fn measure(tree: &LayoutTree, host: NodeId, axis: ScrollAxis) -> Result<f32> {
    let host_geometry = tree.geometry(host)?;
    let viewport_extent = host_geometry.extent_along(axis);

    let trailing_padding = {
        let style = &tree.get(host)?.style;
        match axis {
            ScrollAxis::Vertical => style.padding.bottom,
            ScrollAxis::Horizontal => style.padding.right,
        }
    };

    let mut spans = Vec::new();
    for &child in tree.user_children_of(host)? {
        let Ok(geometry) = tree.geometry(child) else {
            continue;
        };
        let trailing_margin = {
            let style = &tree.get(child)?.style;
            match axis {
                ScrollAxis::Vertical => style.margin.bottom,
                ScrollAxis::Horizontal => style.margin.right,
            }
        };
        spans.push(ChildSpan::new(
            geometry.offset_along(axis),
            geometry.extent_along(axis),
            trailing_margin,
        ));
    }

    Ok(content_extent(&spans, trailing_padding, viewport_extent))
}

// =============================================================================
// Tests
// =============================================================================
