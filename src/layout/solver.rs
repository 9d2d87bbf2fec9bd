//! Solver bridge - integration with the Taffy flex solver.
//!
//! Converts StyleNode properties to Taffy styles, runs layout computation
//! over one subtree, and extracts results as a pass result the coordinator
//! commits back into the tree.
//!
//! The solver itself is an external collaborator; this module only decides
//! what it sees. The one semantic the bridge enforces rather than forwards:
//! a node declaring both `flexGrow > 0` and an explicit `flexBasis` has the
//! basis discarded in favor of content-fill distribution.

use std::collections::HashMap;

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf,
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, NodeId as SolverNodeId, Overflow as TaffyOverflow,
    Position as TaffyPosition, Rect, Size as TaffySize, Style, TaffyTree,
};

use crate::error::Result;
use crate::tree::{LayoutTree, NodeData, NodeId};
use crate::types::{
    AlignContent, AlignItems, AlignSelf, Dimension, FlexDirection, FlexWrap, Geometry,
    JustifyContent, PositionType, ScrollAxis, Size,
};

// =============================================================================
// Pass output
// =============================================================================

/// Resolved geometry for one node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassEntry {
    pub node: NodeId,
    pub geometry: Geometry,
    /// Solver-reported extent of the node's content, which may exceed its
    /// own box. Drives scroll bounds.
    pub content_size: Size,
}

/// Output of one solver pass over a subtree.
#[derive(Debug, Default)]
pub struct PassResult {
    pub entries: Vec<PassEntry>,
}

// =============================================================================
// Dimension conversion
// =============================================================================

fn to_solver_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Points(n) => TaffyDimension::Length(n),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_solver_lpa(dim: Dimension) -> LengthPercentageAuto {
    match dim {
        Dimension::Auto => LengthPercentageAuto::Auto,
        Dimension::Points(n) => LengthPercentageAuto::Length(n),
        Dimension::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
    }
}

// =============================================================================
// Enum conversions
// =============================================================================

fn to_solver_position(position: PositionType) -> TaffyPosition {
    match position {
        PositionType::Relative => TaffyPosition::Relative,
        PositionType::Absolute => TaffyPosition::Absolute,
    }
}

fn to_solver_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_solver_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_solver_justify_content(justify: JustifyContent) -> Option<TaffyJustifyContent> {
    Some(match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_solver_align_items(align: AlignItems) -> Option<TaffyAlignItems> {
    Some(match align {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
        AlignItems::Baseline => TaffyAlignItems::Baseline,
    })
}

fn to_solver_align_content(align: AlignContent) -> Option<TaffyAlignContent> {
    Some(match align {
        AlignContent::Stretch => TaffyAlignContent::Stretch,
        AlignContent::FlexStart => TaffyAlignContent::FlexStart,
        AlignContent::Center => TaffyAlignContent::Center,
        AlignContent::FlexEnd => TaffyAlignContent::FlexEnd,
        AlignContent::SpaceBetween => TaffyAlignContent::SpaceBetween,
        AlignContent::SpaceAround => TaffyAlignContent::SpaceAround,
    })
}

fn to_solver_align_self(align: AlignSelf) -> Option<TaffyAlignSelf> {
    match align {
        AlignSelf::Auto => None, // inherit from parent
        AlignSelf::Stretch => Some(TaffyAlignSelf::Stretch),
        AlignSelf::FlexStart => Some(TaffyAlignSelf::FlexStart),
        AlignSelf::Center => Some(TaffyAlignSelf::Center),
        AlignSelf::FlexEnd => Some(TaffyAlignSelf::FlexEnd),
        AlignSelf::Baseline => Some(TaffyAlignSelf::Baseline),
    }
}

// =============================================================================
// Style building
// =============================================================================

/// Build a solver style from one node's style record.
fn build_style(data: &NodeData) -> Style {
    let style = &data.style;

    // Tie-break: content-fill distribution wins over an explicit basis.
    let flex_basis = if style.flex_grow > 0.0 {
        TaffyDimension::Auto
    } else {
        to_solver_dimension(style.flex_basis)
    };

    // Scroll hosts clip their content; everything else stays visible.
    let overflow = if data.is_scroll_host() {
        let axis = data
            .scroll
            .as_ref()
            .map(|s| s.axis)
            .unwrap_or(ScrollAxis::Vertical);
        match axis {
            ScrollAxis::Vertical => taffy::Point {
                x: TaffyOverflow::Clip,
                y: TaffyOverflow::Scroll,
            },
            ScrollAxis::Horizontal => taffy::Point {
                x: TaffyOverflow::Scroll,
                y: TaffyOverflow::Clip,
            },
        }
    } else {
        taffy::Point {
            x: TaffyOverflow::Visible,
            y: TaffyOverflow::Visible,
        }
    };

    Style {
        display: Display::Flex,
        position: to_solver_position(style.position),

        inset: Rect {
            left: to_solver_lpa(style.inset.left),
            right: to_solver_lpa(style.inset.right),
            top: to_solver_lpa(style.inset.top),
            bottom: to_solver_lpa(style.inset.bottom),
        },

        flex_direction: to_solver_flex_direction(style.flex_direction),
        flex_wrap: to_solver_flex_wrap(style.flex_wrap),
        justify_content: to_solver_justify_content(style.justify_content),
        align_items: to_solver_align_items(style.align_items),
        align_content: to_solver_align_content(style.align_content),

        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis,
        align_self: to_solver_align_self(style.align_self),

        size: TaffySize {
            width: to_solver_dimension(style.width),
            height: to_solver_dimension(style.height),
        },
        min_size: TaffySize {
            width: to_solver_dimension(style.min_width),
            height: to_solver_dimension(style.min_height),
        },
        max_size: TaffySize {
            width: to_solver_dimension(style.max_width),
            height: to_solver_dimension(style.max_height),
        },

        margin: Rect {
            left: LengthPercentageAuto::Length(style.margin.left),
            right: LengthPercentageAuto::Length(style.margin.right),
            top: LengthPercentageAuto::Length(style.margin.top),
            bottom: LengthPercentageAuto::Length(style.margin.bottom),
        },
        padding: Rect {
            left: LengthPercentage::Length(style.padding.left),
            right: LengthPercentage::Length(style.padding.right),
            top: LengthPercentage::Length(style.padding.top),
            bottom: LengthPercentage::Length(style.padding.bottom),
        },

        overflow,

        ..Default::default()
    }
}

// =============================================================================
// Main entry point
// =============================================================================

/// Run one solver pass over the subtree rooted at `root`.
///
/// Nothing is written back to the tree here; the coordinator commits the
/// returned entries, skipping nodes removed while the pass was in flight.
pub fn compute(tree: &LayoutTree, root: NodeId, available: Size) -> Result<PassResult> {
    let mut solver: TaffyTree<()> = TaffyTree::new();
    let mut mapping: Vec<(NodeId, SolverNodeId)> = Vec::new();
    let mut by_id: HashMap<NodeId, SolverNodeId> = HashMap::new();

    // First pass: create all solver nodes, parents before children.
    let mut queue = vec![root];
    let mut ordered = Vec::new();
    while let Some(id) = queue.pop() {
        let data = tree.get(id)?;
        let solver_id = solver.new_leaf(build_style(data))?;
        mapping.push((id, solver_id));
        by_id.insert(id, solver_id);
        ordered.push(id);
        queue.extend(data.children.iter().copied());
    }

    // Second pass: wire up parent-child relationships in tree order.
    for &id in &ordered {
        let parent_solver = by_id[&id];
        for child in tree.children_of(id)? {
            solver.add_child(parent_solver, by_id[child])?;
        }
    }

    solver.compute_layout(
        by_id[&root],
        TaffySize {
            width: AvailableSpace::Definite(available.width),
            height: AvailableSpace::Definite(available.height),
        },
    )?;

    // Extract results.
    let mut result = PassResult::default();
    for (id, solver_id) in mapping {
        let layout = solver.layout(solver_id)?;
        result.entries.push(PassEntry {
            node: id,
            geometry: Geometry::new(
                layout.location.x,
                layout.location.y,
                layout.size.width,
                layout.size.height,
            ),
            content_size: Size::new(layout.content_size.width, layout.content_size.height),
        });
    }
    Ok(result)
}

// =============================================================================
// Tests
// =============================================================================
