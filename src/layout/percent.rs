//! Percentage resolver - legacy absolute-positioning fallback.
//!
//! Used only for container subtrees with no solver integration. Resolution is
//! a single top-down pass: a node resolves its own geometry first, then
//! explicitly re-invokes resolution for every child, because a child's
//! percentage references the parent box that was just computed. Nothing is
//! cached across passes.
//!
//! left/top/width/height percentages resolve against the *immediate* parent's
//! full box, not its content box. The placement directive applied to a
//! container's children is a pure function of the container's declared kind
//! (see [`placement_for`]).

use crate::error::{Error, Result};
use crate::tree::{LayoutTree, NodeId};
use crate::types::{
    ContainerKind, Dimension, Geometry, PlacementDirective, Size, placement_for,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

// =============================================================================
// Entry point
// =============================================================================

/// Resolve the subtree rooted at `root` against the given parent extents.
///
/// Returns parent-relative geometry for every node in the subtree; the
/// coordinator commits the entries. On error nothing has been committed and
/// the tree keeps its last good geometry.
pub fn resolve_subtree(
    tree: &LayoutTree,
    root: NodeId,
    parent_extent: Size,
) -> Result<Vec<(NodeId, Geometry)>> {
    let mut out = Vec::new();
    let geometry = resolve_box(tree, root, parent_extent)?;
    out.push((root, geometry));
    place_children(tree, root, geometry.size(), &mut out)?;
    Ok(out)
}

// =============================================================================
// Own-box resolution
// =============================================================================

/// Resolve one node's own box against its parent's full box.
fn resolve_box(tree: &LayoutTree, node: NodeId, parent: Size) -> Result<Geometry> {
    let style = &tree.get(node)?.style;
    let width = resolve_extent(tree, node, Axis::Horizontal, parent.width)?;
    let height = resolve_extent(tree, node, Axis::Vertical, parent.height)?;
    let x = style.inset.left.resolve(parent.width).unwrap_or(0.0) + style.margin.left;
    let y = style.inset.top.resolve(parent.height).unwrap_or(0.0) + style.margin.top;
    Ok(Geometry::new(x, y, width, height))
}

/// Resolve a node's extent along one axis, falling back to content-derived
/// sizing for `auto` and clamping to the declared min/max bounds.
fn resolve_extent(tree: &LayoutTree, node: NodeId, axis: Axis, parent_extent: f32) -> Result<f32> {
    let style = &tree.get(node)?.style;
    let (dim, min_dim, max_dim) = match axis {
        Axis::Horizontal => (style.width, style.min_width, style.max_width),
        Axis::Vertical => (style.height, style.min_height, style.max_height),
    };

    let mut extent = match dim.resolve(parent_extent) {
        Some(v) => v,
        None => auto_extent(tree, node, axis)?,
    };

    if let Some(min) = min_dim.resolve(parent_extent) {
        extent = extent.max(min);
    }
    if let Some(max) = max_dim.resolve(parent_extent) {
        extent = extent.min(max);
    }
    Ok(extent.max(0.0))
}

/// Content-derived extent of an auto-sized node.
///
/// A child percentage on the same axis cannot terminate here - the parent's
/// extent would depend on the child that depends on the parent - and is a
/// configuration error, never a silent default.
fn auto_extent(tree: &LayoutTree, node: NodeId, axis: Axis) -> Result<f32> {
    let data = tree.get(node)?;
    let style = &data.style;

    let (padding, sums_children) = match axis {
        Axis::Horizontal => (
            style.padding.left + style.padding.right,
            data.kind == ContainerKind::Linear && style.flex_direction.is_row(),
        ),
        Axis::Vertical => (
            style.padding.top + style.padding.bottom,
            data.kind == ContainerKind::Linear && !style.flex_direction.is_row(),
        ),
    };

    let mut combined = 0.0f32;
    for &child in &data.children {
        let child_style = &tree.get(child)?.style;
        let (child_dim, leading_margin, trailing_margin) = match axis {
            Axis::Horizontal => (
                child_style.width,
                child_style.margin.left,
                child_style.margin.right,
            ),
            Axis::Vertical => (
                child_style.height,
                child_style.margin.top,
                child_style.margin.bottom,
            ),
        };

        if child_dim.is_percent() {
            return Err(Error::CyclicPercentage(child));
        }
        let child_extent = match child_dim {
            Dimension::Points(v) => v,
            _ => auto_extent(tree, child, axis)?,
        };
        let with_margins = child_extent + leading_margin + trailing_margin;

        if sums_children {
            combined += with_margins;
        } else {
            combined = combined.max(with_margins);
        }
    }

    Ok(combined + padding)
}

// =============================================================================
// Child placement
// =============================================================================

/// Place every child of `node` inside its freshly resolved box, then recurse.
fn place_children(
    tree: &LayoutTree,
    node: NodeId,
    own_box: Size,
    out: &mut Vec<(NodeId, Geometry)>,
) -> Result<()> {
    let data = tree.get(node)?;
    if data.children.is_empty() {
        return Ok(());
    }

    match placement_for(data.kind) {
        PlacementDirective::FreeForm => place_free_form(tree, node, own_box, out),
        PlacementDirective::WeightedLinear => place_weighted_linear(tree, node, own_box, out),
        PlacementDirective::SiblingRelative => place_sibling_relative(tree, node, own_box, out),
    }
}

/// Free-form placement: each child sits at its own left/top offsets.
fn place_free_form(
    tree: &LayoutTree,
    node: NodeId,
    own_box: Size,
    out: &mut Vec<(NodeId, Geometry)>,
) -> Result<()> {
    for &child in tree.children_of(node)? {
        let geometry = resolve_box(tree, child, own_box)?;
        out.push((child, geometry));
        place_children(tree, child, geometry.size(), out)?;
    }
    Ok(())
}

/// Weighted-linear placement: children stack along the container's declared
/// direction; leftover main-axis space is split by grow weight.
fn place_weighted_linear(
    tree: &LayoutTree,
    node: NodeId,
    own_box: Size,
    out: &mut Vec<(NodeId, Geometry)>,
) -> Result<()> {
    let data = tree.get(node)?;
    let style = &data.style;
    let is_row = style.flex_direction.is_row();
    let (main_extent, leading_padding, trailing_padding, cross_padding) = if is_row {
        (
            own_box.width,
            style.padding.left,
            style.padding.right,
            style.padding.top,
        )
    } else {
        (
            own_box.height,
            style.padding.top,
            style.padding.bottom,
            style.padding.left,
        )
    };

    let mut children: Vec<NodeId> = data.children.clone();
    if style.flex_direction.is_reverse() {
        children.reverse();
    }

    // First sweep: fixed extents and grow weights.
    let mut fixed_total = 0.0f32;
    let mut grow_total = 0.0f32;
    let mut fixed: Vec<Option<f32>> = Vec::with_capacity(children.len());
    for &child in &children {
        let child_data = tree.get(child)?;
        let (leading, trailing) = main_margins(tree, child, is_row)?;
        if child_data.style.flex_grow > 0.0 {
            grow_total += child_data.style.flex_grow;
            fixed_total += leading + trailing;
            fixed.push(None);
        } else {
            let axis = if is_row { Axis::Horizontal } else { Axis::Vertical };
            let extent = resolve_extent(tree, child, axis, main_extent)?;
            fixed_total += extent + leading + trailing;
            fixed.push(Some(extent));
        }
    }

    let leftover =
        (main_extent - leading_padding - trailing_padding - fixed_total).max(0.0);

    // Second sweep: place.
    let mut cursor = leading_padding;
    for (i, &child) in children.iter().enumerate() {
        let child_data = tree.get(child)?;
        let grow = child_data.style.flex_grow;
        let (leading, trailing) = main_margins(tree, child, is_row)?;
        let main = match fixed[i] {
            Some(extent) => extent,
            None => leftover * grow / grow_total,
        };
        let cross_axis = if is_row { Axis::Vertical } else { Axis::Horizontal };
        let cross = resolve_extent(
            tree,
            child,
            cross_axis,
            if is_row { own_box.height } else { own_box.width },
        )?;
        let (cross_leading, _) = cross_margins(tree, child, is_row)?;

        let geometry = if is_row {
            Geometry::new(cursor + leading, cross_padding + cross_leading, main, cross)
        } else {
            Geometry::new(cross_padding + cross_leading, cursor + leading, cross, main)
        };
        cursor += leading + main + trailing;

        out.push((child, geometry));
        place_children(tree, child, geometry.size(), out)?;
    }
    Ok(())
}

/// Sibling-relative placement: each child stacks below the previous one,
/// offset by its own top/left values.
fn place_sibling_relative(
    tree: &LayoutTree,
    node: NodeId,
    own_box: Size,
    out: &mut Vec<(NodeId, Geometry)>,
) -> Result<()> {
    let mut previous_bottom = tree.get(node)?.style.padding.top;
    for &child in tree.children_of(node)? {
        let style = &tree.get(child)?.style;
        let width = resolve_extent(tree, child, Axis::Horizontal, own_box.width)?;
        let height = resolve_extent(tree, child, Axis::Vertical, own_box.height)?;
        let x = style.inset.left.resolve(own_box.width).unwrap_or(0.0) + style.margin.left;
        let y = previous_bottom
            + style.inset.top.resolve(own_box.height).unwrap_or(0.0)
            + style.margin.top;
        previous_bottom = y + height + style.margin.bottom;

        let geometry = Geometry::new(x, y, width, height);
        out.push((child, geometry));
        place_children(tree, child, geometry.size(), out)?;
    }
    Ok(())
}

fn main_margins(tree: &LayoutTree, child: NodeId, is_row: bool) -> Result<(f32, f32)> {
    let margin = &tree.get(child)?.style.margin;
    Ok(if is_row {
        (margin.left, margin.right)
    } else {
        (margin.top, margin.bottom)
    })
}

fn cross_margins(tree: &LayoutTree, child: NodeId, is_row: bool) -> Result<(f32, f32)> {
    let margin = &tree.get(child)?.style.margin;
    Ok(if is_row {
        (margin.top, margin.bottom)
    } else {
        (margin.left, margin.right)
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlexDirection, StyleKey, StyleValue};

    fn set(tree: &mut LayoutTree, node: NodeId, key: StyleKey, value: StyleValue) {
        tree.get_mut(node).unwrap().style.apply(key, value).unwrap();
    }

    fn geometry_of(entries: &[(NodeId, Geometry)], node: NodeId) -> Geometry {
        entries
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, g)| *g)
            .expect("node resolved")
    }

    #[test]
    fn test_percent_resolves_against_immediate_parent() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Absolute);
        let child = tree.create(ContainerKind::Absolute);
        tree.add_child(parent, child).unwrap();
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(200.0).into());
        set(
            &mut tree,
            parent,
            StyleKey::Height,
            Dimension::Points(100.0).into(),
        );
        set(&mut tree, child, StyleKey::Width, Dimension::Percent(50.0).into());
        set(
            &mut tree,
            child,
            StyleKey::Height,
            Dimension::Points(10.0).into(),
        );

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        assert_eq!(geometry_of(&entries, child).width, 100.0);
    }

    #[test]
    fn test_no_caching_across_passes() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Absolute);
        let child = tree.create(ContainerKind::Absolute);
        tree.add_child(parent, child).unwrap();
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(200.0).into());
        set(
            &mut tree,
            parent,
            StyleKey::Height,
            Dimension::Points(100.0).into(),
        );
        set(&mut tree, child, StyleKey::Width, Dimension::Percent(50.0).into());

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        assert_eq!(geometry_of(&entries, child).width, 100.0);

        // Parent re-resolves to 300; the child must follow on the next pass.
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(300.0).into());
        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        assert_eq!(geometry_of(&entries, child).width, 150.0);
    }

    #[test]
    fn test_cyclic_percentage_fails_loudly() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Absolute);
        let child = tree.create(ContainerKind::Absolute);
        tree.add_child(parent, child).unwrap();
        // Parent height is content-derived, child height references parent.
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(100.0).into());
        set(
            &mut tree,
            child,
            StyleKey::Height,
            Dimension::Percent(50.0).into(),
        );

        let err = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap_err();
        assert!(matches!(err, Error::CyclicPercentage(_)));
    }

    #[test]
    fn test_free_form_uses_own_offsets() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Absolute);
        let child = tree.create(ContainerKind::Absolute);
        tree.add_child(parent, child).unwrap();
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(200.0).into());
        set(
            &mut tree,
            parent,
            StyleKey::Height,
            Dimension::Points(100.0).into(),
        );
        set(&mut tree, child, StyleKey::Left, Dimension::Percent(25.0).into());
        set(&mut tree, child, StyleKey::Top, Dimension::Points(10.0).into());
        set(&mut tree, child, StyleKey::Width, Dimension::Points(20.0).into());
        set(
            &mut tree,
            child,
            StyleKey::Height,
            Dimension::Points(20.0).into(),
        );

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        let child_geometry = geometry_of(&entries, child);
        assert_eq!(child_geometry.x, 50.0); // 25% of 200
        assert_eq!(child_geometry.y, 10.0);
    }

    #[test]
    fn test_weighted_linear_distributes_leftover() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Linear);
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(300.0).into());
        set(
            &mut tree,
            parent,
            StyleKey::Height,
            Dimension::Points(50.0).into(),
        );
        set(
            &mut tree,
            parent,
            StyleKey::FlexDirection,
            StyleValue::FlexDirection(FlexDirection::Row),
        );

        let fixed = tree.create(ContainerKind::Absolute);
        let light = tree.create(ContainerKind::Absolute);
        let heavy = tree.create(ContainerKind::Absolute);
        for node in [fixed, light, heavy] {
            tree.add_child(parent, node).unwrap();
            set(
                &mut tree,
                node,
                StyleKey::Height,
                Dimension::Points(50.0).into(),
            );
        }
        set(&mut tree, fixed, StyleKey::Width, Dimension::Points(60.0).into());
        set(&mut tree, light, StyleKey::FlexGrow, 1.0.into());
        set(&mut tree, heavy, StyleKey::FlexGrow, 2.0.into());

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        assert_eq!(geometry_of(&entries, fixed).width, 60.0);
        assert_eq!(geometry_of(&entries, light).width, 80.0); // (300-60)/3
        assert_eq!(geometry_of(&entries, heavy).width, 160.0);
        // Sequential placement.
        assert_eq!(geometry_of(&entries, fixed).x, 0.0);
        assert_eq!(geometry_of(&entries, light).x, 60.0);
        assert_eq!(geometry_of(&entries, heavy).x, 140.0);
    }

    #[test]
    fn test_sibling_relative_stacks_below_previous() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Relative);
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(100.0).into());
        set(
            &mut tree,
            parent,
            StyleKey::Height,
            Dimension::Points(300.0).into(),
        );

        let first = tree.create(ContainerKind::Absolute);
        let second = tree.create(ContainerKind::Absolute);
        for node in [first, second] {
            tree.add_child(parent, node).unwrap();
            set(
                &mut tree,
                node,
                StyleKey::Height,
                Dimension::Points(40.0).into(),
            );
            set(
                &mut tree,
                node,
                StyleKey::Width,
                Dimension::Points(100.0).into(),
            );
        }
        set(&mut tree, second, StyleKey::Top, Dimension::Points(5.0).into());

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        assert_eq!(geometry_of(&entries, first).y, 0.0);
        assert_eq!(geometry_of(&entries, second).y, 45.0); // 40 + 5 offset
    }

    #[test]
    fn test_min_max_clamp_in_fallback_path() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Absolute);
        let child = tree.create(ContainerKind::Absolute);
        tree.add_child(parent, child).unwrap();
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(200.0).into());
        set(
            &mut tree,
            parent,
            StyleKey::Height,
            Dimension::Points(100.0).into(),
        );
        set(&mut tree, child, StyleKey::Width, Dimension::Percent(90.0).into());
        set(
            &mut tree,
            child,
            StyleKey::MaxWidth,
            Dimension::Points(120.0).into(),
        );
        set(
            &mut tree,
            child,
            StyleKey::Height,
            Dimension::Points(10.0).into(),
        );
        set(
            &mut tree,
            child,
            StyleKey::MinHeight,
            Dimension::Points(25.0).into(),
        );

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        let child_geometry = geometry_of(&entries, child);
        assert_eq!(child_geometry.width, 120.0); // 180 clamped by max
        assert_eq!(child_geometry.height, 25.0); // raised to min
    }

    #[test]
    fn test_auto_parent_sums_linear_children() {
        let mut tree = LayoutTree::new();
        let parent = tree.create(ContainerKind::Linear);
        set(&mut tree, parent, StyleKey::Width, Dimension::Points(100.0).into());
        // height stays auto: derived from children

        for extent in [30.0, 50.0] {
            let child = tree.create(ContainerKind::Absolute);
            tree.add_child(parent, child).unwrap();
            set(
                &mut tree,
                child,
                StyleKey::Height,
                Dimension::Points(extent).into(),
            );
        }

        let entries = resolve_subtree(&tree, parent, Size::new(320.0, 480.0)).unwrap();
        assert_eq!(geometry_of(&entries, parent).height, 80.0);
    }
}
