//! Directional mirror - right-to-left presentation flipping.
//!
//! When the ambient direction of a scrollable container resolves to RTL, a
//! horizontal flip transform is applied to the container and to every user
//! child, so presentation order visually mirrors while authoring coordinates
//! (left, top, committed geometry) stay untouched.
//!
//! Flipping is idempotent per node: the flip is a tracked bit, not an
//! accumulated transform, so removing and re-adding a child can never stack a
//! second flip. Children added after initial mirroring are flipped through
//! the add hook, not only at container construction.

use crate::error::Result;
use crate::tree::{LayoutTree, NodeFlags, NodeId};
use crate::types::Direction;

/// Whether the node currently carries the horizontal flip transform.
pub fn is_flipped(tree: &LayoutTree, node: NodeId) -> Result<bool> {
    Ok(tree.get(node)?.flags.contains(NodeFlags::FLIPPED))
}

/// Re-evaluate mirroring for one scrollable container.
///
/// Applies or clears the flip on the container and all user children based on
/// the resolved ambient direction. Safe to call repeatedly.
pub(crate) fn refresh_container(tree: &mut LayoutTree, host: NodeId) -> Result<()> {
    if !tree.get(host)?.is_scroll_host() {
        return Ok(());
    }
    let flipped = tree.resolved_direction(host) == Direction::Rtl;

    set_flip(tree, host, flipped)?;
    let children: Vec<NodeId> = tree.user_children_of(host)?.to_vec();
    for child in children {
        set_flip(tree, child, flipped)?;
    }
    Ok(())
}

/// Re-evaluate mirroring for every scrollable container in a subtree, after
/// an ambient direction change somewhere above them.
pub(crate) fn refresh_subtree(tree: &mut LayoutTree, root: NodeId) -> Result<()> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if tree.get(node)?.is_scroll_host() {
            refresh_container(tree, node)?;
        }
        stack.extend(tree.children_of(node)?.iter().copied());
    }
    Ok(())
}

/// Add hook: a child attached to an already-mirrored container inherits its
/// flip state immediately.
///
/// A child of a scroll host physically attaches to the synthetic content
/// node; the flip state lives on the host, so the hook looks through it.
pub(crate) fn on_child_added(tree: &mut LayoutTree, parent: NodeId, child: NodeId) -> Result<()> {
    let carrier = if tree.get(parent)?.is_content_node() {
        tree.parent_of(parent)?.unwrap_or(parent)
    } else {
        parent
    };
    let flipped = tree.get(carrier)?.flags.contains(NodeFlags::FLIPPED);
    set_flip(tree, child, flipped)
}

fn set_flip(tree: &mut LayoutTree, node: NodeId, flipped: bool) -> Result<()> {
    let flags = &mut tree.get_mut(node)?.flags;
    flags.set(NodeFlags::FLIPPED, flipped);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
