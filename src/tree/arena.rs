//! Layout tree - arena-backed node registry.
//!
//! Manages the lifecycle of node slots:
//! - id allocation with a free pool for O(1) reuse
//! - generation tags so a reused slot never accepts writes addressed to the
//!   node that previously occupied it
//! - exclusive ownership of ordered children lists
//! - synthetic content nodes for scrollable containers
//! - the dirty queue consumed by the layout coordinator
//!
//! The tree is an explicit object constructed at the composition root and
//! passed by reference; there are no ambient statics.

use std::fmt;

use crate::error::{Error, Result};
use crate::tree::node::{NodeData, NodeFlags};
use crate::types::{ContainerKind, Direction, Geometry, ScrollAxis};

// =============================================================================
// NodeId
// =============================================================================

/// Stable identity of a node.
///
/// The generation tag distinguishes a live node from a removed one whose slot
/// index has been reused; an id captured before removal can never address the
/// replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub(crate) const fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.index)
    }
}

// =============================================================================
// LayoutTree
// =============================================================================

struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// The ownership tree of style nodes.
pub struct LayoutTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    dirty: Vec<NodeId>,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTree")
            .field("live", &self.len())
            .field("dirty", &self.dirty.len())
            .finish()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            dirty: Vec::new(),
        }
    }

    // =========================================================================
    // Allocation and lifecycle
    // =========================================================================

    /// Create a detached node of the given container kind.
    pub fn create(&mut self, kind: ContainerKind) -> NodeId {
        let data = NodeData::new(kind);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                data: Some(data),
            });
            NodeId::new(index, 1)
        }
    }

    /// Remove a node and its entire subtree.
    ///
    /// Geometry is invalidated immediately: the slot generation is bumped, so
    /// a pass already in flight can no longer commit to any removed node.
    /// Returns the ids that were removed.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        if !self.contains(id) {
            return Err(Error::UnknownNode(id));
        }

        // Detach from the owner first.
        let owner = self.data(id).and_then(|d| d.parent);
        if let Some(parent) = owner
            && let Some(parent_data) = self.data_mut(parent)
        {
            parent_data.children.retain(|c| *c != id);
            if parent_data.content == Some(id) {
                parent_data.content = None;
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index()];
            if slot.generation != current.generation {
                continue;
            }
            if let Some(data) = slot.data.take() {
                stack.extend(data.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index() as u32);
                removed.push(current);
            }
        }
        self.dirty.retain(|d| !removed.contains(d));
        Ok(removed)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.data.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the id names a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[inline]
    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.data.as_ref())
    }

    #[inline]
    pub(crate) fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.data.as_mut())
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&NodeData> {
        self.data(id).ok_or(Error::UnknownNode(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.data_mut(id).ok_or(Error::UnknownNode(id))
    }

    /// Last committed geometry, or `Unresolved` if no pass has ever covered
    /// the node. Never silently returns zeros.
    pub fn geometry(&self, id: NodeId) -> Result<Geometry> {
        self.get(id)?.geometry.ok_or(Error::Unresolved(id))
    }

    pub fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(id)?.parent)
    }

    /// The ordered children list as owned by the container itself (for a
    /// scroll host this is the content node).
    pub fn children_of(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    /// The user-visible children: for a scroll host, the children of its
    /// content node.
    pub fn user_children_of(&self, id: NodeId) -> Result<&[NodeId]> {
        let data = self.get(id)?;
        match data.content {
            Some(content) => self.children_of(content),
            None => Ok(&data.children),
        }
    }

    /// Resolve the ambient direction by walking the ownership chain.
    /// An unresolved chain defaults to left-to-right.
    pub fn resolved_direction(&self, id: NodeId) -> Direction {
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(data) = self.data(node) else { break };
            match data.style.direction {
                Direction::Inherit => current = data.parent,
                resolved => return resolved,
            }
        }
        Direction::Ltr
    }

    /// The root of the tree containing `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.data(current).and_then(|d| d.parent) {
            current = parent;
        }
        current
    }

    /// All live roots (nodes without an owner).
    pub fn roots(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.data
                    .as_ref()
                    .filter(|d| d.parent.is_none())
                    .map(|_| NodeId::new(index as u32, slot.generation))
            })
            .collect()
    }

    // =========================================================================
    // Ownership
    // =========================================================================

    /// Append `child` to the container's children.
    ///
    /// For a scroll host the child lands inside the synthetic content node.
    /// A child that already has an owner is detached from it first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.effective_children_len(parent)?;
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` among the container's children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if !self.contains(child) {
            return Err(Error::UnknownNode(child));
        }
        let target = self.effective_parent(parent)?;
        if target == child || self.is_ancestor(child, target) {
            return Err(Error::UnknownNode(child));
        }

        self.detach(child)?;

        let target_data = self.get_mut(target)?;
        let index = index.min(target_data.children.len());
        target_data.children.insert(index, child);
        self.get_mut(child)?.parent = Some(target);

        self.mark_dirty(parent);
        Ok(())
    }

    /// Detach a node from its owner without destroying it.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.get(child)?.parent else {
            return Ok(());
        };
        if let Some(parent_data) = self.data_mut(parent) {
            parent_data.children.retain(|c| *c != child);
        }
        self.get_mut(child)?.parent = None;
        self.mark_dirty(parent);
        Ok(())
    }

    /// Where user children of `parent` actually attach.
    fn effective_parent(&self, parent: NodeId) -> Result<NodeId> {
        let data = self.get(parent)?;
        Ok(data.content.unwrap_or(parent))
    }

    fn effective_children_len(&self, parent: NodeId) -> Result<usize> {
        let target = self.effective_parent(parent)?;
        Ok(self.get(target)?.children.len())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = self.data(of).and_then(|d| d.parent);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.data(node).and_then(|d| d.parent);
        }
        false
    }

    // =========================================================================
    // Scroll host setup
    // =========================================================================

    /// Promote a node to a scrollable container.
    ///
    /// Synthesizes the content node on first promotion and reparents any
    /// existing children into it. Idempotent.
    pub fn enable_scroll_host(&mut self, id: NodeId, axis: ScrollAxis) -> Result<NodeId> {
        let (existing_content, existing, kind) = {
            let data = self.get(id)?;
            (data.content, data.children.clone(), data.kind)
        };
        if let Some(content) = existing_content {
            self.get_mut(id)?.scroll_mut().axis = axis;
            self.set_content_axis(content, axis)?;
            self.mark_dirty(id);
            return Ok(content);
        }

        let content = self.create(kind);
        {
            let content_data = self.get_mut(content)?;
            content_data.flags.insert(NodeFlags::CONTENT_NODE);
            content_data.parent = Some(id);
            content_data.children = existing.clone();
        }
        self.set_content_axis(content, axis)?;
        for child in existing {
            self.get_mut(child)?.parent = Some(content);
        }

        let host = self.get_mut(id)?;
        host.children = vec![content];
        host.content = Some(content);
        host.flags.insert(NodeFlags::SCROLL_HOST);
        host.scroll_mut().axis = axis;
        self.mark_dirty(id);
        Ok(content)
    }

    /// Content nodes stack along the scroll axis and fill the cross axis
    /// until the sizer pins it to the committed viewport extent.
    fn set_content_axis(&mut self, content: NodeId, axis: ScrollAxis) -> Result<()> {
        use crate::types::{Dimension, FlexDirection};
        let style = &mut self.get_mut(content)?.style;
        match axis {
            ScrollAxis::Vertical => {
                style.flex_direction = FlexDirection::Column;
                style.width = Dimension::Percent(100.0);
                style.height = Dimension::Auto;
            }
            ScrollAxis::Horizontal => {
                style.flex_direction = FlexDirection::Row;
                style.height = Dimension::Percent(100.0);
                style.width = Dimension::Auto;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Dirty tracking
    // =========================================================================

    /// Mark a node's computed geometry stale and queue its subtree for the
    /// next pass.
    pub fn mark_dirty(&mut self, id: NodeId) {
        if let Some(data) = self.data_mut(id) {
            data.flags.insert(NodeFlags::STALE);
            if !data.flags.contains(NodeFlags::DIRTY) {
                data.flags.insert(NodeFlags::DIRTY);
                self.dirty.push(id);
            }
        }
    }

    /// Drain the queue of dirtied nodes. The `DIRTY` flag tracks queue
    /// membership and is cleared here, so a failed pass can re-queue its
    /// root; `STALE` stays set until a commit covers the node.
    pub(crate) fn take_dirty(&mut self) -> Vec<NodeId> {
        let drained = std::mem::take(&mut self.dirty);
        for id in &drained {
            if let Some(data) = self.data_mut(*id) {
                data.flags.remove(NodeFlags::DIRTY);
            }
        }
        drained
    }

    pub(crate) fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
