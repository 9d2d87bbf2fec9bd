//! Layout coordinator - the engine facade widget wrappers talk to.
//!
//! Decides when a pass runs, invokes the solver (or the percentage resolver
//! for legacy subtrees), commits results into the tree, and drives the scroll
//! content sizer's corrective pass.
//!
//! # Scheduling
//!
//! One backend resolves synchronously per mutation ([`ScheduleMode::Immediate`]):
//! every mutating call flushes before it returns. The other coalesces all
//! mutations within a tick into one pass executed on the next display-refresh
//! callback ([`ScheduleMode::Deferred`] + [`LayoutEngine::run_frame`]).
//!
//! # Concurrency
//!
//! Everything here is confined to the single UI-owning thread; background
//! work reaches the engine only through the host's hand-off queue, which is
//! an external boundary. There is no locking because there is no concurrent
//! mutation by design.

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::events::{EventHub, Subscription};
use crate::layout::{PassEntry, percent, solver};
use crate::mirror;
use crate::scroll::{ScrollEvent, Translation, content_size};
use crate::tree::{LayoutTree, NodeFlags, NodeId};
use crate::types::{
    ContainerKind, Dimension, Geometry, Point, ScheduleMode, ScrollAxis, Size, StyleKey,
    StyleValue,
};

/// Content extents closer than this are treated as unchanged and skip the
/// corrective pass.
const SIZER_EPSILON: f32 = 0.001;

// =============================================================================
// Pass summary
// =============================================================================

/// Outcome of one committed layout pass, delivered to pass observers.
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    /// Nodes whose geometry was committed by this pass.
    pub committed: Vec<NodeId>,
    /// Pass entries discarded because their node was removed while the pass
    /// was in flight.
    pub discarded: usize,
}

impl PassSummary {
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.discarded == 0
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The layout engine: style tree, pass scheduling, scrolling and mirroring.
///
/// Constructed once at the composition root and passed by reference to any
/// component needing layout services; there are no ambient statics.
#[derive(Debug)]
pub struct LayoutEngine {
    tree: LayoutTree,
    mode: ScheduleMode,
    viewport: Size,
    pass_pending: bool,
    pass_events: EventHub<PassSummary>,
}

impl LayoutEngine {
    pub fn new(mode: ScheduleMode) -> Self {
        Self {
            tree: LayoutTree::new(),
            mode,
            viewport: Size::ZERO,
            pass_pending: false,
            pass_events: EventHub::new(),
        }
    }

    /// The tree, for read-only inspection.
    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    // =========================================================================
    // Node lifecycle
    // =========================================================================

    /// Create a detached node. Geometry stays [`Error::Unresolved`] until the
    /// node is inserted and a pass covers it.
    pub fn create_node(&mut self, kind: ContainerKind) -> NodeId {
        self.tree.create(kind)
    }

    /// Append a child to a container and schedule a pass.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.tree.add_child(parent, child)?;
        self.hook_child_added(parent, child)?;
        self.schedule()
    }

    /// Insert a child at an index among the container's children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.tree.insert_child(parent, index, child)?;
        self.hook_child_added(parent, child)?;
        self.schedule()
    }

    fn hook_child_added(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        // Mirror propagation happens against the node the child actually
        // attached to (the content node of a scroll host).
        let attached_to = self.tree.parent_of(child)?.unwrap_or(parent);
        mirror::on_child_added(&mut self.tree, attached_to, child)
    }

    /// Remove a node and its subtree.
    ///
    /// Geometry is invalidated immediately; a pass already in flight for the
    /// subtree discards its results for these nodes instead of applying them.
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        let parent = self.tree.parent_of(node)?;
        self.tree.remove(node)?;
        if let Some(parent) = parent {
            self.tree.mark_dirty(parent);
        }
        self.schedule()
    }

    // =========================================================================
    // Style mutation
    // =========================================================================

    /// Validate and apply one style property.
    ///
    /// Fails with [`Error::Validation`] without touching prior state; on
    /// success marks the node (and, for distribution-affecting properties,
    /// its owner) dirty. In immediate mode the pass has completed by the time
    /// this returns.
    pub fn set_style(&mut self, node: NodeId, key: StyleKey, value: StyleValue) -> Result<()> {
        self.tree.get_mut(node)?.style.apply(key, value)?;
        self.tree.mark_dirty(node);
        if key.affects_siblings()
            && let Some(parent) = self.tree.parent_of(node)?
        {
            self.tree.mark_dirty(parent);
        }
        if key == StyleKey::Direction {
            let root = self.tree.root_of(node);
            mirror::refresh_subtree(&mut self.tree, root)?;
        }
        self.schedule()
    }

    /// Mark a node's subtree as needing a pass (the backend's per-node
    /// "style changed" channel).
    pub fn mark_dirty(&mut self, node: NodeId) -> Result<()> {
        if !self.tree.contains(node) {
            return Err(Error::UnknownNode(node));
        }
        self.tree.mark_dirty(node);
        self.schedule()
    }

    /// Last committed geometry. Fails loudly before the first covering pass.
    pub fn geometry(&self, node: NodeId) -> Result<Geometry> {
        self.tree.geometry(node)
    }

    /// Whether the committed geometry no longer reflects the current style.
    pub fn is_stale(&self, node: NodeId) -> Result<bool> {
        Ok(self.tree.get(node)?.flags.contains(NodeFlags::STALE))
    }

    /// Whether the node presents horizontally flipped (RTL mirroring).
    pub fn is_flipped(&self, node: NodeId) -> Result<bool> {
        mirror::is_flipped(&self.tree, node)
    }

    /// Route a subtree through the percentage resolver instead of the
    /// solver. Fallback for widget classes with no solver integration; the
    /// flag is honored on pass roots.
    pub fn set_legacy_layout(&mut self, node: NodeId, enabled: bool) -> Result<()> {
        self.tree
            .get_mut(node)?
            .flags
            .set(NodeFlags::LEGACY_LAYOUT, enabled);
        self.tree.mark_dirty(node);
        self.schedule()
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// Update the root viewport. Dirties every root.
    pub fn set_viewport(&mut self, viewport: Size) -> Result<()> {
        if viewport == self.viewport {
            return Ok(());
        }
        self.viewport = viewport;
        for root in self.tree.roots() {
            self.tree.mark_dirty(root);
        }
        self.schedule()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    // =========================================================================
    // Scrollable containers
    // =========================================================================

    /// Declare the scroll axis of a container, promoting it to a scroll host
    /// with a synthetic content node on first call.
    pub fn set_scroll_axis(&mut self, node: NodeId, axis: ScrollAxis) -> Result<()> {
        self.tree.enable_scroll_host(node, axis)?;
        mirror::refresh_container(&mut self.tree, node)?;
        self.schedule()
    }

    /// Derive the container's content extent from its children instead of a
    /// declared value. Promotes the node to a scroll host if needed.
    pub fn set_auto_size(&mut self, node: NodeId, enabled: bool) -> Result<()> {
        if !self.tree.get(node)?.is_scroll_host() {
            let axis = self
                .tree
                .get(node)?
                .scroll
                .as_ref()
                .map(|s| s.axis)
                .unwrap_or_default();
            self.tree.enable_scroll_host(node, axis)?;
            mirror::refresh_container(&mut self.tree, node)?;
        }
        self.tree
            .get_mut(node)?
            .flags
            .set(NodeFlags::AUTO_SIZE, enabled);
        self.tree.mark_dirty(node);
        self.schedule()
    }

    /// Subscribe to the node's cleaned scroll stream. The returned handle
    /// unsubscribes.
    pub fn on_scroll(
        &mut self,
        node: NodeId,
        callback: impl FnMut(&ScrollEvent) + 'static,
    ) -> Result<Subscription<ScrollEvent>> {
        Ok(self.tree.get_mut(node)?.scroll_mut().events.subscribe(callback))
    }

    /// Ingest one raw scroll report from the backend, keyed by node identity.
    ///
    /// Anomalies (negative components, duplicated callbacks) are corrected
    /// here and never surfaced as errors. When nothing is subscribed the
    /// report is dropped before any offset computation; this path runs at
    /// display frequency.
    pub fn push_raw_scroll(&mut self, node: NodeId, current: Point, previous: Point) -> Result<()> {
        let state = self.tree.get_mut(node)?.scroll_mut();
        if state.events.is_empty() {
            return Ok(());
        }
        let Some(event) = state.translator.translate(current, previous) else {
            return Ok(());
        };
        state.offset = event.absolute_offset;
        let hub = state.events.clone();
        hub.emit(&event);
        Ok(())
    }

    /// Programmatic scroll. Negative coordinates are out of range; targets
    /// past the scrollable extent clamp to it. The animation flag is
    /// forwarded to backend observers, not interpreted here.
    pub fn scroll_to(&mut self, node: NodeId, target: Point, animated: bool) -> Result<()> {
        for coordinate in [target.x, target.y] {
            if coordinate < 0.0 {
                return Err(Error::OutOfRange { coordinate });
            }
        }
        debug!(node = %node, ?target, animated, "scroll_to");

        let state = self.tree.get_mut(node)?.scroll_mut();
        let clamped = state.clamp(target);
        let previous = state.offset;
        state.offset = clamped;
        state.translator.reset();

        if !state.events.is_empty() {
            let event = ScrollEvent {
                translation: Translation {
                    dx: clamped.x - previous.x,
                    dy: clamped.y - previous.y,
                },
                absolute_offset: clamped,
            };
            let hub = state.events.clone();
            hub.emit(&event);
        }
        Ok(())
    }

    /// Scroll by a delta, clamped to the valid range. Returns whether any
    /// movement occurred.
    pub fn scroll_by(&mut self, node: NodeId, dx: f32, dy: f32) -> Result<bool> {
        let offset = self.scroll_offset(node)?;
        let target = {
            let state = self.tree.get_mut(node)?.scroll_mut();
            state.clamp(Point::new(offset.x + dx, offset.y + dy))
        };
        if target == offset {
            return Ok(false);
        }
        self.scroll_to(node, target, false)?;
        Ok(true)
    }

    /// Scroll with ancestor chaining: when the node is at its boundary, the
    /// nearest scrollable ancestor takes the delta instead.
    pub fn scroll_by_chained(&mut self, node: NodeId, dx: f32, dy: f32) -> Result<bool> {
        if self.scroll_by(node, dx, dy)? {
            return Ok(true);
        }
        let mut current = self.tree.parent_of(node)?;
        while let Some(ancestor) = current {
            if self.tree.get(ancestor)?.is_scroll_host() {
                return self.scroll_by_chained(ancestor, dx, dy);
            }
            current = self.tree.parent_of(ancestor)?;
        }
        Ok(false)
    }

    /// Scroll to the top edge (Y to zero, X preserved).
    pub fn scroll_to_top(&mut self, node: NodeId) -> Result<()> {
        let offset = self.scroll_offset(node)?;
        self.scroll_to(node, Point::new(offset.x, 0.0), false)
    }

    /// Scroll to the bottom edge (Y to max, X preserved).
    pub fn scroll_to_bottom(&mut self, node: NodeId) -> Result<()> {
        let offset = self.scroll_offset(node)?;
        let max = self.max_scroll(node)?;
        self.scroll_to(node, Point::new(offset.x, max.y), false)
    }

    /// Scroll to the leading edge (X to zero, Y preserved).
    pub fn scroll_to_start(&mut self, node: NodeId) -> Result<()> {
        let offset = self.scroll_offset(node)?;
        self.scroll_to(node, Point::new(0.0, offset.y), false)
    }

    /// Scroll to the trailing edge (X to max, Y preserved).
    pub fn scroll_to_end(&mut self, node: NodeId) -> Result<()> {
        let offset = self.scroll_offset(node)?;
        let max = self.max_scroll(node)?;
        self.scroll_to(node, Point::new(max.x, offset.y), false)
    }

    /// Current scroll offset (user state).
    pub fn scroll_offset(&self, node: NodeId) -> Result<Point> {
        Ok(self
            .tree
            .get(node)?
            .scroll
            .as_ref()
            .map(|s| s.offset)
            .unwrap_or(Point::ZERO))
    }

    /// Maximum scroll offset, computed by the last pass.
    pub fn max_scroll(&self, node: NodeId) -> Result<Point> {
        Ok(self
            .tree
            .get(node)?
            .scroll
            .as_ref()
            .map(|s| s.max_offset)
            .unwrap_or(Point::ZERO))
    }

    // =========================================================================
    // Pass execution
    // =========================================================================

    /// Observe committed passes (the backend's "layout pass completed"
    /// channel).
    pub fn on_pass_complete(
        &mut self,
        callback: impl FnMut(&PassSummary) + 'static,
    ) -> Subscription<PassSummary> {
        self.pass_events.subscribe(callback)
    }

    /// Display-refresh callback: run the coalesced pass for everything
    /// dirtied since the previous frame. No-op when nothing is dirty.
    pub fn run_frame(&mut self) -> Result<PassSummary> {
        if self.pass_pending || self.tree.has_dirty() {
            self.flush()
        } else {
            Ok(PassSummary::default())
        }
    }

    fn schedule(&mut self) -> Result<()> {
        match self.mode {
            ScheduleMode::Immediate => self.flush().map(|_| ()),
            ScheduleMode::Deferred => {
                self.pass_pending = true;
                trace!("pass deferred to next frame");
                Ok(())
            }
        }
    }

    /// Execute one pass over every dirty subtree and commit the results.
    fn flush(&mut self) -> Result<PassSummary> {
        let dirty = self.tree.take_dirty();
        self.pass_pending = false;
        if dirty.is_empty() {
            return Ok(PassSummary::default());
        }

        // Group the dirt by pass root; a node removed after dirtying is
        // silently gone.
        let mut roots: Vec<NodeId> = Vec::new();
        for node in dirty {
            if !self.tree.contains(node) {
                continue;
            }
            let root = self.tree.root_of(node);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        debug!(roots = roots.len(), "layout pass");

        let mut summary = PassSummary::default();
        for (i, root) in roots.iter().enumerate() {
            if let Err(err) = self.resolve_root(*root, &mut summary) {
                // Re-queue everything not yet processed and retry on the
                // next pass; the tree keeps its last good geometry.
                for pending in &roots[i..] {
                    self.tree.mark_dirty(*pending);
                }
                return Err(err);
            }
        }

        if !summary.is_empty() {
            let hub = self.pass_events.clone();
            hub.emit(&summary);
        }
        Ok(summary)
    }

    fn resolve_root(&mut self, root: NodeId, summary: &mut PassSummary) -> Result<()> {
        let legacy = self
            .tree
            .get(root)?
            .flags
            .contains(NodeFlags::LEGACY_LAYOUT);

        let entries: Vec<PassEntry> = if legacy {
            percent::resolve_subtree(&self.tree, root, self.viewport)?
                .into_iter()
                .map(|(node, geometry)| PassEntry {
                    node,
                    geometry,
                    content_size: geometry.size(),
                })
                .collect()
        } else {
            solver::compute(&self.tree, root, self.viewport)?.entries
        };

        self.commit(&entries, None, summary);
        self.run_sizer(root, summary)?;
        self.update_scroll_bounds(root)?;
        Ok(())
    }

    /// Copy pass output into the tree, clearing stale/dirty markers. Entries
    /// whose node was removed while the pass was in flight are discarded: no
    /// geometry write ever lands on a destroyed (or recycled) slot.
    fn commit(&mut self, entries: &[PassEntry], skip: Option<NodeId>, summary: &mut PassSummary) {
        for entry in entries {
            if Some(entry.node) == skip {
                continue;
            }
            match self.tree.data_mut(entry.node) {
                Some(data) => {
                    data.geometry = Some(entry.geometry);
                    data.flags.remove(NodeFlags::DIRTY | NodeFlags::STALE);
                    summary.committed.push(entry.node);
                }
                None => {
                    warn!(node = %entry.node, "discarding pass result for removed node");
                    summary.discarded += 1;
                }
            }
        }
    }

    /// The scroll content sizer's corrective pass.
    ///
    /// Runs strictly after the flex pass that produced the child geometry it
    /// reads, and applies its result through a second, subtree-restricted
    /// pass. Folding the two together would re-dirty the subtree mid-read
    /// and loop.
    fn run_sizer(&mut self, root: NodeId, summary: &mut PassSummary) -> Result<()> {
        for host in self.collect_auto_size_hosts(root)? {
            let (axis, content) = {
                let data = self.tree.get(host)?;
                let axis = data.scroll.as_ref().map(|s| s.axis).unwrap_or_default();
                let Some(content) = data.content else {
                    continue;
                };
                (axis, content)
            };

            let extent = content_size::measure(&self.tree, host, axis)?;
            let host_geometry = self.tree.geometry(host)?;
            let committed = self
                .tree
                .geometry(content)
                .map(|g| g.extent_along(axis))
                .unwrap_or(0.0);

            // Cross axis: always pinned to the host's own viewport extent.
            let cross_extent = host_geometry.size().along(axis.cross());
            {
                let style = &mut self.tree.get_mut(content)?.style;
                match axis {
                    ScrollAxis::Vertical => {
                        style.height = Dimension::Points(extent);
                        style.width = Dimension::Points(cross_extent);
                    }
                    ScrollAxis::Horizontal => {
                        style.width = Dimension::Points(extent);
                        style.height = Dimension::Points(cross_extent);
                    }
                }
            }

            if (extent - committed).abs() > SIZER_EPSILON {
                trace!(host = %host, extent, "content extent corrective pass");
                let corrective = solver::compute(&self.tree, host, host_geometry.size())?;
                // The host's own placement belongs to the outer pass; only
                // the content subtree takes the correction.
                self.commit(&corrective.entries, Some(host), summary);
            }
        }
        Ok(())
    }

    fn collect_auto_size_hosts(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut hosts = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let data = self.tree.get(node)?;
            if data.is_scroll_host() && data.flags.contains(NodeFlags::AUTO_SIZE) {
                hosts.push(node);
            }
            stack.extend(data.children.iter().copied());
        }
        Ok(hosts)
    }

    /// Refresh scroll bounds from committed geometry and re-clamp offsets.
    fn update_scroll_bounds(&mut self, root: NodeId) -> Result<()> {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let data = self.tree.get(node)?;
            stack.extend(data.children.iter().copied());
            if !data.is_scroll_host() {
                continue;
            }
            let Some(content) = data.content else {
                continue;
            };
            let (Ok(host_geometry), Ok(content_geometry)) =
                (self.tree.geometry(node), self.tree.geometry(content))
            else {
                continue;
            };
            let max = Point::new(
                content_geometry.width - host_geometry.width,
                content_geometry.height - host_geometry.height,
            );
            self.tree.get_mut(node)?.scroll_mut().set_bounds(max);
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn immediate() -> LayoutEngine {
        let mut engine = LayoutEngine::new(ScheduleMode::Immediate);
        engine.set_viewport(Size::new(320.0, 480.0)).unwrap();
        engine
    }

    fn sized_root(engine: &mut LayoutEngine, width: f32, height: f32) -> NodeId {
        let root = engine.create_node(ContainerKind::Flex);
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(width).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(height).into())
            .unwrap();
        root
    }

    #[test]
    fn test_geometry_fails_before_first_pass() {
        let mut engine = immediate();
        let node = engine.create_node(ContainerKind::Flex);
        assert!(matches!(
            engine.geometry(node),
            Err(Error::Unresolved(_))
        ));
    }

    #[test]
    fn test_immediate_mode_resolves_at_mutation() {
        let mut engine = immediate();
        let root = sized_root(&mut engine, 100.0, 40.0);
        let geometry = engine.geometry(root).unwrap();
        assert_eq!(geometry.width, 100.0);
        assert_eq!(geometry.height, 40.0);
        assert!(!engine.is_stale(root).unwrap());
    }

    #[test]
    fn test_validation_failure_leaves_tree_untouched() {
        let mut engine = immediate();
        let root = sized_root(&mut engine, 100.0, 40.0);
        let before = engine.geometry(root).unwrap();

        let err = engine
            .set_style(root, StyleKey::FlexGrow, Dimension::Percent(50.0).into())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(engine.geometry(root).unwrap(), before);
        assert!(!engine.is_stale(root).unwrap());
    }

    #[test]
    fn test_deferred_mode_coalesces_into_one_frame() {
        let mut engine = LayoutEngine::new(ScheduleMode::Deferred);
        engine.set_viewport(Size::new(320.0, 480.0)).unwrap();
        let root = engine.create_node(ContainerKind::Flex);
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(100.0).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(40.0).into())
            .unwrap();

        // Nothing committed until the frame callback.
        assert!(matches!(engine.geometry(root), Err(Error::Unresolved(_))));
        assert!(engine.is_stale(root).unwrap());

        let summary = engine.run_frame().unwrap();
        assert_eq!(summary.committed.iter().filter(|n| **n == root).count(), 1);
        assert_eq!(engine.geometry(root).unwrap().width, 100.0);

        // A clean frame does nothing.
        assert!(engine.run_frame().unwrap().is_empty());
    }

    #[test]
    fn test_mutation_marks_stale_until_pass() {
        let mut engine = LayoutEngine::new(ScheduleMode::Deferred);
        engine.set_viewport(Size::new(320.0, 480.0)).unwrap();
        let root = engine.create_node(ContainerKind::Flex);
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(100.0).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(10.0).into())
            .unwrap();
        engine.run_frame().unwrap();
        assert!(!engine.is_stale(root).unwrap());

        engine
            .set_style(root, StyleKey::Width, Dimension::Points(120.0).into())
            .unwrap();
        assert!(engine.is_stale(root).unwrap());
        engine.run_frame().unwrap();
        assert!(!engine.is_stale(root).unwrap());
        assert_eq!(engine.geometry(root).unwrap().width, 120.0);
    }

    #[test]
    fn test_removed_node_is_excluded_from_deferred_pass() {
        let mut engine = LayoutEngine::new(ScheduleMode::Deferred);
        engine.set_viewport(Size::new(320.0, 480.0)).unwrap();
        let root = engine.create_node(ContainerKind::Flex);
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(100.0).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(50.0).into())
            .unwrap();
        let child = engine.create_node(ContainerKind::Flex);
        engine.add_child(root, child).unwrap();
        engine
            .set_style(child, StyleKey::Height, Dimension::Points(10.0).into())
            .unwrap();

        // Remove while the pass is still pending.
        engine.remove_node(child).unwrap();
        let summary = engine.run_frame().unwrap();

        assert!(!summary.committed.contains(&child));
        assert!(matches!(
            engine.geometry(child),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn test_child_distribution_keys_dirty_the_parent() {
        let mut engine = immediate();
        let root = sized_root(&mut engine, 300.0, 40.0);
        engine
            .set_style(
                root,
                StyleKey::FlexDirection,
                StyleValue::FlexDirection(crate::types::FlexDirection::Row),
            )
            .unwrap();
        let a = engine.create_node(ContainerKind::Flex);
        let b = engine.create_node(ContainerKind::Flex);
        engine.add_child(root, a).unwrap();
        engine.add_child(root, b).unwrap();
        engine.set_style(a, StyleKey::FlexGrow, 1.0.into()).unwrap();
        engine.set_style(b, StyleKey::FlexGrow, 1.0.into()).unwrap();
        assert_eq!(engine.geometry(a).unwrap().width, 150.0);

        // Changing one child's weight redistributes its sibling.
        engine.set_style(a, StyleKey::FlexGrow, 3.0.into()).unwrap();
        assert_eq!(engine.geometry(a).unwrap().width, 225.0);
        assert_eq!(engine.geometry(b).unwrap().width, 75.0);
    }

    #[test]
    fn test_legacy_subtree_uses_percentage_resolver() {
        let mut engine = immediate();
        let root = engine.create_node(ContainerKind::Absolute);
        engine.set_legacy_layout(root, true).unwrap();
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(200.0).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(100.0).into())
            .unwrap();
        let child = engine.create_node(ContainerKind::Absolute);
        engine.add_child(root, child).unwrap();
        engine
            .set_style(child, StyleKey::Width, Dimension::Percent(50.0).into())
            .unwrap();
        engine
            .set_style(child, StyleKey::Height, Dimension::Points(10.0).into())
            .unwrap();

        assert_eq!(engine.geometry(child).unwrap().width, 100.0);

        engine
            .set_style(root, StyleKey::Width, Dimension::Points(300.0).into())
            .unwrap();
        assert_eq!(engine.geometry(child).unwrap().width, 150.0);
    }

    #[test]
    fn test_cyclic_percentage_propagates_and_keeps_last_geometry() {
        let mut engine = immediate();
        // Root width is explicit, height stays auto (content-derived).
        let root = engine.create_node(ContainerKind::Absolute);
        engine.set_legacy_layout(root, true).unwrap();
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(200.0).into())
            .unwrap();
        let child = engine.create_node(ContainerKind::Absolute);
        engine.add_child(root, child).unwrap();
        engine
            .set_style(child, StyleKey::Height, Dimension::Points(40.0).into())
            .unwrap();
        let good = engine.geometry(root).unwrap();

        // A child percentage against the auto-sized parent cannot terminate;
        // the pass triggered by the mutation reports it to the caller.
        let err = engine
            .set_style(child, StyleKey::Height, Dimension::Percent(50.0).into())
            .unwrap_err();
        assert!(matches!(err, Error::CyclicPercentage(_)));

        // The tree keeps its last good geometry.
        assert_eq!(engine.geometry(root).unwrap(), good);
        assert_eq!(engine.geometry(child).unwrap().height, 40.0);
    }

    #[test]
    fn test_auto_size_scroll_content_and_bounds() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();
        engine.set_auto_size(host, true).unwrap();
        engine
            .set_style(host, StyleKey::PaddingBottom, 10.0.into())
            .unwrap();

        for extent in [50.0, 40.0] {
            let child = engine.create_node(ContainerKind::Flex);
            engine.add_child(host, child).unwrap();
            engine
                .set_style(child, StyleKey::Height, Dimension::Points(extent).into())
                .unwrap();
        }

        // Children at offsets 0 and 50, extents 50 and 40, trailing padding
        // 10: content extent 100, viewport 50, so 50 points of scroll.
        let max = engine.max_scroll(host).unwrap();
        assert!((max.y - 50.0).abs() < 0.5);
        assert_eq!(max.x, 0.0);
    }

    #[test]
    fn test_auto_size_floors_at_viewport() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 200.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();
        engine.set_auto_size(host, true).unwrap();

        let child = engine.create_node(ContainerKind::Flex);
        engine.add_child(host, child).unwrap();
        engine
            .set_style(child, StyleKey::Height, Dimension::Points(30.0).into())
            .unwrap();

        // Content never shrinks below the viewport: nothing to scroll.
        assert_eq!(engine.max_scroll(host).unwrap(), Point::ZERO);
    }

    #[test]
    fn test_scroll_to_validates_and_clamps() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();
        engine.set_auto_size(host, true).unwrap();
        let child = engine.create_node(ContainerKind::Flex);
        engine.add_child(host, child).unwrap();
        engine
            .set_style(child, StyleKey::Height, Dimension::Points(150.0).into())
            .unwrap();

        assert!(matches!(
            engine.scroll_to(host, Point::new(0.0, -1.0), false),
            Err(Error::OutOfRange { .. })
        ));

        engine.scroll_to(host, Point::new(0.0, 500.0), false).unwrap();
        let offset = engine.scroll_offset(host).unwrap();
        assert!((offset.y - 100.0).abs() < 0.5); // clamped to max
    }

    #[test]
    fn test_scroll_to_edges_preserve_other_axis() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();
        engine.set_auto_size(host, true).unwrap();
        let child = engine.create_node(ContainerKind::Flex);
        engine.add_child(host, child).unwrap();
        engine
            .set_style(child, StyleKey::Height, Dimension::Points(150.0).into())
            .unwrap();

        engine.scroll_to_bottom(host).unwrap();
        assert!((engine.scroll_offset(host).unwrap().y - 100.0).abs() < 0.5);

        engine.scroll_to_top(host).unwrap();
        assert_eq!(engine.scroll_offset(host).unwrap().y, 0.0);
    }

    #[test]
    fn test_scroll_events_deduplicated_through_engine() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();

        let events: Rc<RefCell<Vec<ScrollEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let _sub = engine
            .on_scroll(host, move |ev| sink.borrow_mut().push(*ev))
            .unwrap();

        let current = Point::new(0.0, 100.0);
        let previous = Point::new(0.0, 90.0);
        engine.push_raw_scroll(host, current, previous).unwrap();
        engine.push_raw_scroll(host, current, previous).unwrap();

        let seen = events.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].translation.dy, 10.0);
        assert_eq!(seen[0].absolute_offset.y, 100.0);
    }

    #[test]
    fn test_unobserved_scroll_reports_do_no_work() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();

        engine
            .push_raw_scroll(host, Point::new(0.0, 30.0), Point::new(0.0, 0.0))
            .unwrap();
        // Dropped before offset bookkeeping.
        assert_eq!(engine.scroll_offset(host).unwrap(), Point::ZERO);
    }

    #[test]
    fn test_unsubscribe_stops_scroll_stream() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();

        let count = Rc::new(Cell::new(0));
        let sink = count.clone();
        let sub = engine
            .on_scroll(host, move |_| sink.set(sink.get() + 1))
            .unwrap();

        engine
            .push_raw_scroll(host, Point::new(0.0, 10.0), Point::new(0.0, 0.0))
            .unwrap();
        sub.unsubscribe();
        engine
            .push_raw_scroll(host, Point::new(0.0, 20.0), Point::new(0.0, 10.0))
            .unwrap();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_scroll_chaining_to_ancestor() {
        let mut engine = immediate();
        let outer = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(outer, ScrollAxis::Vertical).unwrap();
        engine.set_auto_size(outer, true).unwrap();

        let inner = engine.create_node(ContainerKind::Flex);
        engine.add_child(outer, inner).unwrap();
        engine
            .set_style(inner, StyleKey::Width, Dimension::Points(100.0).into())
            .unwrap();
        engine
            .set_style(inner, StyleKey::Height, Dimension::Points(80.0).into())
            .unwrap();
        engine.set_scroll_axis(inner, ScrollAxis::Vertical).unwrap();
        engine.set_auto_size(inner, true).unwrap();

        let leaf = engine.create_node(ContainerKind::Flex);
        engine.add_child(inner, leaf).unwrap();
        engine
            .set_style(leaf, StyleKey::Height, Dimension::Points(100.0).into())
            .unwrap();

        // Inner can take 20 points, outer absorbs the rest.
        assert!(engine.scroll_by_chained(leaf, 0.0, 20.0).unwrap());
        assert!((engine.scroll_offset(inner).unwrap().y - 20.0).abs() < 0.5);

        assert!(engine.scroll_by_chained(leaf, 0.0, 10.0).unwrap());
        assert!(engine.scroll_offset(outer).unwrap().y > 0.0);
    }

    #[test]
    fn test_pass_observer_sees_committed_nodes() {
        let mut engine = LayoutEngine::new(ScheduleMode::Deferred);
        engine.set_viewport(Size::new(320.0, 480.0)).unwrap();
        let seen: Rc<RefCell<Vec<NodeId>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = engine.on_pass_complete(move |summary| {
            sink.borrow_mut().extend(summary.committed.iter().copied());
        });

        let root = engine.create_node(ContainerKind::Flex);
        engine
            .set_style(root, StyleKey::Width, Dimension::Points(10.0).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(10.0).into())
            .unwrap();
        engine.run_frame().unwrap();

        assert!(seen.borrow().contains(&root));
    }

    #[test]
    fn test_mirroring_through_engine() {
        let mut engine = immediate();
        let host = sized_root(&mut engine, 100.0, 50.0);
        engine.set_scroll_axis(host, ScrollAxis::Vertical).unwrap();
        engine
            .set_style(
                host,
                StyleKey::Direction,
                StyleValue::Direction(crate::types::Direction::Rtl),
            )
            .unwrap();
        assert!(engine.is_flipped(host).unwrap());

        // A child added after mirroring is flipped by the add hook.
        let late = engine.create_node(ContainerKind::Flex);
        engine.add_child(host, late).unwrap();
        assert!(engine.is_flipped(late).unwrap());

        // Authoring coordinates are untouched by the flip.
        engine
            .set_style(late, StyleKey::Height, Dimension::Points(10.0).into())
            .unwrap();
        assert_eq!(engine.geometry(late).unwrap().x, 0.0);

        // Flipping back to LTR clears both.
        engine
            .set_style(
                host,
                StyleKey::Direction,
                StyleValue::Direction(crate::types::Direction::Ltr),
            )
            .unwrap();
        assert!(!engine.is_flipped(host).unwrap());
        assert!(!engine.is_flipped(late).unwrap());
    }

    #[test]
    fn test_viewport_change_relayouts_roots() {
        let mut engine = immediate();
        let root = engine.create_node(ContainerKind::Flex);
        engine
            .set_style(root, StyleKey::Width, Dimension::Percent(100.0).into())
            .unwrap();
        engine
            .set_style(root, StyleKey::Height, Dimension::Points(10.0).into())
            .unwrap();
        assert_eq!(engine.geometry(root).unwrap().width, 320.0);

        engine.set_viewport(Size::new(480.0, 320.0)).unwrap();
        assert_eq!(engine.geometry(root).unwrap().width, 480.0);
    }
}
