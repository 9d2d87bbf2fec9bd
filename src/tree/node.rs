//! StyleNode - the per-view style record and its tree bookkeeping.
//!
//! Every view gets one [`StyleNode`] for its entire lifetime. Properties are
//! plain typed fields mutated through [`StyleNode::apply`], which validates
//! each value against the domain of its key before touching prior state.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::scroll::ScrollState;
use crate::tree::NodeId;
use crate::types::{
    AlignContent, AlignItems, AlignSelf, ContainerKind, Dimension, Direction, FlexDirection,
    FlexWrap, Geometry, JustifyContent, PositionType, StyleKey, StyleValue,
};

// =============================================================================
// Edges
// =============================================================================

/// Per-edge values (left/top/right/bottom).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T> {
    pub left: T,
    pub top: T,
    pub right: T,
    pub bottom: T,
}

impl<T: Copy> Edges<T> {
    pub const fn uniform(value: T) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

// =============================================================================
// StyleNode
// =============================================================================

/// Declarative style attributes of one view.
///
/// # Property categories
///
/// - **Placement (5)**: position, left, top, right, bottom
/// - **Dimensions (6)**: width, height, min/max width/height
/// - **Spacing (8)**: margin (4), padding (4)
/// - **Flex item (4)**: flexGrow, flexShrink, flexBasis, alignSelf
/// - **Flex container (5)**: flexDirection, flexWrap, justifyContent,
///   alignItems, alignContent
/// - **Ambient (1)**: direction
#[derive(Debug, Clone, PartialEq)]
pub struct StyleNode {
    pub position: PositionType,
    pub inset: Edges<Dimension>,

    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub max_width: Dimension,
    pub min_height: Dimension,
    pub max_height: Dimension,

    pub margin: Edges<f32>,
    pub padding: Edges<f32>,

    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub align_self: AlignSelf,

    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,

    pub direction: Direction,
}

impl Default for StyleNode {
    fn default() -> Self {
        Self {
            position: PositionType::Relative,
            inset: Edges::uniform(Dimension::Auto),
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            max_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_height: Dimension::Auto,
            margin: Edges::uniform(0.0),
            padding: Edges::uniform(0.0),
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            align_self: AlignSelf::Auto,
            flex_direction: FlexDirection::Column,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_content: AlignContent::Stretch,
            direction: Direction::Inherit,
        }
    }
}

impl StyleNode {
    /// Apply one validated property mutation.
    ///
    /// Fails with [`Error::Validation`] when the value does not fit the key's
    /// domain; on failure no field is touched.
    pub fn apply(&mut self, key: StyleKey, value: StyleValue) -> Result<()> {
        use StyleKey as K;
        use StyleValue as V;

        match (key, value) {
            (K::Position, V::Position(v)) => self.position = v,

            (K::Left, V::Dimension(v)) => self.inset.left = Self::checked_dim(key, v)?,
            (K::Top, V::Dimension(v)) => self.inset.top = Self::checked_dim(key, v)?,
            (K::Right, V::Dimension(v)) => self.inset.right = Self::checked_dim(key, v)?,
            (K::Bottom, V::Dimension(v)) => self.inset.bottom = Self::checked_dim(key, v)?,

            (K::Width, V::Dimension(v)) => self.width = Self::checked_dim(key, v)?,
            (K::Height, V::Dimension(v)) => self.height = Self::checked_dim(key, v)?,
            (K::MinWidth, V::Dimension(v)) => self.min_width = Self::checked_dim(key, v)?,
            (K::MaxWidth, V::Dimension(v)) => self.max_width = Self::checked_dim(key, v)?,
            (K::MinHeight, V::Dimension(v)) => self.min_height = Self::checked_dim(key, v)?,
            (K::MaxHeight, V::Dimension(v)) => self.max_height = Self::checked_dim(key, v)?,

            (K::MarginLeft, V::Number(v)) => self.margin.left = Self::checked_num(key, v)?,
            (K::MarginTop, V::Number(v)) => self.margin.top = Self::checked_num(key, v)?,
            (K::MarginRight, V::Number(v)) => self.margin.right = Self::checked_num(key, v)?,
            (K::MarginBottom, V::Number(v)) => self.margin.bottom = Self::checked_num(key, v)?,

            (K::PaddingLeft, V::Number(v)) => self.padding.left = Self::checked_nonneg(key, v)?,
            (K::PaddingTop, V::Number(v)) => self.padding.top = Self::checked_nonneg(key, v)?,
            (K::PaddingRight, V::Number(v)) => self.padding.right = Self::checked_nonneg(key, v)?,
            (K::PaddingBottom, V::Number(v)) => {
                self.padding.bottom = Self::checked_nonneg(key, v)?
            }

            (K::FlexGrow, V::Number(v)) => self.flex_grow = Self::checked_nonneg(key, v)?,
            (K::FlexShrink, V::Number(v)) => self.flex_shrink = Self::checked_nonneg(key, v)?,
            (K::FlexBasis, V::Dimension(v)) => self.flex_basis = Self::checked_dim(key, v)?,

            (K::FlexDirection, V::FlexDirection(v)) => self.flex_direction = v,
            (K::FlexWrap, V::FlexWrap(v)) => self.flex_wrap = v,
            (K::JustifyContent, V::JustifyContent(v)) => self.justify_content = v,
            (K::AlignItems, V::AlignItems(v)) => self.align_items = v,
            (K::AlignContent, V::AlignContent(v)) => self.align_content = v,
            (K::AlignSelf, V::AlignSelf(v)) => self.align_self = v,
            (K::Direction, V::Direction(v)) => self.direction = v,

            (key, value) => {
                return Err(Error::validation(
                    key,
                    format!("value {value:?} does not match the property's domain"),
                ));
            }
        }
        Ok(())
    }

    fn checked_dim(key: StyleKey, value: Dimension) -> Result<Dimension> {
        match value {
            Dimension::Points(n) | Dimension::Percent(n) if !n.is_finite() => {
                Err(Error::validation(key, "expected a finite value"))
            }
            other => Ok(other),
        }
    }

    fn checked_num(key: StyleKey, value: f32) -> Result<f32> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::validation(key, "expected a finite number"))
        }
    }

    fn checked_nonneg(key: StyleKey, value: f32) -> Result<f32> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Error::validation(key, "expected a non-negative number"))
        }
    }
}

// =============================================================================
// Node flags
// =============================================================================

bitflags! {
    /// Per-node state flags, packed for cheap copy and comparison.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Subtree needs a layout pass.
        const DIRTY = 1 << 0;
        /// Committed geometry no longer reflects the current style.
        const STALE = 1 << 1;
        /// Node is a scrollable container owning a content node.
        const SCROLL_HOST = 1 << 2;
        /// Scrollable content extent derived from children.
        const AUTO_SIZE = 1 << 3;
        /// Horizontal flip transform currently applied (RTL mirroring).
        const FLIPPED = 1 << 4;
        /// Subtree resolved by the percentage resolver, not the solver.
        const LEGACY_LAYOUT = 1 << 5;
        /// Synthetic content node owned by a scroll host.
        const CONTENT_NODE = 1 << 6;
    }
}

// =============================================================================
// NodeData
// =============================================================================

/// Everything the tree owns for one live node.
#[derive(Debug)]
pub struct NodeData {
    pub style: StyleNode,
    pub kind: ContainerKind,
    pub flags: NodeFlags,

    /// Non-owning back-reference, for percentage and ambient-direction
    /// lookups only.
    pub parent: Option<NodeId>,
    /// Exclusively owned, ordered children. Order drives flex distribution
    /// and paint order.
    pub children: Vec<NodeId>,
    /// Synthetic content node wrapping all user-added children of a scroll
    /// host.
    pub content: Option<NodeId>,

    /// Last committed geometry; `None` until the first pass covers the node.
    pub geometry: Option<Geometry>,

    /// Scroll runtime state, created lazily on first use.
    pub scroll: Option<Box<ScrollState>>,
}

impl NodeData {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            style: StyleNode::default(),
            kind,
            flags: NodeFlags::empty(),
            parent: None,
            children: Vec::new(),
            content: None,
            geometry: None,
            scroll: None,
        }
    }

    /// Whether this node is a scrollable container.
    #[inline]
    pub fn is_scroll_host(&self) -> bool {
        self.flags.contains(NodeFlags::SCROLL_HOST)
    }

    /// Whether this node is a synthetic content node.
    #[inline]
    pub fn is_content_node(&self) -> bool {
        self.flags.contains(NodeFlags::CONTENT_NODE)
    }

    /// The scroll state, creating it on first access.
    pub fn scroll_mut(&mut self) -> &mut ScrollState {
        self.scroll.get_or_insert_with(Default::default)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = StyleNode::default();
        assert_eq!(style.position, PositionType::Relative);
        assert_eq!(style.flex_shrink, 1.0);
        assert_eq!(style.flex_grow, 0.0);
        assert_eq!(style.width, Dimension::Auto);
        assert_eq!(style.flex_direction, FlexDirection::Column);
        assert_eq!(style.direction, Direction::Inherit);
    }

    #[test]
    fn test_apply_dimension() {
        let mut style = StyleNode::default();
        style
            .apply(StyleKey::Width, Dimension::Percent(50.0).into())
            .unwrap();
        assert_eq!(style.width, Dimension::Percent(50.0));
    }

    #[test]
    fn test_apply_rejects_wrong_domain() {
        let mut style = StyleNode::default();
        // flexGrow takes a bare number, not a dimension
        let err = style
            .apply(StyleKey::FlexGrow, Dimension::Percent(50.0).into())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        // prior state untouched
        assert_eq!(style.flex_grow, 0.0);
    }

    #[test]
    fn test_apply_rejects_negative_flex_factors() {
        let mut style = StyleNode::default();
        assert!(style.apply(StyleKey::FlexGrow, (-1.0).into()).is_err());
        assert!(style.apply(StyleKey::FlexShrink, (-0.5).into()).is_err());
        assert!(style.apply(StyleKey::PaddingLeft, (-2.0).into()).is_err());
        // negative margins are legal
        assert!(style.apply(StyleKey::MarginLeft, (-2.0).into()).is_ok());
        assert_eq!(style.margin.left, -2.0);
    }

    #[test]
    fn test_apply_rejects_non_finite() {
        let mut style = StyleNode::default();
        assert!(
            style
                .apply(
                    StyleKey::Width,
                    StyleValue::Dimension(Dimension::Points(f32::NAN))
                )
                .is_err()
        );
        assert!(
            style
                .apply(StyleKey::MarginTop, f32::INFINITY.into())
                .is_err()
        );
        assert_eq!(style.width, Dimension::Auto);
        assert_eq!(style.margin.top, 0.0);
    }

    #[test]
    fn test_apply_enum_keys() {
        let mut style = StyleNode::default();
        style
            .apply(
                StyleKey::FlexDirection,
                StyleValue::FlexDirection(FlexDirection::RowReverse),
            )
            .unwrap();
        assert_eq!(style.flex_direction, FlexDirection::RowReverse);
        assert!(style.flex_direction.is_row());
        assert!(style.flex_direction.is_reverse());
    }
}
