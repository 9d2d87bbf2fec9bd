//! Core types for viewflex.
//!
//! These types define the vocabulary that everything builds on: style values,
//! flex enums, and resolved geometry. They flow from the widget wrappers
//! through the layout pipeline and back out to the rendering backends.

use std::fmt;
use std::str::FromStr;

// =============================================================================
// Dimension - Supports absolute, percentage and auto values
// =============================================================================

/// A dimension value that can be absolute (points), percentage, or auto.
///
/// - `Auto`: size derived from content or context
/// - `Points(n)`: absolute value in device-independent points
/// - `Percent(n)`: percentage of the parent's corresponding extent (0-100)
///
/// # Examples
///
/// ```
/// use viewflex::types::Dimension;
///
/// let width = Dimension::Points(50.0);     // 50 points
/// let height = Dimension::Percent(100.0);  // full parent height
/// let auto = Dimension::Auto;              // content-determined
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Size derived from content or context.
    #[default]
    Auto,
    /// Absolute size in device-independent points.
    Points(f32),
    /// Percentage of the parent's corresponding extent (0-100).
    Percent(f32),
}

impl Dimension {
    /// Resolve against a parent extent. `Auto` resolves to `None`.
    #[inline]
    pub fn resolve(self, basis: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Points(n) => Some(n),
            Self::Percent(p) => Some(basis * p / 100.0),
        }
    }

    /// Whether this dimension references the parent extent.
    #[inline]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Whether this dimension is content/context derived.
    #[inline]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Self::Points(value)
    }
}

/// Parse the scripting-surface string forms: `"auto"`, `"50%"`, `"12.5"`.
impl FromStr for Dimension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        if let Some(pct) = s.strip_suffix('%') {
            let value: f32 = pct.trim().parse().map_err(|_| ())?;
            if value.is_finite() {
                return Ok(Self::Percent(value));
            }
            return Err(());
        }
        let value: f32 = s.parse().map_err(|_| ())?;
        if value.is_finite() {
            Ok(Self::Points(value))
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Points(n) => write!(f, "{n}"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

// =============================================================================
// Geometry - Resolved layout output
// =============================================================================

/// A point in the parent's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Exact bit-pattern equality, used where float noise must not compare
    /// equal-by-epsilon (duplicate scroll report suppression).
    #[inline]
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

/// A width/height pair in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Extent along the given scroll axis.
    #[inline]
    pub const fn along(&self, axis: ScrollAxis) -> f32 {
        match axis {
            ScrollAxis::Vertical => self.height,
            ScrollAxis::Horizontal => self.width,
        }
    }
}

/// Resolved geometry for one node, relative to its parent's origin.
///
/// Valid only after a layout pass has covered the node; the owning tree slot
/// carries a stale marker that is set on any style mutation and cleared only
/// by a completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Offset along the given scroll axis.
    #[inline]
    pub const fn offset_along(&self, axis: ScrollAxis) -> f32 {
        match axis {
            ScrollAxis::Vertical => self.y,
            ScrollAxis::Horizontal => self.x,
        }
    }

    /// Extent along the given scroll axis.
    #[inline]
    pub const fn extent_along(&self, axis: ScrollAxis) -> f32 {
        match axis {
            ScrollAxis::Vertical => self.height,
            ScrollAxis::Horizontal => self.width,
        }
    }
}

// =============================================================================
// Flex enums
// =============================================================================

/// Position type: normal flow or out-of-flow absolute placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Check if this is a reverse direction.
    pub const fn is_reverse(&self) -> bool {
        matches!(self, Self::ColumnReverse | Self::RowReverse)
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Justify content (main axis distribution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align items (cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Align self (item override for align items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignSelf {
    #[default]
    Auto,
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

impl AlignSelf {
    /// Convert to AlignItems, returning None if Auto.
    pub const fn to_align_items(&self) -> Option<AlignItems> {
        match self {
            Self::Auto => None,
            Self::Stretch => Some(AlignItems::Stretch),
            Self::FlexStart => Some(AlignItems::FlexStart),
            Self::Center => Some(AlignItems::Center),
            Self::FlexEnd => Some(AlignItems::FlexEnd),
            Self::Baseline => Some(AlignItems::Baseline),
        }
    }
}

/// Align content (multi-line cross axis distribution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
}

/// Ambient layout direction.
///
/// `Inherit` resolves by walking the ownership chain; an unresolved chain
/// defaults to left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

// =============================================================================
// Container kinds and placement directives
// =============================================================================

/// Declared kind of a container, as authored by the widget wrapper.
///
/// Solver-driven containers are always `Flex`. The legacy kinds exist for
/// widget classes with no solver integration; they select the placement
/// directive used by the percentage resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
    #[default]
    Flex,
    /// Free-form placement from explicit left/top offsets.
    Absolute,
    /// Sequential placement along the declared direction, leftover space
    /// distributed by grow weight.
    Linear,
    /// Placement relative to the preceding sibling.
    Relative,
}

/// Concrete layout directive produced by the percentage resolver for the
/// children of a legacy container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementDirective {
    FreeForm,
    WeightedLinear,
    SiblingRelative,
}

/// Select the placement directive for a container kind.
///
/// This is a pure function of the declared kind alone; the resolver consults
/// nothing else when choosing how to place children.
pub const fn placement_for(kind: ContainerKind) -> PlacementDirective {
    match kind {
        ContainerKind::Flex | ContainerKind::Absolute => PlacementDirective::FreeForm,
        ContainerKind::Linear => PlacementDirective::WeightedLinear,
        ContainerKind::Relative => PlacementDirective::SiblingRelative,
    }
}

// =============================================================================
// Scrolling
// =============================================================================

/// The scroll axis of a scrollable container.
///
/// The cross axis is never scrollable and never auto-derived; it is pinned to
/// the container's own viewport extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl ScrollAxis {
    /// The perpendicular axis.
    pub const fn cross(&self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

// =============================================================================
// Scheduling
// =============================================================================

/// How the backend resolves geometry after a mutation.
///
/// - `Immediate`: a style change blocks until geometry is recomputed and
///   committed (the synchronous-per-mutation backend).
/// - `Deferred`: mutations within one tick coalesce into a single pass that
///   runs on the next display-refresh callback (`run_frame`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    #[default]
    Immediate,
    Deferred,
}

// =============================================================================
// Style keys and values
// =============================================================================

/// Identifies one style property on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKey {
    Position,
    Left,
    Top,
    Right,
    Bottom,
    Width,
    Height,
    MinWidth,
    MaxWidth,
    MinHeight,
    MaxHeight,
    MarginLeft,
    MarginTop,
    MarginRight,
    MarginBottom,
    PaddingLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    FlexGrow,
    FlexShrink,
    FlexBasis,
    FlexDirection,
    FlexWrap,
    JustifyContent,
    AlignItems,
    AlignContent,
    AlignSelf,
    Direction,
}

impl StyleKey {
    /// Whether a change to this property also affects how siblings are
    /// distributed, so the owning container must be re-laid out too.
    pub const fn affects_siblings(&self) -> bool {
        matches!(
            self,
            Self::Position
                | Self::Width
                | Self::Height
                | Self::MinWidth
                | Self::MaxWidth
                | Self::MinHeight
                | Self::MaxHeight
                | Self::MarginLeft
                | Self::MarginTop
                | Self::MarginRight
                | Self::MarginBottom
                | Self::FlexGrow
                | Self::FlexShrink
                | Self::FlexBasis
                | Self::AlignSelf
        )
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Position => "position",
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Width => "width",
            Self::Height => "height",
            Self::MinWidth => "minWidth",
            Self::MaxWidth => "maxWidth",
            Self::MinHeight => "minHeight",
            Self::MaxHeight => "maxHeight",
            Self::MarginLeft => "marginLeft",
            Self::MarginTop => "marginTop",
            Self::MarginRight => "marginRight",
            Self::MarginBottom => "marginBottom",
            Self::PaddingLeft => "paddingLeft",
            Self::PaddingTop => "paddingTop",
            Self::PaddingRight => "paddingRight",
            Self::PaddingBottom => "paddingBottom",
            Self::FlexGrow => "flexGrow",
            Self::FlexShrink => "flexShrink",
            Self::FlexBasis => "flexBasis",
            Self::FlexDirection => "flexDirection",
            Self::FlexWrap => "flexWrap",
            Self::JustifyContent => "justifyContent",
            Self::AlignItems => "alignItems",
            Self::AlignContent => "alignContent",
            Self::AlignSelf => "alignSelf",
            Self::Direction => "direction",
        };
        f.write_str(name)
    }
}

/// A typed style value, as accepted by `set_style`.
///
/// The scripting surface hands over numbers, percentage-strings, or keyword
/// strings; widget wrappers convert them with [`StyleValue::parse`] or build
/// variants directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleValue {
    /// A bare number (flex factors, margins, padding).
    Number(f32),
    /// A dimensional value: points, percentage, or auto.
    Dimension(Dimension),
    Position(PositionType),
    FlexDirection(FlexDirection),
    FlexWrap(FlexWrap),
    JustifyContent(JustifyContent),
    AlignItems(AlignItems),
    AlignContent(AlignContent),
    AlignSelf(AlignSelf),
    Direction(Direction),
}

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<Dimension> for StyleValue {
    fn from(value: Dimension) -> Self {
        Self::Dimension(value)
    }
}

impl StyleValue {
    /// Parse the raw string form of a value for the given key.
    ///
    /// Dimensional keys accept `"auto"`, `"50%"` and plain numbers; numeric
    /// keys accept plain numbers; enum keys accept their keyword spellings
    /// (`"row-reverse"`, `"space-between"`, `"rtl"`, ...). Returns `None`
    /// when the string does not parse for the key's domain.
    pub fn parse(key: StyleKey, raw: &str) -> Option<Self> {
        use StyleKey as K;
        let raw = raw.trim();
        match key {
            K::FlexGrow | K::FlexShrink | K::MarginLeft | K::MarginTop | K::MarginRight
            | K::MarginBottom | K::PaddingLeft | K::PaddingTop | K::PaddingRight
            | K::PaddingBottom => raw.parse::<f32>().ok().map(Self::Number),
            K::Left | K::Top | K::Right | K::Bottom | K::Width | K::Height | K::MinWidth
            | K::MaxWidth | K::MinHeight | K::MaxHeight | K::FlexBasis => {
                raw.parse::<Dimension>().ok().map(Self::Dimension)
            }
            K::Position => match raw {
                "relative" => Some(Self::Position(PositionType::Relative)),
                "absolute" => Some(Self::Position(PositionType::Absolute)),
                _ => None,
            },
            K::FlexDirection => match raw {
                "column" => Some(Self::FlexDirection(FlexDirection::Column)),
                "row" => Some(Self::FlexDirection(FlexDirection::Row)),
                "column-reverse" => Some(Self::FlexDirection(FlexDirection::ColumnReverse)),
                "row-reverse" => Some(Self::FlexDirection(FlexDirection::RowReverse)),
                _ => None,
            },
            K::FlexWrap => match raw {
                "nowrap" => Some(Self::FlexWrap(FlexWrap::NoWrap)),
                "wrap" => Some(Self::FlexWrap(FlexWrap::Wrap)),
                "wrap-reverse" => Some(Self::FlexWrap(FlexWrap::WrapReverse)),
                _ => None,
            },
            K::JustifyContent => match raw {
                "flex-start" => Some(Self::JustifyContent(JustifyContent::FlexStart)),
                "center" => Some(Self::JustifyContent(JustifyContent::Center)),
                "flex-end" => Some(Self::JustifyContent(JustifyContent::FlexEnd)),
                "space-between" => Some(Self::JustifyContent(JustifyContent::SpaceBetween)),
                "space-around" => Some(Self::JustifyContent(JustifyContent::SpaceAround)),
                "space-evenly" => Some(Self::JustifyContent(JustifyContent::SpaceEvenly)),
                _ => None,
            },
            K::AlignItems => match raw {
                "stretch" => Some(Self::AlignItems(AlignItems::Stretch)),
                "flex-start" => Some(Self::AlignItems(AlignItems::FlexStart)),
                "center" => Some(Self::AlignItems(AlignItems::Center)),
                "flex-end" => Some(Self::AlignItems(AlignItems::FlexEnd)),
                "baseline" => Some(Self::AlignItems(AlignItems::Baseline)),
                _ => None,
            },
            K::AlignContent => match raw {
                "stretch" => Some(Self::AlignContent(AlignContent::Stretch)),
                "flex-start" => Some(Self::AlignContent(AlignContent::FlexStart)),
                "center" => Some(Self::AlignContent(AlignContent::Center)),
                "flex-end" => Some(Self::AlignContent(AlignContent::FlexEnd)),
                "space-between" => Some(Self::AlignContent(AlignContent::SpaceBetween)),
                "space-around" => Some(Self::AlignContent(AlignContent::SpaceAround)),
                _ => None,
            },
            K::AlignSelf => match raw {
                "auto" => Some(Self::AlignSelf(AlignSelf::Auto)),
                "stretch" => Some(Self::AlignSelf(AlignSelf::Stretch)),
                "flex-start" => Some(Self::AlignSelf(AlignSelf::FlexStart)),
                "center" => Some(Self::AlignSelf(AlignSelf::Center)),
                "flex-end" => Some(Self::AlignSelf(AlignSelf::FlexEnd)),
                "baseline" => Some(Self::AlignSelf(AlignSelf::Baseline)),
                _ => None,
            },
            K::Direction => match raw {
                "inherit" => Some(Self::Direction(Direction::Inherit)),
                "ltr" => Some(Self::Direction(Direction::Ltr)),
                "rtl" => Some(Self::Direction(Direction::Rtl)),
                _ => None,
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
