//! Error taxonomy for the layout engine.
//!
//! Validation errors are raised synchronously at the mutating call and never
//! corrupt previously committed geometry. A solver or resolver failure during
//! a pass propagates to the caller that triggered the mutation; the tree
//! keeps its last good geometry rather than applying a partial result.

use thiserror::Error;

use crate::tree::NodeId;
use crate::types::StyleKey;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong inside the layout engine.
///
/// Raw scroll-report anomalies (negative offsets, duplicated callbacks) are
/// expected backend noise, corrected locally by the translator, and are
/// deliberately absent here.
#[derive(Debug, Error)]
pub enum Error {
    /// A style value outside the domain of its property key. The previous
    /// value of the property is left untouched.
    #[error("invalid value for style property `{key}`: {reason}")]
    Validation { key: StyleKey, reason: String },

    /// Geometry was read before any layout pass completed for the node.
    #[error("geometry of {0} read before any completed layout pass")]
    Unresolved(NodeId),

    /// A scroll target outside the valid range.
    #[error("scroll target {coordinate} is out of range")]
    OutOfRange { coordinate: f32 },

    /// A percentage chain that cannot terminate: the node's percentage
    /// depends on an auto-sized ancestor whose extent depends on this node.
    #[error("percentage dimension of {0} cannot terminate: ancestor is auto-sized")]
    CyclicPercentage(NodeId),

    /// The node id does not (or no longer) name a live node.
    #[error("{0} is not part of the layout tree")]
    UnknownNode(NodeId),

    /// The external flex solver rejected the pass.
    #[error("flex solver failed: {0}")]
    Solver(String),
}

impl Error {
    pub(crate) fn validation(key: StyleKey, reason: impl Into<String>) -> Self {
        Self::Validation {
            key,
            reason: reason.into(),
        }
    }
}

impl From<taffy::TaffyError> for Error {
    fn from(err: taffy::TaffyError) -> Self {
        Self::Solver(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        let err = Error::validation(StyleKey::FlexGrow, "expected a non-negative number");
        assert_eq!(
            err.to_string(),
            "invalid value for style property `flexGrow`: expected a non-negative number"
        );

        let err = Error::OutOfRange { coordinate: -4.0 };
        assert_eq!(err.to_string(), "scroll target -4 is out of range");
    }
}
