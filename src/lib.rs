//! # viewflex
//!
//! Flex layout resolution and scroll content sizing for native view
//! hierarchies.
//!
//! viewflex is the geometry core of a cross-platform binding layer: widget
//! wrappers own native views, this crate owns their style tree and decides
//! where every box goes. It reconciles one declarative style tree against two
//! structurally different backend scheduling models, derives scrollable
//! content extents from committed child geometry, cleans raw scroll callbacks
//! into a stable event stream, and mirrors presentation for right-to-left
//! locales.
//!
//! ## Architecture
//!
//! ```text
//! set_style / add_child → LayoutTree (dirty) → LayoutEngine
//!     → Taffy solver (primary) | percentage resolver (legacy fallback)
//!     → committed geometry → content sizer corrective pass
//!     → pass observers / scroll translator / directional mirror
//! ```
//!
//! Flexbox itself is delegated to [Taffy](https://github.com/DioxusLabs/taffy);
//! this crate decides *when* passes run, what the solver sees, and what
//! happens to the output.
//!
//! ## Scheduling
//!
//! [`ScheduleMode::Immediate`] resolves synchronously at every mutation, for
//! backends that recompute geometry per change; [`ScheduleMode::Deferred`]
//! coalesces a tick's mutations into one pass on the next display-refresh
//! callback via [`LayoutEngine::run_frame`], for backends that batch.
//!
//! ## Threading
//!
//! The engine is single-threaded by design: all mutation, pass execution and
//! event emission happen on the UI-owning thread. Background work must
//! marshal through the host's hand-off queue.
//!
//! ## Modules
//!
//! - [`types`] - core vocabulary (Dimension, flex enums, geometry)
//! - [`tree`] - style records and the arena-backed node registry
//! - [`layout`] - solver bridge and percentage-resolver fallback
//! - [`pipeline`] - the layout coordinator
//! - [`scroll`] - content sizer, event translator, scroll state
//! - [`mirror`] - right-to-left presentation flipping
//! - [`events`] - typed per-node publish/subscribe

pub mod error;
pub mod events;
pub mod layout;
pub mod mirror;
pub mod pipeline;
pub mod scroll;
pub mod tree;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use events::{EventHub, Subscription};

pub use tree::{Edges, LayoutTree, NodeFlags, NodeId, StyleNode};

pub use layout::{PassEntry, PassResult};

pub use pipeline::{LayoutEngine, PassSummary};

pub use scroll::{ChildSpan, ScrollEvent, ScrollState, ScrollTranslator, Translation, content_extent};

pub use mirror::is_flipped;
