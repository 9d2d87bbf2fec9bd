//! Layout pipeline.
//!
//! This module hosts the coordinator that connects the style tree to the
//! rendering backends.
//!
//! # Data flow
//!
//! ```text
//! style mutation → tree (marks dirty) → coordinator → solver/resolver
//!   → committed geometry → content sizer corrective pass → pass observers
//! ```
//!
//! ## Key design principles
//!
//! - **Pure passes**: the solver bridge and the percentage resolver never
//!   write to the tree; only the coordinator's commit step does
//! - **Two-phase sizing**: the content sizer reads committed geometry and
//!   feeds exactly one subtree-restricted corrective pass
//! - **Cancellation at commit**: results for nodes removed mid-pass are
//!   discarded, never applied

mod engine;

pub use engine::{LayoutEngine, PassSummary};
