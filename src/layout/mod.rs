//! Geometry resolution - solver bridge and legacy fallback.
//!
//! # Architecture
//!
//! The primary path hands every dirty subtree to
//! [Taffy](https://github.com/DioxusLabs/taffy), the external flex solver:
//!
//! 1. Converts StyleNode records to solver styles
//! 2. Builds the solver tree from the ownership lists
//! 3. Runs the pass and extracts parent-relative geometry
//!
//! The [`percent`] resolver is a documented fallback for widget classes with
//! no solver integration: a top-down, uncached percentage/absolute pass whose
//! placement directive is a pure function of the container kind.
//!
//! Neither path writes to the tree; both return pass entries the coordinator
//! commits, so a failed pass leaves the last good geometry intact.

pub mod percent;
pub mod solver;

pub use solver::{PassEntry, PassResult};
