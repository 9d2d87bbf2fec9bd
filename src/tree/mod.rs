//! Layout tree - style records and the arena-backed node registry.
//!
//! The tree owns everything per node:
//! - Registry: id allocation, generation tags, ownership lists
//! - StyleNode: plain typed style fields mutated through validated setters
//! - Geometry: last committed pass output plus the stale marker
//!
//! # Architecture
//!
//! Nodes are slots in an arena, addressed by generation-tagged ids:
//!
//! ```text
//! slot 0: Flex   (parent=None, width=auto,  children=[1, 2])
//! slot 1: Flex   (parent=0,    width=50%,   children=[])
//! slot 2: Linear (parent=0,    width=120.0, children=[])
//! ```
//!
//! Reused slots bump their generation, so ids captured by an in-flight pass
//! can never write to a node created after a removal.

mod arena;
mod node;

pub use arena::{LayoutTree, NodeId};
pub use node::{Edges, NodeData, NodeFlags, StyleNode};
