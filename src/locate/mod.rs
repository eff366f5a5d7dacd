//! Region location over boolean pixel predicates.
//!
//! Callers usually build the predicate from an [`HsvRange`](crate::color::HsvRange).

pub mod corners;
pub mod edges;

pub use corners::{find_corners, CONTINUITY_PROBES};
pub use edges::find_edges;
