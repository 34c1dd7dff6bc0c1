//! Odds aggregation and edge detection.
//!
//! The engine turns a raw feed [`Snapshot`](crate::feed::Snapshot) into
//! a ranked list of [`Pick`](crate::domain::Pick)s: quotes are grouped
//! into markets, a sharpness-weighted consensus is computed per side,
//! and one of four classifiers scores the result depending on the run
//! mode.

pub mod arbitrage;
pub mod consensus;
pub mod edge;
pub mod exchange_edge;
pub mod grouper;
pub mod middle;
pub mod normalize;
pub mod pipeline;

pub use consensus::{devig, weighted_consensus};
pub use edge::{best_quote, edge_percent, resolve_sides, SideCandidate};
pub use grouper::group_snapshot;
pub use pipeline::Engine;
