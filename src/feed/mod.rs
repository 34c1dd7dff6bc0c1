//! Raw feed snapshot types and the [`FeedSource`] port.

pub mod source;
pub mod types;

pub use source::{FeedQuery, FeedSource, FileSnapshotSource};
pub use types::{BookmakerRecord, GameRecord, MarketRecord, OutcomeRecord, Snapshot};
