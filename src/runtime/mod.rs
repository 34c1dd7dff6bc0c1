//! Long-running watch-mode plumbing.

pub mod refresher;

pub use refresher::{shared_state, Refresher, RefreshState, RefreshStatus, SharedState};
