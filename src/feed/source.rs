//! The feed boundary: how raw snapshots reach the engine.
//!
//! The HTTP collaborator that actually retrieves odds lives outside
//! this crate; it is specified only by the [`FeedSource`] port.
//! [`FileSnapshotSource`] reads a captured JSON snapshot and backs the
//! CLI and tests.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use super::types::{GameRecord, Snapshot};
use crate::error::FeedError;

/// What a fetch should cover. Collaborators may use this to scope the
/// upstream request; snapshot-file sources ignore it.
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    /// Raw sport selector ("all", one key, or comma-joined keys).
    pub sport: String,
    /// Raw market keys to retrieve; empty means everything.
    pub markets: Vec<String>,
}

/// Port for the external collaborator that retrieves raw snapshots.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one point-in-time snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the upstream fetch or parse fails.
    /// This is the only failure the engine surfaces to its consumer.
    async fn fetch(&self, query: &FeedQuery) -> Result<Snapshot, FeedError>;
}

/// Reads a JSON array of game records from disk, stamping the snapshot
/// with the read time.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileSnapshotSource {
    async fn fetch(&self, _query: &FeedQuery) -> Result<Snapshot, FeedError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(FeedError::Io)?;
        let games: Vec<GameRecord> = serde_json::from_str(&raw).map_err(FeedError::Parse)?;
        Ok(Snapshot::new(games, Utc::now()))
    }
}
