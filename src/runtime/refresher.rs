//! Background refresh loop.
//!
//! Re-runs the analysis pipeline on a fixed interval and on demand,
//! publishing results into shared state for readers. Manual refresh
//! requests are rate-limited by a cooldown so a burst of requests
//! cannot hammer the feed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{AnalysisRequest, RefreshConfig};
use crate::domain::Pick;
use crate::engine::Engine;
use crate::feed::{FeedQuery, FeedSource};

/// Where the latest refresh left the shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// No run has completed yet.
    Pending,
    /// The latest run succeeded.
    Ready,
    /// The latest run failed. Picks from the last good run are kept
    /// unless no run has ever succeeded.
    Failed(String),
}

/// Snapshot of the most recent pipeline run, shared between the
/// refresh loop and its readers.
#[derive(Debug)]
pub struct RefreshState {
    picks: Vec<Pick>,
    status: RefreshStatus,
    last_run: Option<DateTime<Utc>>,
}

impl RefreshState {
    #[must_use]
    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    #[must_use]
    pub fn status(&self) -> &RefreshStatus {
        &self.status
    }

    #[must_use]
    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            picks: Vec::new(),
            status: RefreshStatus::Pending,
            last_run: None,
        }
    }
}

pub type SharedState = Arc<RwLock<RefreshState>>;

#[must_use]
pub fn shared_state() -> SharedState {
    Arc::new(RwLock::new(RefreshState::default()))
}

/// Periodic + on-demand pipeline runner.
pub struct Refresher {
    engine: Engine,
    source: Arc<dyn FeedSource>,
    request: AnalysisRequest,
    query: FeedQuery,
    state: SharedState,
    interval: Duration,
    cooldown: Duration,
}

impl Refresher {
    #[must_use]
    pub fn new(
        engine: Engine,
        source: Arc<dyn FeedSource>,
        request: AnalysisRequest,
        query: FeedQuery,
        state: SharedState,
        refresh: &RefreshConfig,
    ) -> Self {
        Self {
            engine,
            source,
            request,
            query,
            state,
            interval: Duration::from_secs(refresh.interval_secs),
            cooldown: Duration::from_secs(refresh.cooldown_secs),
        }
    }

    /// Run until shutdown. The first refresh happens immediately;
    /// afterwards the loop wakes on the interval tick or on a manual
    /// refresh request, whichever comes first.
    pub async fn run(
        self,
        mut refresh_rx: mpsc::Receiver<()>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval_at(Instant::now(), self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_manual: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
                request = refresh_rx.recv() => {
                    match request {
                        Some(()) => {
                            let now = Instant::now();
                            let cooled = last_manual
                                .map_or(true, |at| now.duration_since(at) >= self.cooldown);
                            if cooled {
                                last_manual = Some(now);
                                ticker.reset();
                                self.refresh_once().await;
                            } else {
                                debug!("manual refresh within cooldown, ignored");
                            }
                        }
                        None => {
                            debug!("refresh channel closed, stopping");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("refresher shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One fetch-and-analyze cycle. A failure before any run has
    /// succeeded leaves the state empty and failed; a failure after
    /// that keeps the previous picks visible.
    pub async fn refresh_once(&self) {
        match self.source.fetch(&self.query).await {
            Ok(snapshot) => {
                let picks = self.engine.analyze(&snapshot, &self.request);
                let mut state = self.state.write();
                debug!(picks = picks.len(), "refresh complete");
                state.picks = picks;
                state.status = RefreshStatus::Ready;
                state.last_run = Some(Utc::now());
            }
            Err(err) => {
                let mut state = self.state.write();
                let had_success = matches!(state.status, RefreshStatus::Ready)
                    || state.last_run.is_some();
                if had_success {
                    warn!(error = %err, "refresh failed, keeping previous picks");
                } else {
                    warn!(error = %err, "initial refresh failed");
                    state.picks.clear();
                }
                state.status = RefreshStatus::Failed(err.to_string());
            }
        }
    }
}
