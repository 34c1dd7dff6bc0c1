//! Command-line interface definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::config::{
    AnalysisRequest, BetMode, DateFilter, EngineConfig, MarketFilter, SportFilter,
};
use crate::domain::{Ev, Pick};
use crate::engine::Engine;
use crate::error::{ConfigError, Result};
use crate::feed::{FeedQuery, FeedSource, FileSnapshotSource};
use crate::runtime::{shared_state, Refresher, RefreshStatus};

/// Fairline - sportsbook odds aggregation and edge detection.
#[derive(Parser, Debug)]
#[command(name = "fairline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file.
    #[arg(long, default_value = "fairline.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one odds snapshot and print ranked picks
    Analyze(AnalyzeArgs),

    /// Re-analyze a snapshot file on an interval until interrupted
    Watch(AnalyzeArgs),
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Odds snapshot file (JSON array of games).
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Sport keys, comma-separated, or "all".
    #[arg(long, default_value = "all")]
    pub sport: String,

    /// Restrict to games on one local date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<String>,

    /// Market families, comma-separated, or "all".
    #[arg(long, default_value = "all")]
    pub market: String,

    /// Which class of result to produce.
    #[arg(long, value_enum, default_value_t = BetMode::Straight)]
    pub mode: BetMode,

    /// Restrict to these books (canonical names, comma-separated).
    #[arg(long)]
    pub books: Option<String>,

    /// Override the minimum contributing books per side.
    #[arg(long)]
    pub min_data_points: Option<usize>,

    /// Emit picks as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeArgs {
    /// Translate raw CLI strings into a typed request.
    pub fn to_request(&self) -> Result<AnalysisRequest> {
        let date = match &self.date {
            Some(raw) => DateFilter::parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                field: "date",
                reason: format!("not a YYYY-MM-DD date: {raw}"),
            })?,
            None => DateFilter::AllUpcoming,
        };
        let books = self
            .books
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(AnalysisRequest {
            sport: SportFilter::parse(&self.sport),
            date,
            market: MarketFilter::parse(&self.market),
            mode: self.mode,
            books,
            min_data_points: self.min_data_points,
        })
    }

    fn query(&self) -> FeedQuery {
        FeedQuery {
            sport: self.sport.clone(),
            markets: Vec::new(),
        }
    }
}

/// One-shot analysis of a snapshot file.
pub async fn analyze(args: &AnalyzeArgs, config: EngineConfig) -> Result<()> {
    let request = args.to_request()?;
    let source = FileSnapshotSource::new(&args.snapshot);
    let snapshot = source.fetch(&args.query()).await?;
    let engine = Engine::new(config);
    let picks = engine.analyze(&snapshot, &request);
    render(&picks, args.json)?;
    Ok(())
}

/// Re-analyze the snapshot file on the configured interval, printing
/// each run, until Ctrl-C.
pub async fn watch(args: &AnalyzeArgs, config: EngineConfig) -> Result<()> {
    if !config.refresh.enabled {
        info!("auto-refresh disabled in config, running once");
        return analyze(args, config).await;
    }
    let request = args.to_request()?;
    let refresh = config.refresh.clone();
    let interval = Duration::from_secs(refresh.interval_secs);

    let state = shared_state();
    let source: Arc<dyn FeedSource> = Arc::new(FileSnapshotSource::new(&args.snapshot));
    let refresher = Refresher::new(
        Engine::new(config),
        source,
        request,
        args.query(),
        state.clone(),
        &refresh,
    );

    let (_refresh_tx, refresh_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(refresher.run(refresh_rx, shutdown_rx));

    let mut ticker = tokio::time::interval(interval);
    let mut last_rendered: Option<String> = None;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (picks, status) = {
                    let state = state.read();
                    (state.picks().to_vec(), state.status().clone())
                };
                // Identical state stays on screen; only changes re-print.
                if !state_changed(&mut last_rendered, &status, &picks) {
                    continue;
                }
                match status {
                    RefreshStatus::Pending => {}
                    RefreshStatus::Ready => render(&picks, args.json)?,
                    RefreshStatus::Failed(reason) => {
                        eprintln!("{} {reason}", "refresh failed:".red());
                        if !picks.is_empty() {
                            render(&picks, args.json)?;
                        }
                    }
                }
            }
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = worker.await;
    Ok(())
}

/// Fingerprint the refresh state and report whether it differs from
/// the last one rendered, updating the fingerprint when it does.
fn state_changed(last: &mut Option<String>, status: &RefreshStatus, picks: &[Pick]) -> bool {
    let fingerprint = format!(
        "{status:?}:{}",
        serde_json::to_string(picks).unwrap_or_default()
    );
    if last.as_deref() == Some(fingerprint.as_str()) {
        return false;
    }
    *last = Some(fingerprint);
    true
}

#[derive(Tabled)]
struct PickRow {
    #[tabled(rename = "Game")]
    game: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Pick")]
    pick: String,
    #[tabled(rename = "Best")]
    best: String,
    #[tabled(rename = "Book")]
    book: String,
    #[tabled(rename = "Fair")]
    fair: String,
    #[tabled(rename = "EV")]
    ev: String,
    #[tabled(rename = "Books")]
    books: String,
}

impl PickRow {
    fn from_pick(pick: &Pick) -> Self {
        let game = match (&pick.away_team, &pick.home_team) {
            (Some(away), Some(home)) => format!("{away} @ {home}"),
            _ => pick.game_id.clone(),
        };
        let market = match &pick.player {
            Some(player) => format!("{player} {}", pick.market.raw()),
            None => pick.market.raw().to_string(),
        };
        let selection = match pick.line {
            Some(line) => format!("{} {line}", pick.selection),
            None => pick.selection.clone(),
        };
        let ev = match pick.ev {
            Ev::Percent(p) if p > rust_decimal::Decimal::ZERO => {
                format!("{}", format!("{p:.2}%").green())
            }
            Ev::Percent(p) => format!("{}", format!("{p:.2}%").red()),
            Ev::InsufficientData => format!("{}", "insufficient".dimmed()),
        };
        Self {
            game,
            market,
            pick: selection,
            best: pick.best_price.to_string(),
            book: pick.best_book.clone(),
            fair: pick
                .fair_price
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            ev,
            books: pick.data_points.to_string(),
        }
    }
}

/// Print picks as a table or as JSON.
pub fn render(picks: &[Pick], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(picks).map_err(crate::error::FeedError::Parse)?
        );
        return Ok(());
    }
    if picks.is_empty() {
        println!("{}", "no picks".dimmed());
        return Ok(());
    }

    let rows: Vec<PickRow> = picks.iter().map(PickRow::from_pick).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{} picks", picks.len());
    Ok(())
}
