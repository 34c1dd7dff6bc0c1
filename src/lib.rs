//! Fairline - sportsbook odds aggregation and edge detection.
//!
//! Fairline ingests a raw multi-book odds snapshot, groups quotes into
//! markets on a consensus line, computes a sharpness-weighted fair
//! probability per side, and surfaces the picks where some book's
//! price beats fair. Separate run modes classify arbitrage pairs,
//! line middles, and edges against reference exchanges.
//!
//! Module map:
//! - [`domain`]: odds, books, markets, picks, opportunity types
//! - [`engine`]: grouping, consensus, and the four classifiers
//! - [`feed`]: raw snapshot DTOs and the feed source port
//! - [`runtime`]: the background refresh loop for watch mode
//! - [`config`]: engine tuning, filters, and run requests
//! - [`cli`]: the `fairline` binary's commands

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod feed;
pub mod runtime;

pub use error::{Error, Result};
