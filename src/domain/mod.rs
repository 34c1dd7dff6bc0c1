//! Feed-agnostic domain types: odds, books, quotes, markets, picks,
//! and derived opportunities.

pub mod book;
pub mod error;
pub mod market;
pub mod odds;
pub mod opportunity;
pub mod pick;
pub mod quote;

pub use book::{canonical_book_name, Book, BookClass};
pub use error::DomainError;
pub use market::{Market, MarketKey, MarketKind, Period, PropKey};
pub use odds::AmericanOdds;
pub use opportunity::{Arbitrage, ArbitrageLeg, ExchangeEdge, Middle, MiddleLeg, Opportunity};
pub use pick::{Ev, Pick};
pub use quote::Quote;
