//! Market data providers.
//!
//! Everything that talks to the outside world sits behind [`MarketDataProvider`];
//! the return engine and scoring only ever see [`PriceSeries`] and [`Fundamentals`].

mod alpha_vantage;
mod cache;
mod csv_dir;
mod loader;
mod pacing;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use alpha_vantage::{parse_daily_series, parse_overview, AlphaVantageProvider};
pub use cache::{CachingProvider, Endpoint, DEFAULT_CACHE_CAPACITY};
pub use csv_dir::{read_price_csv, CsvProvider};
pub use loader::load_price_table;
pub use pacing::RequestPacer;
pub use retry::{Backoff, RetryPolicy};

use crate::prices::PriceSeries;
use crate::scoring::Fundamentals;
use crate::Result;

/// Source of daily prices and company fundamentals.
pub trait MarketDataProvider {
    /// Short identifier used in logs and errors.
    fn id(&self) -> &str;

    /// Full daily adjusted-close history, oldest first.
    fn daily_prices(&mut self, symbol: &str) -> Result<PriceSeries>;

    fn fundamentals(&mut self, symbol: &str) -> Result<Fundamentals>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn daily_prices(&mut self, symbol: &str) -> Result<PriceSeries> {
        (**self).daily_prices(symbol)
    }

    fn fundamentals(&mut self, symbol: &str) -> Result<Fundamentals> {
        (**self).fundamentals(symbol)
    }
}
