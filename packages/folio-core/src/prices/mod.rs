//! Price series and date-aligned price tables.
//!
//! A [`PriceSeries`] is what a market data provider returns for one symbol.
//! A [`PriceTable`] aligns several series on a shared, strictly increasing
//! date index and is the input of the return engine.

mod table;

pub use table::{MissingValuePolicy, PriceTable};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single adjusted close observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Adjusted close history for one symbol, sorted by date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    /// Ticker symbol (uppercase)
    pub symbol: String,
    /// Observations in ascending date order
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series, sorting the points by date.
    pub fn new(symbol: &str, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            symbol: symbol.trim().to_uppercase(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Closing prices without dates.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}
