//! In-memory provider for tests.

use super::MarketDataProvider;
use crate::prices::{PricePoint, PriceSeries};
use crate::scoring::Fundamentals;
use crate::{Error, Result};
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

/// Serves canned data and counts calls.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    prices: HashMap<String, PriceSeries>,
    fundamentals: HashMap<String, Fundamentals>,
    rate_limited_remaining: u32,
    price_calls: u32,
    fundamentals_calls: u32,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Daily closes starting 2024-01-01, one per calendar day.
    pub fn with_prices(self, symbol: &str, closes: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Days::new(i as u64), c))
            .collect();
        self.with_series(PriceSeries::new(symbol, points))
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.prices.insert(series.symbol.clone(), series);
        self
    }

    pub fn with_fundamentals(mut self, data: Fundamentals) -> Self {
        self.fundamentals.insert(data.symbol.clone(), data);
        self
    }

    /// Answer the next `calls` requests with a rate-limit error.
    pub fn rate_limited_for(mut self, calls: u32) -> Self {
        self.rate_limited_remaining = calls;
        self
    }

    pub fn price_calls(&self) -> u32 {
        self.price_calls
    }

    pub fn fundamentals_calls(&self) -> u32 {
        self.fundamentals_calls
    }

    fn throttle(&mut self) -> Result<()> {
        if self.rate_limited_remaining > 0 {
            self.rate_limited_remaining -= 1;
            return Err(Error::RateLimited {
                provider: self.id().to_string(),
            });
        }
        Ok(())
    }
}

impl MarketDataProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "SCRIPTED"
    }

    fn daily_prices(&mut self, symbol: &str) -> Result<PriceSeries> {
        self.price_calls += 1;
        self.throttle()?;
        self.prices
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| Error::DataUnavailable(format!("No prices for {}", symbol)))
    }

    fn fundamentals(&mut self, symbol: &str) -> Result<Fundamentals> {
        self.fundamentals_calls += 1;
        self.throttle()?;
        self.fundamentals
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| Error::DataUnavailable(format!("No fundamentals for {}", symbol)))
    }
}
