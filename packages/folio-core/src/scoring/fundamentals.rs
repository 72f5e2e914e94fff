//! Named financial ratios for one company.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A financial ratio or figure used by scoring rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MarketCap,
    TrailingPe,
    ProfitMargin,
    ReturnOnEquity,
    RevenueGrowth,
    EarningsGrowth,
    Beta,
    DividendYield,
    CurrentRatio,
    DebtToEquity,
    FreeCashFlow,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::MarketCap,
        Metric::TrailingPe,
        Metric::ProfitMargin,
        Metric::ReturnOnEquity,
        Metric::RevenueGrowth,
        Metric::EarningsGrowth,
        Metric::Beta,
        Metric::DividendYield,
        Metric::CurrentRatio,
        Metric::DebtToEquity,
        Metric::FreeCashFlow,
    ];

    /// Snake-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MarketCap => "market_cap",
            Metric::TrailingPe => "trailing_pe",
            Metric::ProfitMargin => "profit_margin",
            Metric::ReturnOnEquity => "return_on_equity",
            Metric::RevenueGrowth => "revenue_growth",
            Metric::EarningsGrowth => "earnings_growth",
            Metric::Beta => "beta",
            Metric::DividendYield => "dividend_yield",
            Metric::CurrentRatio => "current_ratio",
            Metric::DebtToEquity => "debt_to_equity",
            Metric::FreeCashFlow => "free_cash_flow",
        }
    }

    /// Yahoo Finance `info` key.
    pub fn yahoo_key(&self) -> &'static str {
        match self {
            Metric::MarketCap => "marketCap",
            Metric::TrailingPe => "trailingPE",
            Metric::ProfitMargin => "profitMargins",
            Metric::ReturnOnEquity => "returnOnEquity",
            Metric::RevenueGrowth => "revenueGrowth",
            Metric::EarningsGrowth => "earningsGrowth",
            Metric::Beta => "beta",
            Metric::DividendYield => "dividendYield",
            Metric::CurrentRatio => "currentRatio",
            Metric::DebtToEquity => "debtToEquity",
            Metric::FreeCashFlow => "freeCashflow",
        }
    }

    /// Alpha Vantage `OVERVIEW` field name.
    pub fn alpha_vantage_key(&self) -> &'static str {
        match self {
            Metric::MarketCap => "MarketCapitalization",
            Metric::TrailingPe => "PERatio",
            Metric::ProfitMargin => "ProfitMargin",
            Metric::ReturnOnEquity => "ReturnOnEquityTTM",
            Metric::RevenueGrowth => "QuarterlyRevenueGrowthYOY",
            Metric::EarningsGrowth => "QuarterlyEarningsGrowthYOY",
            Metric::Beta => "Beta",
            Metric::DividendYield => "DividendYield",
            Metric::CurrentRatio => "CurrentRatio",
            Metric::DebtToEquity => "DebtToEquity",
            Metric::FreeCashFlow => "FreeCashFlowTTM",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    /// Accepts the snake-case name, the Yahoo key or the Alpha Vantage key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s || m.yahoo_key() == s || m.alpha_vantage_key() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown metric: {}", s)))
    }
}

/// Fundamental data for one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Fundamentals {
    /// Ticker symbol (uppercase)
    pub symbol: String,
    /// Company name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sector, used to pick a benchmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Available metrics
    pub metrics: BTreeMap<Metric, f64>,
}

impl Fundamentals {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            ..Default::default()
        }
    }

    /// Builder-style metric setter. Non-finite values are ignored.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, value);
        self
    }

    pub fn with_sector(mut self, sector: &str) -> Self {
        self.sector = Some(sector.to_string());
        self
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        if value.is_finite() {
            self.metrics.insert(metric, value);
        }
    }

    /// Metric value if known.
    pub fn try_get(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    /// Metric value, 0.0 when unknown.
    pub fn get(&self, metric: Metric) -> f64 {
        self.try_get(metric).unwrap_or(0.0)
    }
}
