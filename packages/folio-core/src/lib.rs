//! Folio Core - Portfolio backtesting and fundamental scoring library.
//!
//! This crate provides:
//!
//! - **Price tables**: Date-aligned adjusted close prices for several symbols
//! - **Return engine**: Returns, weighted portfolio returns, cumulative value
//! - **Risk metrics**: Volatility, Sharpe ratio, max drawdown, correlation, beta
//! - **Fundamental scoring**: Rule-based checklists producing a 0-100 score
//! - **Market data**: Alpha Vantage and CSV providers with retry and TTL caching
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use folio_core::{BacktestEngine, BacktestRequest, PriceTable};
//!
//! let dates = vec![
//!     NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
//! ];
//! let table = PriceTable::new(
//!     dates,
//!     vec!["AAPL".to_string()],
//!     vec![vec![100.0], vec![110.0], vec![121.0]],
//! )
//! .unwrap();
//!
//! let request = BacktestRequest::new(vec![("AAPL".to_string(), 1.0)], 1000.0);
//! let report = BacktestEngine::new().run(&request, &table).unwrap();
//!
//! assert!((report.portfolio.final_value - 1210.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod portfolio;
pub mod prices;
pub mod provider;
pub mod scoring;
pub mod types;

// Re-export commonly used types
pub use config::{ProviderKind, Settings};
pub use prices::{MissingValuePolicy, PricePoint, PriceSeries, PriceTable};
pub use types::{ApiResponse, BacktestReport, BacktestRequest, RiskMetrics, SeriesSummary};

// Re-export main functionality
pub use portfolio::{
    annualized_return, beta, compute_returns, correlation, cumulative_value, drawdown_series,
    max_drawdown, normalize_weights, portfolio_returns, sharpe_ratio, total_return, volatility,
    BacktestEngine, ReturnMatrix, Weights,
};
pub use provider::{
    load_price_table, AlphaVantageProvider, Backoff, CachingProvider, CsvProvider,
    MarketDataProvider, RequestPacer, RetryPolicy,
};
pub use scoring::{
    benchmark_for, builtin_policies, get_policy, Fundamentals, Metric, Recommendation, ScoreCard,
    ScoringPolicy, SectorBenchmark,
};

/// Error types for folio-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether the operation may succeed if repeated after a pause.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}

/// Result type for folio-core operations.
pub type Result<T> = std::result::Result<T, Error>;
