//! Request and report types shared by the engine and the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading periods per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// An immutable backtest request: what to hold, against what, with how much.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestRequest {
    /// Asset symbols (uppercase) paired with their raw weights
    pub allocations: Vec<(String, f64)>,
    /// Benchmark symbol, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
    /// Starting capital
    pub initial_capital: f64,
    /// Annual risk-free rate (e.g., 0.04 for 4%)
    pub risk_free_rate: f64,
}

impl BacktestRequest {
    /// Create a request without a benchmark and a zero risk-free rate.
    pub fn new(allocations: Vec<(String, f64)>, initial_capital: f64) -> Self {
        Self {
            allocations: allocations
                .into_iter()
                .map(|(symbol, weight)| (symbol.trim().to_uppercase(), weight))
                .collect(),
            benchmark: None,
            initial_capital,
            risk_free_rate: 0.0,
        }
    }

    /// Compare against a benchmark symbol.
    pub fn with_benchmark(mut self, symbol: &str) -> Self {
        self.benchmark = Some(symbol.trim().to_uppercase());
        self
    }

    /// Set the annual risk-free rate used for the Sharpe ratio.
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Asset symbols in allocation order.
    pub fn symbols(&self) -> Vec<String> {
        self.allocations.iter().map(|(s, _)| s.clone()).collect()
    }

    /// Every symbol a price table must carry for this request, benchmark last.
    pub fn required_symbols(&self) -> Vec<String> {
        let mut symbols = self.symbols();
        if let Some(benchmark) = &self.benchmark {
            if !symbols.contains(benchmark) {
                symbols.push(benchmark.clone());
            }
        }
        symbols
    }
}

/// A dated point on a value or drawdown curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Performance and risk summary of one return series.
///
/// All returns, volatilities and drawdowns are fractions (0.21 = 21%).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesSummary {
    /// Symbol or label ("PORTFOLIO") of the series
    pub label: String,
    /// Number of return periods
    pub periods: usize,
    /// Value at the start of the series
    pub initial_value: f64,
    /// Value at the end of the series
    pub final_value: f64,
    /// Total return over the whole series
    pub total_return: f64,
    /// Compound annual return assuming 252 periods per year
    pub annualized_return: f64,
    /// Annualized volatility
    pub volatility: f64,
    /// Annualized Sharpe ratio, absent when volatility is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
    /// Worst peak-to-trough decline (always <= 0)
    pub max_drawdown: f64,
}

/// Risk of the portfolio relative to its benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskMetrics {
    /// Benchmark symbol
    pub benchmark: String,
    /// Pearson correlation of daily returns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,
    /// Beta of the portfolio against the benchmark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    /// Portfolio total return minus benchmark total return
    pub excess_return: f64,
    /// Portfolio annualized return minus benchmark annualized return
    pub excess_annualized_return: f64,
}

/// Result of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// First date of the price table
    pub start_date: NaiveDate,
    /// Last date of the price table
    pub end_date: NaiveDate,
    /// Normalized weights actually used
    pub weights: Vec<(String, f64)>,
    /// Weighted portfolio summary
    pub portfolio: SeriesSummary,
    /// Benchmark summary, when a benchmark was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<SeriesSummary>,
    /// Portfolio vs benchmark metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<RiskMetrics>,
    /// Buy-and-hold summary of each asset on its own
    pub assets: Vec<SeriesSummary>,
    /// Portfolio value per date, starting at the initial capital
    pub portfolio_curve: Vec<ValuePoint>,
    /// Benchmark value per date, scaled to the same initial capital
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_curve: Option<Vec<ValuePoint>>,
    /// Portfolio drawdown per date
    pub drawdown_curve: Vec<ValuePoint>,
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
