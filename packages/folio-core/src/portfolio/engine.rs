//! Backtest pipeline: price table to report.

use super::performance::summarize;
use super::returns::{compute_returns, portfolio_returns, simple_returns, value_curve};
use super::risk::{beta, correlation, drawdown_series};
use super::weights::Weights;
use crate::prices::PriceTable;
use crate::types::{BacktestReport, BacktestRequest, RiskMetrics, ValuePoint};
use crate::{Error, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Label used for the weighted portfolio series.
pub const PORTFOLIO_LABEL: &str = "PORTFOLIO";

/// Runs constant-weight backtests over a price table.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine;

impl BacktestEngine {
    pub fn new() -> Self {
        Self
    }

    /// Backtest a weighted portfolio, and its benchmark if one is requested.
    ///
    /// The table may carry extra columns; only the requested symbols are used.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for non-positive capital or a malformed allocation list
    /// - `DataUnavailable` when a symbol is missing or fewer than two dates remain
    /// - `ConfigurationError` when weights and assets do not line up
    pub fn run(&self, request: &BacktestRequest, table: &PriceTable) -> Result<BacktestReport> {
        if !request.initial_capital.is_finite() || request.initial_capital <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Initial capital must be positive, got {}",
                request.initial_capital
            )));
        }

        if request.allocations.is_empty() {
            return Err(Error::InvalidInput("No assets in request".to_string()));
        }

        let weights = Weights::new(request.allocations.clone())?.normalized()?;
        let assets = table.select(&weights.symbols())?;
        if assets.len() < 2 {
            return Err(Error::DataUnavailable(format!(
                "Need at least 2 dates to backtest, got {}",
                assets.len()
            )));
        }

        info!(
            assets = weights.len(),
            dates = assets.len(),
            start = %assets.first_date(),
            end = %assets.last_date(),
            "running backtest"
        );

        let capital = request.initial_capital;
        let returns = compute_returns(&assets)?;
        let port_returns = portfolio_returns(&returns, &weights)?;
        let portfolio = summarize(PORTFOLIO_LABEL, &port_returns, capital, request.risk_free_rate)?;

        let asset_summaries = weights
            .symbols()
            .iter()
            .map(|symbol| {
                let column = returns.column(symbol).ok_or_else(|| {
                    Error::DataUnavailable(format!("No returns for {}", symbol))
                })?;
                summarize(symbol, &column, capital, request.risk_free_rate)
            })
            .collect::<Result<Vec<_>>>()?;

        let portfolio_values = value_curve(&port_returns, capital)?;
        let dates = assets.dates();

        let (benchmark, relative, benchmark_curve) = match &request.benchmark {
            Some(symbol) => {
                let prices = table.column(symbol).ok_or_else(|| {
                    Error::DataUnavailable(format!("No prices for benchmark {}", symbol))
                })?;
                let bench_returns = simple_returns(&prices);
                let summary = summarize(symbol, &bench_returns, capital, request.risk_free_rate)?;

                let relative = RiskMetrics {
                    benchmark: symbol.clone(),
                    correlation: correlation(&port_returns, &bench_returns)?,
                    beta: beta(&port_returns, &bench_returns)?,
                    excess_return: portfolio.total_return - summary.total_return,
                    excess_annualized_return: portfolio.annualized_return
                        - summary.annualized_return,
                };
                debug!(
                    benchmark = %symbol,
                    correlation = ?relative.correlation,
                    "benchmark compared"
                );

                let curve = dated(dates, &value_curve(&bench_returns, capital)?);
                (Some(summary), Some(relative), Some(curve))
            }
            None => (None, None, None),
        };

        info!(
            total_return = portfolio.total_return,
            max_drawdown = portfolio.max_drawdown,
            "backtest complete"
        );

        Ok(BacktestReport {
            start_date: assets.first_date(),
            end_date: assets.last_date(),
            weights: weights.entries().to_vec(),
            drawdown_curve: dated(dates, &drawdown_series(&portfolio_values)),
            portfolio_curve: dated(dates, &portfolio_values),
            portfolio,
            benchmark,
            relative,
            assets: asset_summaries,
            benchmark_curve,
        })
    }
}

fn dated(dates: &[NaiveDate], values: &[f64]) -> Vec<ValuePoint> {
    dates
        .iter()
        .zip(values)
        .map(|(&date, &value)| ValuePoint { date, value })
        .collect()
}
