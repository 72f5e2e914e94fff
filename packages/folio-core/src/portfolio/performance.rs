//! Return-based performance analytics.

use super::returns::value_curve;
use super::risk::{max_drawdown, sharpe_ratio, volatility};
use crate::types::{SeriesSummary, TRADING_DAYS_PER_YEAR};
use crate::Result;

/// Total return of a value series relative to the starting capital.
pub fn total_return(values: &[f64], capital: f64) -> f64 {
    match values.last() {
        Some(last) if capital > 0.0 => last / capital - 1.0,
        _ => 0.0,
    }
}

/// Annualize a total return earned over `n_periods` trading days.
///
/// `(1 + total_return)^(252 / n_periods) - 1`; zero periods yield 0.0.
///
/// # Example
///
/// ```rust
/// use folio_core::annualized_return;
///
/// // 21% over 504 trading days is 10% a year
/// assert!((annualized_return(0.21, 504) - 0.10).abs() < 1e-9);
/// ```
pub fn annualized_return(total_return: f64, n_periods: usize) -> f64 {
    if n_periods == 0 {
        return 0.0;
    }

    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }

    growth.powf(TRADING_DAYS_PER_YEAR / n_periods as f64) - 1.0
}

/// Summarize a return series compounded from `initial_value`.
pub fn summarize(
    label: &str,
    returns: &[f64],
    initial_value: f64,
    risk_free_rate: f64,
) -> Result<SeriesSummary> {
    let curve = value_curve(returns, initial_value)?;
    let final_value = curve[curve.len() - 1];
    let total = total_return(&curve, initial_value);

    Ok(SeriesSummary {
        label: label.to_string(),
        periods: returns.len(),
        initial_value,
        final_value,
        total_return: total,
        annualized_return: annualized_return(total, returns.len()),
        volatility: volatility(returns),
        sharpe_ratio: sharpe_ratio(returns, risk_free_rate),
        max_drawdown: max_drawdown(&curve),
    })
}
