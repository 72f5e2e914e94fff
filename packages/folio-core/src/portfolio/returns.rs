//! Return series: per-asset returns, weighted portfolio returns, value curves.

use super::weights::Weights;
use crate::prices::PriceTable;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Simple period returns of every column of a price table.
///
/// Row `t` holds `price[t + 1] / price[t] - 1`, dated at `t + 1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnMatrix {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of return periods.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns of one symbol (case-insensitive).
    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let symbol_upper = symbol.trim().to_uppercase();
        let idx = self.symbols.iter().position(|s| *s == symbol_upper)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Period-over-period returns of a single price series.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Compute the return matrix of a price table; the first row is dropped.
///
/// # Errors
///
/// `DataUnavailable` when the table has fewer than two dates.
pub fn compute_returns(prices: &PriceTable) -> Result<ReturnMatrix> {
    if prices.len() < 2 {
        return Err(Error::DataUnavailable(format!(
            "Need at least 2 prices to compute returns, got {}",
            prices.len()
        )));
    }

    let rows: Vec<Vec<f64>> = prices
        .rows()
        .windows(2)
        .map(|w| w[1].iter().zip(&w[0]).map(|(cur, prev)| cur / prev - 1.0).collect())
        .collect();

    Ok(ReturnMatrix {
        dates: prices.dates()[1..].to_vec(),
        symbols: prices.symbols().to_vec(),
        rows,
    })
}

/// Weighted sum of asset returns per period.
///
/// Weights are matched to columns by symbol and normalized first, which
/// amounts to rebalancing back to the target weights every period.
///
/// # Errors
///
/// `ConfigurationError` when the weights do not name exactly the matrix's
/// symbols.
pub fn portfolio_returns(returns: &ReturnMatrix, weights: &Weights) -> Result<Vec<f64>> {
    if weights.len() != returns.symbols().len() {
        return Err(Error::ConfigurationError(format!(
            "{} weights given for {} assets",
            weights.len(),
            returns.symbols().len()
        )));
    }

    let normalized = weights.normalized()?;
    let aligned = returns
        .symbols()
        .iter()
        .map(|symbol| {
            normalized.get(symbol).ok_or_else(|| {
                Error::ConfigurationError(format!("No weight given for {}", symbol))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(returns
        .rows()
        .iter()
        .map(|row| row.iter().zip(&aligned).map(|(r, w)| r * w).sum::<f64>())
        .collect())
}

/// Running value of `capital` compounded by each return.
///
/// Element `t` is the value after period `t`.
///
/// # Example
///
/// ```rust
/// use folio_core::cumulative_value;
///
/// let values = cumulative_value(&[0.10, 0.10], 1000.0).unwrap();
/// assert!((values[0] - 1100.0).abs() < 1e-9);
/// assert!((values[1] - 1210.0).abs() < 1e-9);
/// ```
pub fn cumulative_value(returns: &[f64], capital: f64) -> Result<Vec<f64>> {
    if !capital.is_finite() || capital <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Initial capital must be positive, got {}",
            capital
        )));
    }

    let mut value = capital;
    Ok(returns
        .iter()
        .map(|r| {
            value *= 1.0 + r;
            value
        })
        .collect())
}

/// Like [`cumulative_value`] but starting with `capital` itself.
pub fn value_curve(returns: &[f64], capital: f64) -> Result<Vec<f64>> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    curve.push(capital);
    curve.extend(cumulative_value(returns, capital)?);
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn table(symbols: &[&str], rows: Vec<Vec<f64>>) -> PriceTable {
        let dates = (0..rows.len() as u32).map(|i| day(i + 1)).collect();
        PriceTable::new(dates, symbols.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_compute_returns_single_asset() {
        let prices = table(&["AAA"], vec![vec![100.0], vec![110.0], vec![121.0]]);
        let returns = compute_returns(&prices).unwrap();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns.dates(), &[day(2), day(3)]);
        let col = returns.column("AAA").unwrap();
        assert_abs_diff_eq!(col[0], 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(col[1], 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_returns_needs_two_rows() {
        let prices = table(&["AAA"], vec![vec![100.0]]);
        assert!(matches!(compute_returns(&prices), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_simple_returns() {
        let r = simple_returns(&[50.0, 25.0, 50.0]);
        assert_eq!(r, vec![-0.5, 1.0]);
        assert!(simple_returns(&[1.0]).is_empty());
    }

    #[test]
    fn test_portfolio_returns_weighted() {
        let prices = table(
            &["AAA", "BBB"],
            vec![vec![100.0, 50.0], vec![110.0, 45.0], vec![110.0, 54.0]],
        );
        let returns = compute_returns(&prices).unwrap();

        // Weights given in a different order and not normalized
        let weights =
            Weights::new(vec![("BBB".to_string(), 1.0), ("AAA".to_string(), 3.0)]).unwrap();
        let port = portfolio_returns(&returns, &weights).unwrap();

        // Period 1: 0.75 * 0.10 + 0.25 * -0.10 = 0.05
        // Period 2: 0.75 * 0.00 + 0.25 * 0.20 = 0.05
        assert_abs_diff_eq!(port[0], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(port[1], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_portfolio_returns_count_mismatch() {
        let prices = table(&["AAA", "BBB"], vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        let returns = compute_returns(&prices).unwrap();

        let weights = Weights::new(vec![("AAA".to_string(), 1.0)]).unwrap();
        let result = portfolio_returns(&returns, &weights);
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_portfolio_returns_unknown_symbol() {
        let prices = table(&["AAA", "BBB"], vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        let returns = compute_returns(&prices).unwrap();

        let weights =
            Weights::new(vec![("AAA".to_string(), 1.0), ("CCC".to_string(), 1.0)]).unwrap();
        let result = portfolio_returns(&returns, &weights);
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_cumulative_value_example() {
        let values = cumulative_value(&[0.10, 0.10], 1000.0).unwrap();
        assert_abs_diff_eq!(values[0], 1100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(values[1], 1210.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cumulative_value_flat_returns() {
        let values = cumulative_value(&[0.0; 20], 2500.0).unwrap();
        assert!(values.iter().all(|v| *v == 2500.0));
    }

    #[test]
    fn test_cumulative_value_invalid_capital() {
        assert!(matches!(cumulative_value(&[0.1], 0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(cumulative_value(&[0.1], -5.0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_value_curve_starts_at_capital() {
        let curve = value_curve(&[0.05, -0.02, 0.01], 10000.0).unwrap();
        assert_eq!(curve.len(), 4);
        assert_eq!(curve[0], 10000.0);
        assert_abs_diff_eq!(curve[1], 10500.0, epsilon = 1e-9);
    }
}
