//! Risk metrics: volatility, Sharpe ratio, drawdowns, correlation and beta.
//!
//! Returns are per-period fractions (0.01 for 1%). Annualization assumes 252
//! trading periods per year. Standard deviations use the sample (n - 1)
//! denominator.

use crate::types::TRADING_DAYS_PER_YEAR;
use crate::{Error, Result};

/// Below this a standard deviation counts as zero.
const ZERO_VARIANCE: f64 = 1e-12;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Sample covariance of two equally long series.
fn covariance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 {
        return 0.0;
    }

    let (ma, mb) = (mean(a), mean(b));
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / (a.len() - 1) as f64
}

fn check_same_length(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::ConfigurationError(format!(
            "Return series lengths differ: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Annualized volatility: standard deviation of returns times sqrt(252).
pub fn volatility(returns: &[f64]) -> f64 {
    std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized Sharpe ratio.
///
/// Annualized mean excess return over annualized volatility.
///
/// # Arguments
///
/// * `returns` - Daily returns
/// * `risk_free_rate` - Annual risk-free rate
///
/// # Returns
///
/// `None` when there are no returns or volatility is zero.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    let std = std_dev(returns);
    if std <= ZERO_VARIANCE {
        return None;
    }

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    Some((mean(returns) - daily_rf) / std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Drawdown from the running peak at every point of a value series.
///
/// Each element is `(value - peak) / peak`, so always <= 0.
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::MIN;
    values
        .iter()
        .map(|&value| {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                (value - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

/// Maximum drawdown of a value series.
///
/// Returns the worst decline from a running peak as a negative fraction
/// (e.g., -0.15 for a 15% drawdown), or 0.0 when the series never falls.
pub fn max_drawdown(values: &[f64]) -> f64 {
    drawdown_series(values).into_iter().fold(0.0, f64::min)
}

/// Pearson correlation of two return series.
///
/// `None` when either series has zero variance.
pub fn correlation(a: &[f64], b: &[f64]) -> Result<Option<f64>> {
    check_same_length(a, b)?;

    let (sa, sb) = (std_dev(a), std_dev(b));
    if sa <= ZERO_VARIANCE || sb <= ZERO_VARIANCE {
        return Ok(None);
    }

    let corr = covariance(a, b) / (sa * sb);
    Ok(Some(corr.clamp(-1.0, 1.0)))
}

/// Beta of `returns` against `benchmark`: covariance over benchmark variance.
pub fn beta(returns: &[f64], benchmark: &[f64]) -> Result<Option<f64>> {
    check_same_length(returns, benchmark)?;

    let variance = std_dev(benchmark).powi(2);
    if variance <= ZERO_VARIANCE * ZERO_VARIANCE {
        return Ok(None);
    }

    Ok(Some(covariance(returns, benchmark) / variance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_std_dev_sample() {
        // mean 5, squared deviations sum to 32, n - 1 = 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(std_dev(&values), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert_eq!(std_dev(&[1.0]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_volatility() {
        let returns: Vec<f64> = vec![
            0.01, -0.01, 0.02, -0.02, 0.01, -0.01, 0.015, -0.015, 0.005, -0.005,
        ];

        let vol = volatility(&returns);

        // daily std of about 0.0137, annualized to about 0.218
        assert_abs_diff_eq!(vol, 0.218, epsilon = 0.001);
        assert_abs_diff_eq!(vol, std_dev(&returns) * 252.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_sharpe_ratio_sign() {
        let good: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 0.004 } else { -0.001 }).collect();
        assert!(sharpe_ratio(&good, 0.0).unwrap() > 0.0);

        let bad: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 0.001 } else { -0.004 }).collect();
        assert!(sharpe_ratio(&bad, 0.0).unwrap() < 0.0);
    }

    #[test]
    fn test_sharpe_ratio_value() {
        let returns = [0.01, -0.005, 0.008, -0.003, 0.012];
        let m = returns.iter().sum::<f64>() / 5.0;
        let expected = (m - 0.04 / 252.0) / std_dev(&returns) * 252.0_f64.sqrt();

        assert_abs_diff_eq!(sharpe_ratio(&returns, 0.04).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_sharpe_ratio_zero_volatility() {
        let flat: Vec<f64> = vec![0.001; 50];
        assert!(sharpe_ratio(&flat, 0.02).is_none());
        assert!(sharpe_ratio(&[], 0.02).is_none());
    }

    #[test]
    fn test_max_drawdown() {
        // 100 -> 120 -> 90 -> 130 -> 104
        let values = [100.0, 120.0, 90.0, 130.0, 104.0];
        assert_abs_diff_eq!(max_drawdown(&values), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_no_loss() {
        let values = [100.0, 101.0, 105.0, 110.0];
        assert_eq!(max_drawdown(&values), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let series: Vec<Vec<f64>> = vec![
            vec![1.0],
            vec![5.0, 4.0, 3.0, 2.0, 1.0],
            vec![1.0, 2.0, 1.5, 3.0, 2.9, 0.5],
            vec![10.0, 10.0, 10.0],
        ];

        for values in series {
            assert!(max_drawdown(&values) <= 0.0);
            assert!(drawdown_series(&values).iter().all(|d| *d <= 0.0));
        }
    }

    #[test]
    fn test_drawdown_series() {
        let dd = drawdown_series(&[100.0, 80.0, 120.0, 90.0]);
        assert_eq!(dd.len(), 4);
        assert_abs_diff_eq!(dd[0], 0.0);
        assert_abs_diff_eq!(dd[1], -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(dd[2], 0.0);
        assert_abs_diff_eq!(dd[3], -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_correlation() {
        let a = [0.01, 0.02, -0.01, 0.03, 0.00];
        let doubled: Vec<f64> = a.iter().map(|x| x * 2.0).collect();
        let inverted: Vec<f64> = a.iter().map(|x| -x).collect();

        assert_abs_diff_eq!(correlation(&a, &doubled).unwrap().unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(correlation(&a, &inverted).unwrap().unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_correlation_zero_variance_and_mismatch() {
        let a = [0.01, 0.02, -0.01];
        assert!(correlation(&a, &[0.0, 0.0, 0.0]).unwrap().is_none());
        assert!(matches!(correlation(&a, &[0.0, 0.0]), Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_beta() {
        let bench = [0.01, -0.02, 0.015, 0.005, -0.01];
        let levered: Vec<f64> = bench.iter().map(|x| x * 1.5).collect();

        assert_abs_diff_eq!(beta(&levered, &bench).unwrap().unwrap(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(beta(&bench, &bench).unwrap().unwrap(), 1.0, epsilon = 1e-12);
        assert!(beta(&bench, &[0.0; 5]).unwrap().is_none());
    }
}
