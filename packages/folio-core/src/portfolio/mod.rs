//! Portfolio return engine.
//!
//! Price table -> return matrix -> weighted portfolio returns -> value curve
//! and risk/performance metrics.

mod engine;
mod performance;
mod returns;
mod risk;
mod weights;

pub use engine::{BacktestEngine, PORTFOLIO_LABEL};
pub use performance::{annualized_return, summarize, total_return};
pub use returns::{
    compute_returns, cumulative_value, portfolio_returns, simple_returns, value_curve,
    ReturnMatrix,
};
pub use risk::{
    beta, correlation, drawdown_series, max_drawdown, sharpe_ratio, std_dev, volatility,
};
pub use weights::{normalize_weights, Weights, WEIGHT_SUM_TOLERANCE};
