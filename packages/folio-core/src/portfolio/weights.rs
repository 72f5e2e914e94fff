//! Portfolio weight vectors.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance for treating a weight vector as normalized.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Normalize raw weights so they sum to one.
///
/// # Errors
///
/// `InvalidInput` when the slice is empty, a weight is negative or not
/// finite, or the weights sum to zero.
///
/// # Example
///
/// ```rust
/// use folio_core::normalize_weights;
///
/// let weights = normalize_weights(&[0.6, 0.3, 0.0]).unwrap();
/// assert!((weights[0] - 0.6 / 0.9).abs() < 1e-12);
/// ```
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(Error::InvalidInput("Weight list is empty".to_string()));
    }

    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::InvalidInput(format!(
            "Weights must be non-negative numbers, got {}",
            bad
        )));
    }

    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(Error::InvalidInput("Weights sum to zero".to_string()));
    }

    Ok(weights.iter().map(|w| w / sum).collect())
}

/// Ordered `(symbol, weight)` pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weights {
    entries: Vec<(String, f64)>,
}

impl Weights {
    /// Validate raw weights. Symbols are uppercased and must be unique.
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self> {
        let entries: Vec<(String, f64)> = entries
            .into_iter()
            .map(|(symbol, weight)| (symbol.trim().to_uppercase(), weight))
            .collect();

        for (i, (symbol, _)) in entries.iter().enumerate() {
            if symbol.is_empty() {
                return Err(Error::InvalidInput("Empty ticker in weight list".to_string()));
            }
            if entries[..i].iter().any(|(s, _)| s == symbol) {
                return Err(Error::InvalidInput(format!(
                    "Ticker {} listed more than once",
                    symbol
                )));
            }
        }

        // Validates signs and emptiness without keeping the result.
        normalize_weights(&entries.iter().map(|(_, w)| *w).collect::<Vec<_>>())?;

        Ok(Self { entries })
    }

    /// Equal weight across the given symbols.
    pub fn equal(symbols: &[String]) -> Result<Self> {
        Self::new(symbols.iter().map(|s| (s.clone(), 1.0)).collect())
    }

    /// Copy scaled to sum to one.
    pub fn normalized(&self) -> Result<Self> {
        let values = normalize_weights(&self.values())?;
        Ok(Self {
            entries: self
                .entries
                .iter()
                .zip(values)
                .map(|((symbol, _), w)| (symbol.clone(), w))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }

    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, w)| *w).collect()
    }

    /// Weight of a symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<f64> {
        let symbol_upper = symbol.trim().to_uppercase();
        self.entries
            .iter()
            .find(|(s, _)| *s == symbol_upper)
            .map(|(_, w)| *w)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, f64)> {
        self.entries
    }
}
