//! Date-aligned price table.

use super::PriceSeries;
use crate::{Error, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How to treat a date on which some symbols have no observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Carry the last known price forward. Dates before every symbol has
    /// traded at least once are dropped.
    #[default]
    ForwardFill,
    /// Keep only dates on which every symbol has a price.
    Drop,
}

/// Adjusted close prices, one row per date and one column per symbol.
///
/// Invariants: at least one row, dates strictly increasing, every row as wide
/// as `symbols`, every price finite and positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl PriceTable {
    /// Build a table from raw rows.
    ///
    /// Fails with `DataUnavailable` when the table is empty or its shape does
    /// not line up, and with `InvalidInput` on bad symbols or prices.
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if dates.is_empty() || symbols.is_empty() {
            return Err(Error::DataUnavailable("Price table is empty".to_string()));
        }

        if dates.len() != rows.len() {
            return Err(Error::DataUnavailable(format!(
                "Price table misaligned: {} dates but {} rows",
                dates.len(),
                rows.len()
            )));
        }

        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::DataUnavailable(format!(
                "Price table dates not strictly increasing at {}",
                pair[1]
            )));
        }

        let symbols: Vec<String> = symbols.into_iter().map(|s| s.trim().to_uppercase()).collect();
        let unique: BTreeSet<&String> = symbols.iter().collect();
        if unique.len() != symbols.len() || symbols.iter().any(|s| s.is_empty()) {
            return Err(Error::InvalidInput(format!(
                "Price table symbols must be unique and non-empty: {:?}",
                symbols
            )));
        }

        for (date, row) in dates.iter().zip(&rows) {
            if row.len() != symbols.len() {
                return Err(Error::DataUnavailable(format!(
                    "Price table misaligned on {}: expected {} prices, got {}",
                    date,
                    symbols.len(),
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|p| !p.is_finite() || **p <= 0.0) {
                return Err(Error::InvalidInput(format!(
                    "Invalid price {} on {}",
                    bad, date
                )));
            }
        }

        Ok(Self {
            dates,
            symbols,
            rows,
        })
    }

    /// Align several price series on the union of their dates.
    pub fn from_series(series: &[PriceSeries], policy: MissingValuePolicy) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::DataUnavailable("No price series supplied".to_string()));
        }

        if let Some(empty) = series.iter().find(|s| s.is_empty()) {
            return Err(Error::DataUnavailable(format!(
                "No prices returned for {}",
                empty.symbol
            )));
        }

        // Later observations for a duplicated date win.
        let lookups: Vec<BTreeMap<NaiveDate, f64>> = series
            .iter()
            .map(|s| s.points.iter().map(|p| (p.date, p.close)).collect())
            .collect();

        let all_dates: BTreeSet<NaiveDate> =
            lookups.iter().flat_map(|m| m.keys().copied()).collect();

        let mut dates = Vec::new();
        let mut rows = Vec::new();
        let mut last_seen: Vec<Option<f64>> = vec![None; series.len()];

        for date in all_dates {
            let observed: Vec<Option<f64>> =
                lookups.iter().map(|m| m.get(&date).copied()).collect();

            let row: Option<Vec<f64>> = match policy {
                MissingValuePolicy::Drop => observed.iter().copied().collect(),
                MissingValuePolicy::ForwardFill => {
                    for (slot, value) in last_seen.iter_mut().zip(&observed) {
                        if value.is_some() {
                            *slot = *value;
                        }
                    }
                    last_seen.iter().copied().collect()
                }
            };

            if let Some(row) = row {
                dates.push(date);
                rows.push(row);
            }
        }

        if dates.is_empty() {
            return Err(Error::DataUnavailable(
                "Price series share no common dates".to_string(),
            ));
        }

        let symbols = series.iter().map(|s| s.symbol.clone()).collect();
        Self::new(dates, symbols, rows)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Column position of a symbol (case-insensitive).
    pub fn column_index(&self, symbol: &str) -> Option<usize> {
        let symbol_upper = symbol.trim().to_uppercase();
        self.symbols.iter().position(|s| *s == symbol_upper)
    }

    /// Prices of one symbol over all dates.
    pub fn column(&self, symbol: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(symbol)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Sub-table with the given symbols in the given order.
    pub fn select(&self, symbols: &[String]) -> Result<Self> {
        let indices = symbols
            .iter()
            .map(|s| {
                self.column_index(s).ok_or_else(|| {
                    Error::DataUnavailable(format!("No prices for {} in price table", s))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let rows: Vec<Vec<f64>> = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect();

        Self::new(self.dates.clone(), symbols.to_vec(), rows)
    }

    /// Keep only the trailing `years` of history, measured back from the last date.
    ///
    /// The cutoff is `years * 12` calendar months before the last date and is
    /// itself kept.
    pub fn trailing_years(&self, years: u32) -> Self {
        let cutoff = self
            .last_date()
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);

        let start = self.dates.partition_point(|d| *d < cutoff);
        Self {
            dates: self.dates[start..].to_vec(),
            symbols: self.symbols.clone(),
            rows: self.rows[start..].to_vec(),
        }
    }
}
