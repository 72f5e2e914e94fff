//! Offline provider reading `<dir>/<SYMBOL>.csv` files.
//!
//! Each file needs a `date` column (`%Y-%m-%d`) and one close column; the
//! adjusted close is preferred when present. Header matching ignores case.

use super::MarketDataProvider;
use crate::prices::{PricePoint, PriceSeries};
use crate::scoring::Fundamentals;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROVIDER_ID: &str = "CSV";

/// Close columns in order of preference.
const CLOSE_COLUMNS: [&str; 4] = ["adjusted_close", "adj_close", "adj close", "close"];

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.trim().to_uppercase()))
    }
}

/// Parse CSV price history from any reader.
pub fn read_price_csv<R: Read>(symbol: &str, reader: R) -> Result<PriceSeries> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect();
    let date_idx = headers
        .iter()
        .position(|h| h == "date")
        .ok_or_else(|| Error::InvalidInput(format!("{}: missing date column", symbol)))?;
    let close_idx = CLOSE_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .ok_or_else(|| Error::InvalidInput(format!("{}: missing close column", symbol)))?;

    let mut points = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let raw_close = record.get(close_idx).unwrap_or_default();

        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            Error::InvalidInput(format!(
                "{} row {}: bad date {:?}: {}",
                symbol,
                line + 1,
                raw_date,
                e
            ))
        })?;

        // Blank closes are gaps, left to the table's missing-value policy.
        if raw_close.is_empty() {
            continue;
        }
        let close: f64 = raw_close.parse().map_err(|_| {
            Error::InvalidInput(format!("{} row {}: bad close {:?}", symbol, line + 1, raw_close))
        })?;
        points.push(PricePoint::new(date, close));
    }

    if points.is_empty() {
        return Err(Error::DataUnavailable(format!("No price data for {}", symbol)));
    }

    Ok(PriceSeries::new(symbol, points))
}

impl MarketDataProvider for CsvProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn daily_prices(&mut self, symbol: &str) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(Error::DataUnavailable(format!(
                "No price file for {} at {}",
                symbol,
                path.display()
            )));
        }

        let file = std::fs::File::open(&path)?;
        let series = read_price_csv(symbol, file)?;
        debug!(
            symbol = %series.symbol,
            points = series.len(),
            path = %path.display(),
            "prices loaded"
        );
        Ok(series)
    }

    fn fundamentals(&mut self, symbol: &str) -> Result<Fundamentals> {
        Err(Error::DataUnavailable(format!(
            "{} provider has no fundamentals for {}",
            PROVIDER_ID, symbol
        )))
    }
}
