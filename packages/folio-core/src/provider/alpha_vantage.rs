//! Alpha Vantage market data provider.
//!
//! - Adjusted daily closes via `TIME_SERIES_DAILY_ADJUSTED`
//!   (falls back to `4. close` when the adjusted column is absent)
//! - Company ratios via `OVERVIEW`
//!
//! The free tier allows only a handful of calls per minute; throttling shows up
//! either as HTTP 429 or as a `Note`/`Information` message in a 200 response.

use super::MarketDataProvider;
use crate::prices::{PricePoint, PriceSeries};
use crate::scoring::{Fundamentals, Metric};
use crate::{Error, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Alpha Vantage client.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

/// `TIME_SERIES_DAILY_ADJUSTED` / `TIME_SERIES_DAILY` response.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, HashMap<String, String>>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    fn fetch(&self, params: &[(&str, &str)]) -> Result<String> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", self.api_key.as_str()));

        debug!(provider = PROVIDER_ID, ?params, "request");

        let response = self.client.get(&self.base_url).query(&all_params).send()?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(Error::DataUnavailable(format!(
                "{} returned HTTP {}",
                PROVIDER_ID, status
            )));
        }

        Ok(response.text()?)
    }
}

fn is_throttle_message(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("call frequency")
        || lower.contains("rate limit")
        || lower.contains("requests per")
}

/// Map API-level error fields to crate errors.
fn check_api_error(
    error_message: Option<&str>,
    note: Option<&str>,
    information: Option<&str>,
) -> Result<()> {
    if let Some(msg) = error_message {
        return Err(Error::InvalidInput(format!("{}: {}", PROVIDER_ID, msg)));
    }

    for msg in [note, information].into_iter().flatten() {
        if is_throttle_message(msg) {
            return Err(Error::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        warn!(provider = PROVIDER_ID, message = msg, "provider notice");
    }

    Ok(())
}

/// Parse a daily time series body into adjusted closes.
pub fn parse_daily_series(symbol: &str, body: &str) -> Result<PriceSeries> {
    let response: TimeSeriesResponse = serde_json::from_str(body)?;
    check_api_error(
        response.error_message.as_deref(),
        response.note.as_deref(),
        response.information.as_deref(),
    )?;

    let time_series = response
        .time_series
        .ok_or_else(|| Error::DataUnavailable(format!("No price data for {}", symbol)))?;

    let points: Vec<PricePoint> = time_series
        .iter()
        .filter_map(|(date, fields)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let close = fields
                .get("5. adjusted close")
                .or_else(|| fields.get("4. close"))?
                .trim()
                .parse::<f64>()
                .ok()?;
            (close.is_finite() && close > 0.0).then(|| PricePoint::new(date, close))
        })
        .collect();

    if points.is_empty() {
        return Err(Error::DataUnavailable(format!("No price data for {}", symbol)));
    }

    Ok(PriceSeries::new(symbol, points))
}

/// Parse an `OVERVIEW` body into fundamentals.
///
/// Unparsable values ("None", "-") are left out and read as zero when scored.
pub fn parse_overview(symbol: &str, body: &str) -> Result<Fundamentals> {
    let value: Value = serde_json::from_str(body)?;
    let object = match value.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => {
            return Err(Error::DataUnavailable(format!(
                "Ticker {} not found",
                symbol.to_uppercase()
            )))
        }
    };

    let text = |key: &str| object.get(key).and_then(Value::as_str);
    check_api_error(text("Error Message"), text("Note"), text("Information"))?;

    if text("Symbol").is_none() {
        return Err(Error::DataUnavailable(format!(
            "Ticker {} not found",
            symbol.to_uppercase()
        )));
    }

    let mut data = Fundamentals::new(symbol);
    data.name = text("Name").map(str::to_string);
    data.sector = text("Sector").map(str::to_string);

    for metric in Metric::ALL {
        let value = text(metric.alpha_vantage_key()).and_then(|s| s.trim().parse::<f64>().ok());
        if let Some(value) = value {
            data.set(metric, value);
        }
    }

    Ok(data)
}

impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn daily_prices(&mut self, symbol: &str) -> Result<PriceSeries> {
        let body = self.fetch(&[
            ("function", "TIME_SERIES_DAILY_ADJUSTED"),
            ("symbol", symbol),
            ("outputsize", "full"),
        ])?;
        let series = parse_daily_series(symbol, &body)?;
        debug!(symbol = %series.symbol, points = series.len(), "prices loaded");
        Ok(series)
    }

    fn fundamentals(&mut self, symbol: &str) -> Result<Fundamentals> {
        let body = self.fetch(&[("function", "OVERVIEW"), ("symbol", symbol)])?;
        parse_overview(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = r#"{
        "Meta Data": {"2. Symbol": "IBM"},
        "Time Series (Daily)": {
            "2024-01-03": {"4. close": "160.0", "5. adjusted close": "155.0"},
            "2024-01-02": {"4. close": "158.0", "5. adjusted close": "153.0"},
            "2024-01-04": {"4. close": "161.0", "5. adjusted close": "None"}
        }
    }"#;

    #[test]
    fn test_parse_daily_series_uses_adjusted_close() {
        let series = parse_daily_series("ibm", DAILY).unwrap();

        assert_eq!(series.symbol, "IBM");
        // 2024-01-04 has an unparsable adjusted close and is skipped
        assert_eq!(series.closes(), vec![153.0, 155.0]);
    }

    #[test]
    fn test_parse_daily_series_falls_back_to_close() {
        let body = r#"{"Time Series (Daily)": {"2024-01-02": {"4. close": "10.5"}}}"#;
        let series = parse_daily_series("X", body).unwrap();
        assert_eq!(series.closes(), vec![10.5]);
    }

    #[test]
    fn test_parse_daily_series_rate_limited() {
        let body = r#"{"Note": "Our standard API call frequency is 5 calls per minute."}"#;
        let result = parse_daily_series("IBM", body);
        assert!(matches!(result, Err(Error::RateLimited { .. })));

        let body = r#"{"Information": "Our standard API rate limit is 25 requests per day."}"#;
        assert!(matches!(parse_daily_series("IBM", body), Err(Error::RateLimited { .. })));
    }

    #[test]
    fn test_parse_daily_series_error_message() {
        let body = r#"{"Error Message": "Invalid API call. Please retry."}"#;
        assert!(matches!(parse_daily_series("ZZZZ", body), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_daily_series_empty() {
        assert!(matches!(parse_daily_series("IBM", "{}"), Err(Error::DataUnavailable(_))));
        let body = r#"{"Time Series (Daily)": {}}"#;
        assert!(matches!(parse_daily_series("IBM", body), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_parse_overview() {
        let body = r#"{
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "3000000000000",
            "PERatio": "29.5",
            "ProfitMargin": "0.246",
            "ReturnOnEquityTTM": "1.47",
            "QuarterlyRevenueGrowthYOY": "0.021",
            "QuarterlyEarningsGrowthYOY": "0.11",
            "Beta": "1.29",
            "DividendYield": "None"
        }"#;

        let data = parse_overview("aapl", body).unwrap();

        assert_eq!(data.symbol, "AAPL");
        assert_eq!(data.name.as_deref(), Some("Apple Inc"));
        assert_eq!(data.sector.as_deref(), Some("TECHNOLOGY"));
        assert_eq!(data.get(Metric::TrailingPe), 29.5);
        assert_eq!(data.get(Metric::ProfitMargin), 0.246);
        assert_eq!(data.get(Metric::MarketCap), 3.0e12);
        assert!(data.try_get(Metric::DividendYield).is_none());
        assert!(data.try_get(Metric::FreeCashFlow).is_none());
    }

    #[test]
    fn test_parse_overview_unknown_ticker() {
        assert!(matches!(parse_overview("ZZZZ", "{}"), Err(Error::DataUnavailable(_))));
    }

    #[test]
    fn test_parse_overview_rate_limited() {
        let body = r#"{"Note": "API call frequency exceeded"}"#;
        assert!(matches!(parse_overview("AAPL", body), Err(Error::RateLimited { .. })));
    }
}
