//! Fetch several symbols and align them into one price table.

use super::MarketDataProvider;
use crate::prices::{MissingValuePolicy, PriceTable};
use crate::{Error, Result};
use tracing::info;

/// Fetch daily prices for every symbol and build an aligned [`PriceTable`].
///
/// Symbols are fetched in order; the first failure aborts the load. With
/// `lookback_years` set the table is cut to that many trailing years.
pub fn load_price_table<P: MarketDataProvider + ?Sized>(
    provider: &mut P,
    symbols: &[String],
    policy: MissingValuePolicy,
    lookback_years: Option<u32>,
) -> Result<PriceTable> {
    if symbols.is_empty() {
        return Err(Error::InvalidInput("No symbols to load".to_string()));
    }

    let series = symbols
        .iter()
        .map(|symbol| provider.daily_prices(symbol))
        .collect::<Result<Vec<_>>>()?;

    let table = PriceTable::from_series(&series, policy)?;
    let table = match lookback_years {
        Some(years) => table.trailing_years(years),
        None => table,
    };

    if table.is_empty() {
        return Err(Error::DataUnavailable(
            "No prices left after applying the lookback window".to_string(),
        ));
    }

    info!(
        provider = provider.id(),
        symbols = symbols.len(),
        dates = table.len(),
        start = %table.first_date(),
        end = %table.last_date(),
        "price table loaded"
    );

    Ok(table)
}
