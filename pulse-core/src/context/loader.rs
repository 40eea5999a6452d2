//! Loads the three market-level series and builds a [`MarketContext`].
//!
//! Every failure mode short of an unreachable store degrades the affected
//! fields to NaN and logs: one dead series must not abort the cycle. The
//! single hard-error path is a transport failure while listing a prefix,
//! which would otherwise be indistinguishable from "no data ingested yet".

use std::io::Cursor;

use polars::prelude::*;
use tracing::{info, warn};

use crate::store::{ObjectStore, StoreError};

use super::market::MarketContext;

/// Window for the regime moving average.
pub const SMA_PERIOD: usize = 200;

/// Minimum rows required before the moving average is reported.
pub const MIN_ROWS_SMA: usize = SMA_PERIOD;

const VIX_KEY: &str = "macro/VIXCLS.parquet";
const PAYLOAD_EXT: &str = ".parquet";

/// Builds a [`MarketContext`] from object-store payloads.
///
/// Payloads are columnar tables: the volatility series carries a `value`
/// column, the OHLCV series carry a `close` column. OHLCV series are stored
/// as one payload per ingestion run under a fixed prefix; the loader always
/// reads the lexicographically-last key.
pub struct MarketContextLoader<'a> {
    store: &'a dyn ObjectStore,
    benchmark_prefix: String,
    dollar_prefix: String,
}

impl<'a> MarketContextLoader<'a> {
    pub fn new(store: &'a dyn ObjectStore, benchmark_symbol: &str, dollar_symbol: &str) -> Self {
        Self {
            store,
            benchmark_prefix: format!("ohlcv/stocks/{benchmark_symbol}/daily/"),
            dollar_prefix: format!("ohlcv/indices/{dollar_symbol}/daily/"),
        }
    }

    /// Load all three series and return the snapshot.
    ///
    /// Individual fields are NaN when their source is missing or unreadable;
    /// only a listing transport failure returns `Err`.
    pub fn load(&self) -> Result<MarketContext, StoreError> {
        let vix_close = self.load_vix();
        let (benchmark_close, benchmark_sma200) =
            self.load_ohlcv_with_sma(&self.benchmark_prefix, "benchmark")?;
        let (dollar_close, dollar_sma200) =
            self.load_ohlcv_with_sma(&self.dollar_prefix, "dollar")?;

        let ctx = MarketContext {
            vix_close,
            benchmark_close,
            benchmark_sma200,
            dollar_close,
            dollar_sma200,
        };
        info!(
            vix = ctx.vix_close,
            benchmark = ctx.benchmark_close,
            benchmark_sma200 = ctx.benchmark_sma200,
            dollar = ctx.dollar_close,
            dollar_sma200 = ctx.dollar_sma200,
            "market context loaded"
        );
        Ok(ctx)
    }

    fn load_vix(&self) -> f64 {
        let bytes = match self.store.get(VIX_KEY) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = VIX_KEY, error = %e, "VIX payload unavailable");
                return f64::NAN;
            }
        };
        let df = match read_table(&bytes) {
            Ok(df) => df,
            Err(e) => {
                warn!(key = VIX_KEY, error = %e, "VIX payload unreadable");
                return f64::NAN;
            }
        };
        if df.height() == 0 {
            warn!(key = VIX_KEY, "VIX payload is empty");
            return f64::NAN;
        }
        match column_values(&df, "value") {
            Ok(values) => *values.last().unwrap_or(&f64::NAN),
            Err(e) => {
                warn!(key = VIX_KEY, error = %e, "VIX payload has no value column");
                f64::NAN
            }
        }
    }

    /// Latest close and trailing SMA for one OHLCV series.
    ///
    /// Read and parse failures degrade to NaN; list failures propagate.
    fn load_ohlcv_with_sma(&self, prefix: &str, label: &str) -> Result<(f64, f64), StoreError> {
        let nan = f64::NAN;
        let Some(key) = self.find_latest_payload(prefix, label)? else {
            return Ok((nan, nan));
        };

        let bytes = match self.store.get(&key) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%key, error = %e, "{label} payload unavailable");
                return Ok((nan, nan));
            }
        };
        let df = match read_table(&bytes) {
            Ok(df) => df,
            Err(e) => {
                warn!(%key, error = %e, "{label} payload unreadable");
                return Ok((nan, nan));
            }
        };
        if df.height() == 0 {
            warn!(%key, "{label} payload is empty");
            return Ok((nan, nan));
        }

        let closes = match column_values(&df, "close") {
            Ok(closes) => closes,
            Err(e) => {
                warn!(%key, error = %e, "{label} payload has no close column");
                return Ok((nan, nan));
            }
        };

        let latest_close = *closes.last().unwrap_or(&nan);
        if closes.len() < MIN_ROWS_SMA {
            warn!(
                rows = closes.len(),
                required = MIN_ROWS_SMA,
                "{label}: insufficient history for SMA({SMA_PERIOD})"
            );
            return Ok((latest_close, nan));
        }

        Ok((latest_close, trailing_mean(&closes, SMA_PERIOD)))
    }

    /// Lexicographically-last payload key under the prefix.
    ///
    /// `Ok(None)` means no payloads were ingested; `Err` means the listing
    /// itself failed and the caller must not treat the series as merely
    /// missing.
    fn find_latest_payload(&self, prefix: &str, label: &str) -> Result<Option<String>, StoreError> {
        let mut keys = self.store.list(prefix)?;
        keys.retain(|k| k.ends_with(PAYLOAD_EXT));
        if keys.is_empty() {
            warn!(%prefix, "no payloads found for {label}");
            return Ok(None);
        }
        keys.sort();
        Ok(keys.pop())
    }
}

/// Arithmetic mean of the trailing `period` values. NaN when there are fewer
/// than `period` values; NaN inputs inside the window propagate.
fn trailing_mean(values: &[f64], period: usize) -> f64 {
    if values.len() < period {
        return f64::NAN;
    }
    let window = &values[values.len() - period..];
    window.iter().sum::<f64>() / period as f64
}

fn read_table(bytes: &[u8]) -> Result<DataFrame, StoreError> {
    ParquetReader::new(Cursor::new(bytes))
        .finish()
        .map_err(|e| StoreError::Malformed(format!("parquet read: {e}")))
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, StoreError> {
    let ca = df
        .column(name)
        .map_err(|e| StoreError::Malformed(format!("column '{name}': {e}")))?
        .f64()
        .map_err(|e| StoreError::Malformed(format!("column '{name}' type: {e}")))?;
    Ok((0..ca.len())
        .map(|i| ca.get(i).unwrap_or(f64::NAN))
        .collect())
}
