//! MarketContext — immutable snapshot of market-level data plus regime gates.
//!
//! Raw fields use NaN for "unavailable"; the derived gates convert that into
//! an explicit tri-state `Option<bool>` so a half-loaded snapshot can never
//! silently compare its way into a trade.

use serde::Serialize;

/// VIX level above which the panic gate closes.
///
/// Shares a literal with the calculator's ADX divisor by coincidence only;
/// the two are tuned independently.
pub const VIX_PANIC_THRESHOLD: f64 = 30.0;

/// Snapshot of market-level data for one evaluation cycle.
///
/// Constructed once per cycle by [`super::MarketContextLoader`], never
/// mutated, discarded after the cycle. Any field may be NaN when its source
/// was missing, empty, or unreadable.
#[derive(Debug, Clone, Serialize)]
pub struct MarketContext {
    /// Latest volatility-index close.
    pub vix_close: f64,
    /// Latest benchmark close.
    pub benchmark_close: f64,
    /// Benchmark 200-day simple moving average.
    pub benchmark_sma200: f64,
    /// Latest dollar-proxy close.
    pub dollar_close: f64,
    /// Dollar-proxy 200-day simple moving average.
    pub dollar_sma200: f64,
}

impl MarketContext {
    /// Benchmark trades above its 200-day SMA. `None` if either side is NaN.
    pub fn benchmark_above_sma200(&self) -> Option<bool> {
        gate(self.benchmark_close, self.benchmark_sma200, |c, s| c > s)
    }

    /// Dollar proxy trades below its 200-day SMA (weak dollar). `None` if
    /// either side is NaN.
    pub fn dollar_below_sma200(&self) -> Option<bool> {
        gate(self.dollar_close, self.dollar_sma200, |c, s| c < s)
    }

    /// VIX sits below the panic threshold. `None` if VIX is NaN.
    pub fn vix_below_panic(&self) -> Option<bool> {
        if self.vix_close.is_nan() {
            return None;
        }
        Some(self.vix_close < VIX_PANIC_THRESHOLD)
    }

    /// Fold of all three gates, fail-closed: `Some(true)` only when every
    /// gate is `Some(true)`, `None` as soon as any gate is undefined.
    pub fn gates_pass(&self) -> Option<bool> {
        let gates = [
            self.benchmark_above_sma200(),
            self.dollar_below_sma200(),
            self.vix_below_panic(),
        ];
        if gates.iter().any(|g| g.is_none()) {
            return None;
        }
        Some(gates.iter().all(|g| *g == Some(true)))
    }
}

fn gate(close: f64, sma: f64, cmp: impl Fn(f64, f64) -> bool) -> Option<bool> {
    if close.is_nan() || sma.is_nan() {
        return None;
    }
    Some(cmp(close, sma))
}
