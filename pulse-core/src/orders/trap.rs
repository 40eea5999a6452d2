//! Trap-order parameter calculator.
//!
//! A trap order is a buy-stop placed just above the signal candle's high with
//! a limit cap, an ATR-derived stop, and an ADX-scaled target. Entry sits
//! above the high to avoid false breakouts; the limit caps slippage; the
//! ADX-scaled target lets trending conditions run while bounding reward
//! variance between 2.5x and 4.5x risk.
//!
//! Pure arithmetic: no I/O, no state, identical inputs give bit-identical
//! outputs.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Entry offset above the signal candle high, in ATRs.
const ENTRY_ATR_FACTOR: f64 = 0.02;

/// Limit offset above the entry price, in ATRs.
const LIMIT_ATR_FACTOR: f64 = 0.05;

/// Stop distance below entry, in ATRs. Also the per-unit risk.
const STOP_ATR_MULTIPLE: f64 = 2.0;

/// Take-profit ADX scaling: TP_BASE + adx / TP_ADX_DIVISOR, clamped.
const TP_BASE: f64 = 2.0;
const TP_ADX_DIVISOR: f64 = 30.0;
const TP_MIN_MULTIPLE: f64 = 2.5;
const TP_MAX_MULTIPLE: f64 = 4.5;

/// Default concentration cap as a fraction of portfolio equity.
pub const DEFAULT_MAX_POSITION_PCT: f64 = 0.15;

/// Precondition violations. These are programming errors on the caller's
/// side, not data conditions, and are never defaulted away.
#[derive(Debug, Error, PartialEq)]
pub enum TrapOrderError {
    #[error("ATR must be > 0, got {0}")]
    NonPositiveAtr(f64),

    #[error("portfolio equity must be > 0, got {0}")]
    NonPositiveEquity(f64),
}

/// Calculated trap-order parameters for one signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrapOrderParams {
    /// Buy-stop trigger price.
    pub entry_price: f64,
    /// Limit cap above the trigger.
    pub entry_limit: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// ATR multiple used for the target (2.5-4.5).
    pub tp_multiplier: f64,
    /// Units to buy.
    pub position_size: f64,
    /// Currency at risk if the stop is hit.
    pub risk_amount: f64,
    /// Risk as a fraction of portfolio equity.
    pub risk_pct: f64,
    /// Target distance over stop distance.
    pub reward_risk_ratio: f64,
}

/// Computes trap-order parameters from candle, indicator, and account inputs.
#[derive(Debug, Clone)]
pub struct TrapOrderCalculator {
    max_position_pct: f64,
}

impl Default for TrapOrderCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl TrapOrderCalculator {
    pub fn new() -> Self {
        Self {
            max_position_pct: DEFAULT_MAX_POSITION_PCT,
        }
    }

    pub fn with_max_position_pct(max_position_pct: f64) -> Self {
        Self { max_position_pct }
    }

    /// Calculate all order parameters.
    ///
    /// Sizing is dual-constraint: the smaller of the per-trade risk budget
    /// and the portfolio concentration cap wins.
    pub fn calculate(
        &self,
        signal_candle_high: f64,
        atr: f64,
        adx: f64,
        portfolio_equity: f64,
        risk_per_trade_pct: f64,
    ) -> Result<TrapOrderParams, TrapOrderError> {
        if atr <= 0.0 {
            return Err(TrapOrderError::NonPositiveAtr(atr));
        }
        if portfolio_equity <= 0.0 {
            return Err(TrapOrderError::NonPositiveEquity(portfolio_equity));
        }

        let entry_price = signal_candle_high + ENTRY_ATR_FACTOR * atr;
        let entry_limit = entry_price + LIMIT_ATR_FACTOR * atr;
        let stop_loss = entry_price - STOP_ATR_MULTIPLE * atr;

        let adx_clamped = adx.max(0.0);
        let tp_multiplier = (TP_BASE + adx_clamped / TP_ADX_DIVISOR)
            .clamp(TP_MIN_MULTIPLE, TP_MAX_MULTIPLE);
        let take_profit = entry_price + tp_multiplier * atr;

        let risk_per_unit = STOP_ATR_MULTIPLE * atr;
        let risk_budget_size = (portfolio_equity * risk_per_trade_pct) / risk_per_unit;
        let cap_size = (portfolio_equity * self.max_position_pct) / entry_price;
        let position_size = risk_budget_size.min(cap_size);

        let risk_amount = position_size * risk_per_unit;
        let reward_risk_ratio = (take_profit - entry_price) / (entry_price - stop_loss);

        info!(
            entry = entry_price,
            stop = stop_loss,
            target = take_profit,
            tp_multiplier,
            size = position_size,
            rr = reward_risk_ratio,
            "trap order calculated"
        );

        Ok(TrapOrderParams {
            entry_price,
            entry_limit,
            stop_loss,
            take_profit,
            tp_multiplier,
            position_size,
            risk_amount,
            risk_pct: risk_per_trade_pct,
            reward_risk_ratio,
        })
    }
}
