//! SignalCard — everything needed to render one actionable signal.
//!
//! Assembled by the scoring layer from composite scores and calculated order
//! parameters; this module only defines the record, its ranking helper, and
//! its content fingerprint.

use std::collections::BTreeMap;

use serde::Serialize;

/// All data needed to render a signal notification.
///
/// `component_scores` keeps insertion order: [`SignalCard::top_contributors`]
/// breaks absolute-value ties in favour of earlier entries.
#[derive(Debug, Clone, Serialize)]
pub struct SignalCard {
    pub ticker: String,
    /// Trade direction, e.g. "LONG".
    pub direction: String,
    /// Composite classification, e.g. "STRONG_BUY".
    pub signal_classification: String,
    /// Final weighted z-score.
    pub composite_score: f64,
    /// Per-component z-scores, in scoring order.
    pub component_scores: Vec<(String, f64)>,
    /// Weight applied to each component.
    pub component_weights: BTreeMap<String, f64>,
    pub entry_price: f64,
    pub entry_limit: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    pub risk_amount: f64,
    pub risk_pct: f64,
    pub reward_risk_ratio: f64,
    /// Execution broker (IG, IBKR, PAPER).
    pub broker: String,
    pub tax_label: String,
    /// Order validity window, e.g. "1 session".
    pub validity_label: String,
    pub adx_value: f64,
    pub rsi_value: f64,
    /// Whether the short/medium/long EMA fan is aligned (8 > 20 > 50).
    pub ema_fan_aligned: bool,
}

impl SignalCard {
    /// Top `n` components by absolute z-score, descending, sign preserved.
    ///
    /// The sort is stable, so components with equal magnitude keep their
    /// scoring order. Does not mutate the card.
    pub fn top_contributors(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked = self.component_scores.clone();
        ranked.sort_by(|a, b| {
            b.1.abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }

    /// Content hash of the card, usable as a delivery dedupe key.
    ///
    /// Deterministic: the weight map is ordered and the score list keeps its
    /// own order, so equal cards always hash equal.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).expect("SignalCard serialization failed");
        blake3::hash(&json).to_hex().to_string()
    }
}

/// Tax treatment label for a broker, passing unknown brokers through.
pub fn tax_label_for_broker(broker: &str) -> String {
    match broker {
        "IG" => "TAX FREE".to_string(),
        "IBKR" => "33% CGT".to_string(),
        "PAPER" => "PAPER".to_string(),
        other => other.to_string(),
    }
}

/// Order validity window for an asset class.
pub fn validity_label_for_asset_class(asset_class: &str) -> String {
    match asset_class {
        "COMMODITY" | "FOREX" => "24 hours".to_string(),
        _ => "1 session".to_string(),
    }
}

/// Fully-populated card for rendering and ranking tests.
#[cfg(test)]
pub(crate) fn sample_card() -> SignalCard {
    let component_scores = vec![
        ("momentum".to_string(), -2.0),
        ("trend".to_string(), 1.5),
        ("rsi".to_string(), 0.3),
    ];
    let component_weights = BTreeMap::from([
        ("momentum".to_string(), 0.40),
        ("trend".to_string(), 0.35),
        ("rsi".to_string(), 0.25),
    ]);
    SignalCard {
        ticker: "XAU/USD".to_string(),
        direction: "LONG".to_string(),
        signal_classification: "STRONG_BUY".to_string(),
        composite_score: 2.1,
        component_scores,
        component_weights,
        entry_price: 100.20,
        entry_limit: 100.70,
        stop_loss: 80.20,
        take_profit: 130.20,
        position_size: 10.0,
        risk_amount: 200.0,
        risk_pct: 0.02,
        reward_risk_ratio: 1.5,
        broker: "IG".to_string(),
        tax_label: "TAX FREE".to_string(),
        validity_label: "24 hours".to_string(),
        adx_value: 30.0,
        rsi_value: 62.0,
        ema_fan_aligned: true,
    }
}
