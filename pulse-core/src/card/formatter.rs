//! Renders a [`SignalCard`] into the notification text.
//!
//! Total function over well-formed cards: every lookup has a fallback and the
//! layout is fixed, so identical cards always render identical strings. The
//! output is plain text plus emoji for maximum messenger compatibility.

use super::signal_card::SignalCard;

pub struct SignalCardFormatter;

impl SignalCardFormatter {
    /// Format a card into the multi-section notification message.
    pub fn format(&self, card: &SignalCard) -> String {
        let marker = signal_marker(&card.signal_classification);
        let sl_pct = ((card.stop_loss - card.entry_price) / card.entry_price) * 100.0;
        let tp_pct = ((card.take_profit - card.entry_price) / card.entry_price) * 100.0;
        let risk_pct_display = card.risk_pct * 100.0;
        let ema_status = if card.ema_fan_aligned {
            "aligned (8 > 20 > 50)"
        } else {
            "not aligned"
        };

        let mut lines = vec![
            format!(
                "{marker} MARKETPULSE SIGNAL — {} {}",
                card.direction, card.ticker
            ),
            String::new(),
            format!(
                "📊 Confidence: Momentum {:.1}σ ({})",
                card.composite_score, card.signal_classification
            ),
            format!(
                "🎯 Trap Order: Stop at ${} | Limit at ${}",
                group_thousands(card.entry_price, 2),
                group_thousands(card.entry_limit, 2)
            ),
            format!(
                "🛑 Stop Loss: ${} ({sl_pct:+.1}%)",
                group_thousands(card.stop_loss, 2)
            ),
            format!(
                "✅ TP: ${} ({tp_pct:+.1}%) — Close 50%",
                group_thousands(card.take_profit, 2)
            ),
            "📐 Trail: Chandelier at HH - (2 × ATR)".to_string(),
            String::new(),
            format!(
                "💰 Size: {:.2} units (€{} risk = {risk_pct_display:.1}%)",
                card.position_size,
                group_thousands(card.risk_amount, 0)
            ),
            format!("⚖️ R:R: 1:{:.1}", card.reward_risk_ratio),
            format!("🏷️ Broker: {} ({})", card.broker, card.tax_label),
            String::new(),
            "📈 Reasoning:".to_string(),
        ];

        for (name, z_score) in card.top_contributors(3) {
            let display = display_component_name(&name);
            let weight = card.component_weights.get(&name).copied().unwrap_or(0.0);
            lines.push(format!(
                "  • {display}: z={z_score:+.2} (weight: {:.0}%)",
                weight * 100.0
            ));
        }

        lines.push(format!("  • EMA fan {ema_status}"));
        lines.push(format!("  • RSI: {:.0}", card.rsi_value));
        lines.push(format!("  • ADX: {:.0}", card.adx_value));
        lines.push(String::new());
        lines.push(format!("⏰ Trap Order valid: {}", card.validity_label));
        lines.push("/executed  /skip  /details".to_string());

        lines.join("\n")
    }
}

/// Classification marker, defaulting to neutral for unknown labels.
fn signal_marker(classification: &str) -> &'static str {
    match classification {
        "STRONG_BUY" => "🟢",
        "BUY" => "🟡",
        "NEUTRAL" => "⚪",
        "SELL" | "STRONG_SELL" => "🔴",
        _ => "⚪",
    }
}

/// Display name for a component key, capitalising unknown keys.
fn display_component_name(name: &str) -> String {
    match name {
        "momentum" => "Momentum".to_string(),
        "trend" => "Trend".to_string(),
        "rsi" => "RSI".to_string(),
        "volume" => "Volume".to_string(),
        "volatility" => "Volatility".to_string(),
        "sr" => "Support/Resistance".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

/// Fixed-decimal rendering with thousands separators ("12,345.67").
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
