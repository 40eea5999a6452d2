//! Signal card: the assembled decision record and its notification renderer.

pub mod formatter;
pub mod signal_card;

pub use formatter::SignalCardFormatter;
pub use signal_card::{tax_label_for_broker, validity_label_for_asset_class, SignalCard};
