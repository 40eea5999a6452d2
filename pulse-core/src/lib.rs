//! MarketPulse core — the daily trade-decision pipeline.
//!
//! Four cooperating pieces, all synchronous and stateless:
//! - Market context: snapshot of VIX / benchmark / dollar-proxy series with
//!   tri-state regime gates (`Option<bool>`; NaN inputs gate to `None`)
//! - Staleness guard: fail-closed freshness verdict over the data sources
//! - Trap-order calculator: pure entry/stop/target/sizing arithmetic
//! - Signal card: the assembled decision record and its notification text
//!
//! Storage is consumed behind two read-only traits (`ObjectStore`,
//! `FreshnessRegistry`); scheduling, scoring, and delivery live outside this
//! crate.

pub mod card;
pub mod config;
pub mod context;
pub mod guard;
pub mod orders;
pub mod store;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types are Send + Sync.
    ///
    /// The evaluation cycle is safe to run from a worker thread; this breaks
    /// the build if a field ever ruins that.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<context::MarketContext>();
        require_sync::<context::MarketContext>();
        require_send::<guard::SourceStaleness>();
        require_sync::<guard::SourceStaleness>();
        require_send::<guard::StalenessResult>();
        require_sync::<guard::StalenessResult>();
        require_send::<orders::TrapOrderParams>();
        require_sync::<orders::TrapOrderParams>();
        require_send::<orders::TrapOrderCalculator>();
        require_sync::<orders::TrapOrderCalculator>();
        require_send::<card::SignalCard>();
        require_sync::<card::SignalCard>();
        require_send::<config::PulseConfig>();
        require_sync::<config::PulseConfig>();
        require_send::<store::FsObjectStore>();
        require_sync::<store::FsObjectStore>();
        require_send::<store::JsonFileRegistry>();
        require_sync::<store::JsonFileRegistry>();
    }
}
