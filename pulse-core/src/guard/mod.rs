//! Freshness gating for the decision pipeline.

pub mod staleness;

pub use staleness::{SourceStaleness, StalenessGuard, StalenessResult, STALENESS_THRESHOLD_HOURS};
