//! Staleness guard — fail-closed freshness checks for the market-level sources.
//!
//! Every lookup error, missing record, missing attribute, or unparseable
//! timestamp marks that source stale; nothing propagates as an error and no
//! single source can abort the other checks. The pass/fail fold and the alert
//! text are pure functions over the per-source results.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::store::{FreshnessRegistry, RegistryTable};

/// Maximum age before a source is considered stale.
pub const STALENESS_THRESHOLD_HOURS: f64 = 24.0;

/// Monitored sources: label, record namespace, record key, timestamp attribute.
const SOURCES: [(&str, RegistryTable, &str, &str); 3] = [
    ("VIX", RegistryTable::System, "macro_staleness_VIXCLS", "updated_at"),
    ("SPY", RegistryTable::Symbols, "SPY", "last_updated_date"),
    ("DXY", RegistryTable::Symbols, "UUP", "last_updated_date"),
];

/// Freshness verdict for a single source.
///
/// Invariant: `is_stale` whenever `last_updated` is `None`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStaleness {
    pub label: String,
    pub is_stale: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub age_hours: Option<f64>,
}

impl SourceStaleness {
    fn never_updated(label: &str) -> Self {
        Self {
            label: label.to_string(),
            is_stale: true,
            last_updated: None,
            age_hours: None,
        }
    }
}

/// Aggregate verdict across all monitored sources.
///
/// `passed` iff no source is stale; `alert_message` is populated exactly when
/// the guard fails.
#[derive(Debug, Clone, Serialize)]
pub struct StalenessResult {
    pub passed: bool,
    pub sources: Vec<SourceStaleness>,
    pub alert_message: Option<String>,
}

impl StalenessResult {
    /// Pure fold of per-source verdicts into the aggregate result.
    pub fn from_sources(sources: Vec<SourceStaleness>) -> Self {
        let stale: Vec<&SourceStaleness> = sources.iter().filter(|s| s.is_stale).collect();
        let passed = stale.is_empty();
        let alert_message = if passed {
            None
        } else {
            Some(format_alert(&stale))
        };
        Self {
            passed,
            sources,
            alert_message,
        }
    }
}

fn format_alert(stale: &[&SourceStaleness]) -> String {
    let mut lines = vec![
        "⚠️ MARKETPULSE DATA STALENESS ALERT".to_string(),
        String::new(),
        format!(
            "The following market-level data sources are STALE (>{}h):",
            STALENESS_THRESHOLD_HOURS as i64
        ),
        String::new(),
    ];
    for src in stale {
        match src.age_hours {
            Some(age) => lines.push(format!("  🔴 {}: {age:.1}h old", src.label)),
            None => lines.push(format!("  🔴 {}: NEVER UPDATED", src.label)),
        }
    }
    lines.push(String::new());
    lines.push("Signal pipeline guards default to FAIL until data is refreshed.".to_string());
    lines.push("Run data ingestion to resolve.".to_string());
    lines.join("\n")
}

/// Checks freshness of the market-level sources against the registry.
pub struct StalenessGuard<'a> {
    registry: &'a dyn FreshnessRegistry,
}

impl<'a> StalenessGuard<'a> {
    pub fn new(registry: &'a dyn FreshnessRegistry) -> Self {
        Self { registry }
    }

    /// Check all sources against the current UTC clock.
    pub fn check(&self) -> StalenessResult {
        self.check_at(Utc::now())
    }

    /// Check all sources against an explicit clock.
    pub fn check_at(&self, now: DateTime<Utc>) -> StalenessResult {
        let sources: Vec<SourceStaleness> = SOURCES
            .iter()
            .map(|&(label, table, key, attr)| self.check_source(now, label, table, key, attr))
            .collect();

        let result = StalenessResult::from_sources(sources);
        if result.passed {
            info!("staleness guard passed: all sources fresh");
        } else {
            let stale_labels: Vec<&str> = result
                .sources
                .iter()
                .filter(|s| s.is_stale)
                .map(|s| s.label.as_str())
                .collect();
            warn!(stale = ?stale_labels, "staleness guard failed");
        }
        result
    }

    fn check_source(
        &self,
        now: DateTime<Utc>,
        label: &str,
        table: RegistryTable,
        key: &str,
        attr: &str,
    ) -> SourceStaleness {
        let record = match self.registry.get(table, key) {
            Ok(record) => record,
            Err(e) => {
                error!(%label, error = %e, "registry lookup failed, marking stale");
                return SourceStaleness::never_updated(label);
            }
        };

        let Some(raw) = record.and_then(|r| r.get(attr).cloned()) else {
            warn!(%label, "no last-update timestamp recorded");
            return SourceStaleness::never_updated(label);
        };

        let Some(last_updated) = parse_timestamp(&raw) else {
            warn!(%label, value = %raw, "unparseable last-update timestamp, marking stale");
            return SourceStaleness::never_updated(label);
        };

        let age_hours = (now - last_updated).num_seconds() as f64 / 3600.0;
        SourceStaleness {
            label: label.to_string(),
            is_stale: age_hours > STALENESS_THRESHOLD_HOURS,
            last_updated: Some(last_updated),
            age_hours: Some(age_hours),
        }
    }
}

/// Parse an ISO-8601 timestamp, datetime, or bare date.
///
/// Naive values (no offset) are interpreted as UTC; a bare date means
/// midnight UTC of that date.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Record, StoreError};
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    /// Registry stub with per-key failure injection.
    #[derive(Default)]
    struct MockRegistry {
        system: BTreeMap<String, Record>,
        symbols: BTreeMap<String, Record>,
        fail_keys: Vec<String>,
    }

    impl MockRegistry {
        fn with_system(mut self, key: &str, attr: &str, value: &str) -> Self {
            let mut record = Record::new();
            record.insert(attr.to_string(), value.to_string());
            self.system.insert(key.to_string(), record);
            self
        }

        fn with_symbol(mut self, key: &str, attr: &str, value: &str) -> Self {
            let mut record = Record::new();
            record.insert(attr.to_string(), value.to_string());
            self.symbols.insert(key.to_string(), record);
            self
        }

        fn failing_on(mut self, key: &str) -> Self {
            self.fail_keys.push(key.to_string());
            self
        }
    }

    impl FreshnessRegistry for MockRegistry {
        fn get(&self, table: RegistryTable, key: &str) -> Result<Option<Record>, StoreError> {
            if self.fail_keys.iter().any(|k| k == key) {
                return Err(StoreError::Backend("simulated registry outage".into()));
            }
            let records = match table {
                RegistryTable::System => &self.system,
                RegistryTable::Symbols => &self.symbols,
            };
            Ok(records.get(key).cloned())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
    }

    fn all_fresh() -> MockRegistry {
        MockRegistry::default()
            .with_system("macro_staleness_VIXCLS", "updated_at", "2026-08-06T09:00:00+00:00")
            .with_symbol("SPY", "last_updated_date", "2026-08-06")
            .with_symbol("UUP", "last_updated_date", "2026-08-06")
    }

    #[test]
    fn all_fresh_passes_with_no_alert() {
        let registry = all_fresh();
        let result = StalenessGuard::new(&registry).check_at(now());

        assert!(result.passed);
        assert!(result.alert_message.is_none());
        assert_eq!(result.sources.len(), 3);
        assert!(result.sources.iter().all(|s| !s.is_stale));
    }

    #[test]
    fn one_stale_source_fails_and_names_it() {
        let registry = MockRegistry::default()
            .with_system("macro_staleness_VIXCLS", "updated_at", "2026-08-03T09:00:00+00:00")
            .with_symbol("SPY", "last_updated_date", "2026-08-06")
            .with_symbol("UUP", "last_updated_date", "2026-08-06");
        let result = StalenessGuard::new(&registry).check_at(now());

        assert!(!result.passed);
        let alert = result.alert_message.unwrap();
        assert!(alert.contains("VIX"));
        assert!(alert.contains("75.0h old"));
        assert!(!alert.contains("SPY:"));
    }

    #[test]
    fn missing_record_reports_never_updated() {
        let registry = MockRegistry::default()
            .with_system("macro_staleness_VIXCLS", "updated_at", "2026-08-06T09:00:00+00:00")
            .with_symbol("SPY", "last_updated_date", "2026-08-06");
        let result = StalenessGuard::new(&registry).check_at(now());

        assert!(!result.passed);
        let dxy = &result.sources[2];
        assert_eq!(dxy.label, "DXY");
        assert!(dxy.is_stale);
        assert!(dxy.last_updated.is_none());
        assert!(dxy.age_hours.is_none());
        assert!(result.alert_message.unwrap().contains("DXY: NEVER UPDATED"));
    }

    #[test]
    fn missing_attribute_is_stale() {
        let mut registry = all_fresh();
        registry
            .symbols
            .get_mut("SPY")
            .unwrap()
            .remove("last_updated_date");
        let result = StalenessGuard::new(&registry).check_at(now());

        assert!(!result.passed);
        assert!(result.sources[1].is_stale);
    }

    #[test]
    fn registry_outage_marks_only_that_source_stale() {
        let registry = all_fresh().failing_on("SPY");
        let result = StalenessGuard::new(&registry).check_at(now());

        assert!(!result.passed);
        assert!(!result.sources[0].is_stale);
        assert!(result.sources[1].is_stale);
        assert!(!result.sources[2].is_stale);
    }

    #[test]
    fn naive_date_counts_from_midnight_utc() {
        // 2026-08-04 midnight UTC → 60h before the test clock: stale.
        // 2026-08-05 midnight UTC → 36h: also stale. 2026-08-06 → 12h: fresh.
        let registry = MockRegistry::default()
            .with_system("macro_staleness_VIXCLS", "updated_at", "2026-08-06T09:00:00+00:00")
            .with_symbol("SPY", "last_updated_date", "2026-08-05")
            .with_symbol("UUP", "last_updated_date", "2026-08-06");
        let result = StalenessGuard::new(&registry).check_at(now());

        let spy = &result.sources[1];
        assert!(spy.is_stale);
        assert_eq!(spy.age_hours, Some(36.0));
        let dxy = &result.sources[2];
        assert!(!dxy.is_stale);
        assert_eq!(dxy.age_hours, Some(12.0));
    }

    #[test]
    fn age_exactly_at_threshold_is_fresh() {
        let registry = MockRegistry::default()
            .with_system("macro_staleness_VIXCLS", "updated_at", "2026-08-05T12:00:00+00:00")
            .with_symbol("SPY", "last_updated_date", "2026-08-06")
            .with_symbol("UUP", "last_updated_date", "2026-08-06");
        let result = StalenessGuard::new(&registry).check_at(now());

        let vix = &result.sources[0];
        assert_eq!(vix.age_hours, Some(24.0));
        assert!(!vix.is_stale);
        assert!(result.passed);
    }

    #[test]
    fn garbage_timestamp_is_stale_not_a_panic() {
        let mut registry = all_fresh();
        registry
            .system
            .get_mut("macro_staleness_VIXCLS")
            .unwrap()
            .insert("updated_at".into(), "last tuesday".into());
        let result = StalenessGuard::new(&registry).check_at(now());

        assert!(!result.passed);
        assert!(result.sources[0].is_stale);
    }

    #[test]
    fn offset_timestamps_convert_to_utc() {
        assert_eq!(
            parse_timestamp("2026-08-06T07:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 8, 6, 5, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-08-06T05:00:00"),
            Some(Utc.with_ymd_and_hms(2026, 8, 6, 5, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-08-06"),
            Some(Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn alert_lists_every_stale_source() {
        let registry = MockRegistry::default();
        let result = StalenessGuard::new(&registry).check_at(now());

        let alert = result.alert_message.unwrap();
        for label in ["VIX", "SPY", "DXY"] {
            assert!(alert.contains(&format!("🔴 {label}: NEVER UPDATED")));
        }
        assert!(alert.contains("Run data ingestion to resolve."));
    }
}
