//! Freshness registry — last-update records for the staleness guard.
//!
//! Two record namespaces mirror how upstream ingestion writes its bookkeeping:
//! `System` holds shared records keyed by a fixed identifier (macro series),
//! `Symbols` holds one record per ticker. Records are flat string-attribute
//! maps; all parsing and freshness policy lives in the guard, not here.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use super::object::StoreError;

/// Which record namespace to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryTable {
    System,
    Symbols,
}

/// A single registry record: attribute name → raw string value.
pub type Record = BTreeMap<String, String>;

/// Read-only lookup surface for last-update records.
pub trait FreshnessRegistry {
    /// The record for `key`, or `None` if no such record exists.
    fn get(&self, table: RegistryTable, key: &str) -> Result<Option<Record>, StoreError>;
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    system: BTreeMap<String, Record>,
    #[serde(default)]
    symbols: BTreeMap<String, Record>,
}

/// Registry backed by a single JSON file:
///
/// ```json
/// {
///   "system":  { "macro_staleness_VIXCLS": { "updated_at": "2026-08-05T21:10:00+00:00" } },
///   "symbols": { "SPY": { "last_updated_date": "2026-08-05" } }
/// }
/// ```
///
/// A missing file reads as an empty registry; an unreadable or unparseable
/// file is a backend error.
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_file(&self) -> Result<RegistryFile, StoreError> {
        if !self.path.exists() {
            return Ok(RegistryFile::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Backend(format!("registry read: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Malformed(format!("registry parse: {e}")))
    }
}

impl FreshnessRegistry for JsonFileRegistry {
    fn get(&self, table: RegistryTable, key: &str) -> Result<Option<Record>, StoreError> {
        let file = self.read_file()?;
        let records = match table {
            RegistryTable::System => file.system,
            RegistryTable::Symbols => file.symbols,
        };
        Ok(records.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_with(content: &str) -> (TempDir, JsonFileRegistry) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, content).unwrap();
        (dir, JsonFileRegistry::new(path))
    }

    #[test]
    fn reads_system_and_symbol_records() {
        let (_dir, registry) = registry_with(
            r#"{
                "system":  { "macro_staleness_VIXCLS": { "updated_at": "2026-08-05T12:00:00+00:00" } },
                "symbols": { "SPY": { "last_updated_date": "2026-08-05" } }
            }"#,
        );

        let vix = registry
            .get(RegistryTable::System, "macro_staleness_VIXCLS")
            .unwrap()
            .unwrap();
        assert_eq!(vix["updated_at"], "2026-08-05T12:00:00+00:00");

        let spy = registry.get(RegistryTable::Symbols, "SPY").unwrap().unwrap();
        assert_eq!(spy["last_updated_date"], "2026-08-05");
    }

    #[test]
    fn missing_record_is_none() {
        let (_dir, registry) = registry_with(r#"{ "system": {}, "symbols": {} }"#);
        assert!(registry
            .get(RegistryTable::Symbols, "UUP")
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let registry = JsonFileRegistry::new(dir.path().join("absent.json"));
        assert!(registry
            .get(RegistryTable::System, "macro_staleness_VIXCLS")
            .unwrap()
            .is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (_dir, registry) = registry_with("not json at all");
        assert!(registry.get(RegistryTable::System, "anything").is_err());
    }
}
