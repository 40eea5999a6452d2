//! Storage seams consumed by the decision pipeline.
//!
//! The pipeline never talks to a concrete backend directly: the loader reads
//! columnar payloads through [`ObjectStore`], and the staleness guard reads
//! last-update records through [`FreshnessRegistry`]. Both traits ship with a
//! local-filesystem implementation and are trivially mockable in tests.

pub mod object;
pub mod registry;

pub use object::{FsObjectStore, ObjectStore, StoreError};
pub use registry::{FreshnessRegistry, JsonFileRegistry, Record, RegistryTable};
