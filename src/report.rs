//! The externally observable result of one preload run: counts, the ordered
//! errors (at most one under fail-fast), and the load-set digest that makes
//! order determinism checkable from the outside.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

use crate::error::LoadError;

/// Terminal state of a run. `Aborted` is entered on the first load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootPhase {
    Done,
    Aborted,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Files actually loaded this run.
    pub loaded: usize,
    /// Files in the load set that the registry had already seen.
    pub skipped: usize,
    pub errors: Vec<LoadError>,
    /// Size of the load set (survivors of the exclusion policy).
    pub selected: usize,
    pub roots_walked: usize,
    pub roots_skipped: usize,
    pub phase: BootPhase,
    /// xxh3-64 over the ordered load set. Identical tree, roots, and policy
    /// give an identical digest across runs.
    pub digest: String,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl LoadReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Hex digest of the ordered load-set paths. Order-sensitive: the identity
/// of a preloaded image includes its load order.
pub fn load_set_digest<P: AsRef<Path>>(paths: &[P]) -> String {
    let mut h = Xxh3::new();
    for p in paths {
        h.update(p.as_ref().to_string_lossy().as_bytes());
        h.update(b"\n");
    }
    format!("{:016x}", h.digest())
}
