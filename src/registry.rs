//! Record of absolute paths already loaded into an engine. Owned by one
//! boot sequence and passed by reference, never a process-wide singleton,
//! so tests and batch preloaders construct a fresh one per cycle.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRegistry {
    loaded: BTreeSet<PathBuf>,
}

impl LoadedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.loaded.contains(path)
    }

    /// Returns true when the path was not present before.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.loaded.insert(path)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Loaded paths in sorted order, for reproducible diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.loaded.iter()
    }
}
