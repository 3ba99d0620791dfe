//! JSON manifest describing one preload configuration: which roots to
//! search, what to exclude, and how to load. Unknown fields are tolerated;
//! every field except `roots` has a usable default.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::boot::BootOptions;
use crate::paths::Root;
use crate::policy::{ExclusionPolicy, TraversalOrder};
use crate::scripts::LoadMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Base directory for relative roots. Defaults to the process cwd.
    pub base_dir: Option<String>,
    pub roots: Vec<Root>,
    pub policy: ExclusionPolicy,
    pub order: TraversalOrder,
    pub mode: LoadMode,
}

impl Manifest {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading manifest '{}'", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .with_context(|| format!("parsing manifest '{}'", path.display()))?;
        Ok(manifest)
    }

    pub fn into_options(self) -> BootOptions {
        BootOptions {
            base_dir: self.base_dir.map(PathBuf::from),
            roots: self.roots,
            policy: self.policy,
            order: self.order,
            mode: self.mode,
        }
    }
}
