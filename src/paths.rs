//!
//! preheat root resolution
//! -----------------------
//! Turns configured root declarations into canonical on-disk directories
//! before any traversal begins.
//!
//! Key responsibilities:
//! - Normalize requested paths (backslashes, relative segments) and
//!   canonicalize them against the real filesystem.
//! - Enforce the required/optional contract: a missing required root is
//!   fatal before any load happens, a missing optional root is skipped.
//! - Present every resolved root with exactly one trailing separator for
//!   diagnostics and substring matching.

use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ConfigError;

/// Whether a missing root aborts the boot sequence or is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    #[default]
    Required,
    Optional,
}

/// A configured directory to search, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub path: String,
    #[serde(default)]
    pub kind: RootKind,
}

impl Root {
    pub fn required(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: RootKind::Required }
    }

    pub fn optional(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: RootKind::Optional }
    }
}

/// A root after canonicalization. `exists == false` only ever describes an
/// optional root; a required root that fails to resolve never produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    absolute: PathBuf,
    exists: bool,
}

impl ResolvedRoot {
    pub fn path(&self) -> &Path {
        &self.absolute
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Absolute path as a string with exactly one trailing separator.
    /// Separators are presented as `/` so diagnostics and substring rules
    /// read the same on every platform.
    pub fn prefix(&self) -> String {
        let s = self.absolute.to_string_lossy().replace('\\', "/");
        format!("{}/", s.trim_end_matches('/'))
    }
}

/// Resolves configured roots against a fixed base directory. Resolution is
/// a pure function of filesystem state at call time.
pub struct RootResolver {
    base: PathBuf,
}

impl RootResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolver rooted at the process working directory.
    pub fn from_cwd() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Canonicalize one root. An empty requested path is fatal regardless of
    /// kind, since it would silently traverse the current directory.
    pub fn resolve(&self, root: &Root) -> Result<ResolvedRoot, ConfigError> {
        let requested = root.path.trim();
        if requested.is_empty() {
            return Err(ConfigError::MissingRequiredPath(PathBuf::from(requested)));
        }
        let normalized = requested.replace('\\', "/");
        let lexical = self.lexical_absolute(Path::new(&normalized));
        match canonical_dir(&lexical) {
            Some(absolute) => Ok(ResolvedRoot { absolute, exists: true }),
            None => match root.kind {
                RootKind::Required => Err(ConfigError::MissingRequiredPath(lexical)),
                RootKind::Optional => {
                    info!(
                        target: "preheat::paths",
                        "optional root '{}' not present, skipping",
                        lexical.display()
                    );
                    Ok(ResolvedRoot { absolute: lexical, exists: false })
                }
            },
        }
    }

    /// Resolve a whole configuration in supplied order, stopping at the
    /// first required root that fails.
    pub fn resolve_all(&self, roots: &[Root]) -> Result<Vec<ResolvedRoot>, ConfigError> {
        let mut out = Vec::with_capacity(roots.len());
        for root in roots {
            out.push(self.resolve(root)?);
        }
        Ok(out)
    }

    fn lexical_absolute(&self, requested: &Path) -> PathBuf {
        requested
            .absolutize_from(&self.base)
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| self.base.join(requested))
    }
}

fn canonical_dir(lexical: &Path) -> Option<PathBuf> {
    let canon = fs::canonicalize(lexical).ok()?;
    match fs::metadata(&canon) {
        Ok(m) if m.is_dir() => Some(canon),
        _ => None,
    }
}
