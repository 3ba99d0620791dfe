//!
//! preheat exclusion policy
//! ------------------------
//! Rule evaluation deciding which discovered files are dropped before
//! loading. Rules are OR'd: one matching rule excludes a file absolutely,
//! nothing overrides an exclusion.
//!
//! Evaluation order is fixed and short-circuits on the first match:
//! extension filter, path substring, exact name, name pattern.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ConfigError;

/// Order in which each directory's entries are visited during the walk.
///
/// `ParentFirst` visits a directory's entries in byte-sorted order,
/// descending into subdirectories where they occur. `ChildFirst` fully
/// visits subdirectory subtrees before the directory's own files. Both are
/// deterministic for a fixed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    #[default]
    ParentFirst,
    ChildFirst,
}

/// Filter configuration for one loader invocation.
///
/// The default allows the `lua` extension and excludes nothing. An empty
/// `allowed_extensions` set selects nothing at all, since the extension
/// filter is an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionPolicy {
    pub allowed_extensions: BTreeSet<String>,
    pub path_substring_excludes: BTreeSet<String>,
    pub name_excludes: BTreeSet<String>,
    pub name_pattern_excludes: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: BTreeSet::from(["lua".to_string()]),
            path_substring_excludes: BTreeSet::new(),
            name_excludes: BTreeSet::new(),
            name_pattern_excludes: Vec::new(),
        }
    }
}

impl ExclusionPolicy {
    /// Compile the pattern rules. A malformed pattern is fatal here, before
    /// any file is loaded.
    pub fn compile(&self) -> Result<CompiledPolicy, ConfigError> {
        let mut patterns = Vec::with_capacity(self.name_pattern_excludes.len());
        for pattern in &self.name_pattern_excludes {
            let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidPolicy {
                pattern: pattern.clone(),
                source,
            })?;
            patterns.push(re);
        }
        Ok(CompiledPolicy {
            allowed_extensions: self
                .allowed_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
            path_substring_excludes: self.path_substring_excludes.iter().cloned().collect(),
            name_excludes: self.name_excludes.clone(),
            patterns,
        })
    }
}

/// Which rule dropped a candidate. Carried in debug logs so an operator can
/// see exactly why a file was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Extension,
    PathSubstring(String),
    Name,
    NamePattern(String),
}

/// A policy with its patterns compiled, ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    allowed_extensions: BTreeSet<String>,
    path_substring_excludes: Vec<String>,
    name_excludes: BTreeSet<String>,
    patterns: Vec<Regex>,
}

impl CompiledPolicy {
    /// Evaluate one candidate file. `None` means it survives every rule.
    ///
    /// Extension comparison is ASCII-case-insensitive. Substring rules match
    /// the absolute path with `/` separators; name rules match the base name
    /// only, so a directory named like a pattern never drops files beneath it.
    pub fn exclusion(&self, path: &Path) -> Option<Exclusion> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !self.allowed_extensions.contains(&ext) {
            return Some(Exclusion::Extension);
        }
        let hay = path.to_string_lossy().replace('\\', "/");
        for sub in &self.path_substring_excludes {
            if hay.contains(sub.as_str()) {
                return Some(Exclusion::PathSubstring(sub.clone()));
            }
        }
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if self.name_excludes.contains(name.as_ref()) {
            return Some(Exclusion::Name);
        }
        for re in &self.patterns {
            if re.is_match(&name) {
                return Some(Exclusion::NamePattern(re.as_str().to_string()));
            }
        }
        None
    }

    pub fn selects(&self, path: &Path) -> bool {
        self.exclusion(path).is_none()
    }
}
