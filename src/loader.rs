//!
//! preheat source loader
//! ---------------------
//! Depth-first, deterministic walk of each resolved root, policy filtering,
//! and exactly-once loading through the script engine.
//!
//! Key responsibilities:
//! - Build the load set: canonical candidate paths in a stable, documented
//!   order, deduplicated across roots.
//! - Evaluate the exclusion policy per candidate with fixed short-circuit
//!   rule order.
//! - Load survivors through the engine at most once per registry, aborting
//!   on the first failure so a broken file never yields a half-warm image.

use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ConfigError, LoadError};
use crate::paths::ResolvedRoot;
use crate::policy::{CompiledPolicy, ExclusionPolicy, TraversalOrder};
use crate::registry::LoadedRegistry;
use crate::report::{load_set_digest, BootPhase, LoadReport};
use crate::scripts::ScriptEngine;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod loader_tests;

/// Build the ordered, deduplicated load set across the given roots without
/// loading anything. Roots are walked in supplied order; roots that did not
/// resolve are skipped.
pub fn collect_load_set(
    roots: &[ResolvedRoot],
    policy: &CompiledPolicy,
    order: TraversalOrder,
) -> Vec<PathBuf> {
    let mut set = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    for root in roots.iter().filter(|r| r.exists()) {
        collect_root(root, policy, order, &mut seen, &mut set);
    }
    set
}

fn collect_root(
    root: &ResolvedRoot,
    policy: &CompiledPolicy,
    order: TraversalOrder,
    seen: &mut HashSet<PathBuf>,
    set: &mut Vec<PathBuf>,
) {
    debug!(target: "preheat::loader", "walking root {}", root.prefix());
    let walker = match order {
        TraversalOrder::ParentFirst => {
            WalkDir::new(root.path()).follow_links(true).sort_by_file_name()
        }
        // Subtrees surface before the directory's own files: directories
        // sort ahead of files at each level, names byte-wise within each
        // group.
        TraversalOrder::ChildFirst => {
            WalkDir::new(root.path()).follow_links(true).sort_by(|a, b| {
                b.file_type()
                    .is_dir()
                    .cmp(&a.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
        }
    };
    for entry in walker.into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(
                    target: "preheat::loader",
                    "skipping unreadable entry under {}: {}",
                    root.prefix(),
                    e
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        // Canonical identity, so the same physical file reached through two
        // roots or a symlink dedups to one entry.
        let path = match fs::canonicalize(entry.path()) {
            Ok(p) => p,
            Err(e) => {
                debug!(
                    target: "preheat::loader",
                    "candidate vanished {}: {}",
                    entry.path().display(),
                    e
                );
                continue;
            }
        };
        if let Some(reason) = policy.exclusion(&path) {
            debug!(target: "preheat::loader", "excluded {} ({:?})", path.display(), reason);
            continue;
        }
        if seen.insert(path.clone()) {
            set.push(path);
        }
    }
}

/// Walks resolved roots and loads every selected file through one engine.
/// Single-threaded and strictly sequential: load order is part of the
/// contract.
pub struct SourceLoader<'a> {
    engine: &'a ScriptEngine,
    order: TraversalOrder,
}

impl<'a> SourceLoader<'a> {
    pub fn new(engine: &'a ScriptEngine) -> Self {
        Self { engine, order: TraversalOrder::default() }
    }

    pub fn with_order(engine: &'a ScriptEngine, order: TraversalOrder) -> Self {
        Self { engine, order }
    }

    /// Build the load set for these roots without loading anything.
    pub fn collect(&self, roots: &[ResolvedRoot], policy: &CompiledPolicy) -> Vec<PathBuf> {
        collect_load_set(roots, policy, self.order)
    }

    /// Compile the policy, build the load set, then load each path at most
    /// once per registry. The first load failure aborts everything after it
    /// and flips the report to `Aborted`; `Err` is reserved for
    /// configuration problems surfaced before any load.
    pub fn load(
        &self,
        roots: &[ResolvedRoot],
        policy: &ExclusionPolicy,
        registry: &mut LoadedRegistry,
    ) -> Result<LoadReport, ConfigError> {
        let started = Instant::now();
        let compiled = policy.compile()?;

        let roots_walked = roots.iter().filter(|r| r.exists()).count();
        let roots_skipped = roots.len() - roots_walked;

        let set = self.collect(roots, &compiled);
        let digest = load_set_digest(&set);
        debug!(
            target: "preheat::loader",
            "load set has {} file(s) across {} root(s), digest {}",
            set.len(),
            roots_walked,
            digest
        );

        let mut loaded = 0usize;
        let mut skipped = 0usize;
        let mut errors: Vec<LoadError> = Vec::new();
        let mut phase = BootPhase::Done;

        for path in &set {
            if registry.contains(path) {
                skipped += 1;
                continue;
            }
            match self.engine.load_file(path) {
                Ok(()) => {
                    registry.insert(path.clone());
                    loaded += 1;
                }
                Err(e) => {
                    warn!(target: "preheat::loader", "aborting preload: {}", e);
                    errors.push(e);
                    phase = BootPhase::Aborted;
                    break;
                }
            }
        }

        Ok(LoadReport {
            loaded,
            skipped,
            errors,
            selected: set.len(),
            roots_walked,
            roots_skipped,
            phase,
            digest,
            generated_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
