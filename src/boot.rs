//!
//! preheat boot sequence
//! ---------------------
//! One-shot orchestration: detect the deployment environment, resolve the
//! configured roots, then run the loader against a fresh registry. Returns
//! the warmed engine so the caller keeps the VM the scripts landed in.

use std::env;
use std::path::PathBuf;
use tracing::info;

use crate::error::ConfigError;
use crate::loader::SourceLoader;
use crate::paths::{Root, RootResolver};
use crate::policy::{ExclusionPolicy, TraversalOrder};
use crate::registry::LoadedRegistry;
use crate::report::LoadReport;
use crate::scripts::{LoadMode, ScriptEngine};

/// Deployment environment. Used only to pick default log verbosity in the
/// binaries; loader semantics never vary by environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Accepts the three canonical names, ASCII case-insensitive. Anything
    /// else is fatal: a boot sequence must not proceed under an environment
    /// it does not recognize.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            _ => Err(ConfigError::UnknownEnvironment(name.to_string())),
        }
    }

    /// Resolve from the process environment. A CI server (non-empty `CI`
    /// variable other than "false"/"0") always means `Testing`; otherwise
    /// `PREHEAT_ENV` decides, defaulting to `Production` when unset.
    pub fn detect() -> Result<Self, ConfigError> {
        if let Ok(ci) = env::var("CI") {
            let v = ci.trim().to_ascii_lowercase();
            if !v.is_empty() && v != "false" && v != "0" {
                return Ok(Environment::Testing);
            }
        }
        match env::var("PREHEAT_ENV") {
            Ok(name) if !name.trim().is_empty() => Self::parse(&name),
            _ => Ok(Environment::Production),
        }
    }

    /// Default `EnvFilter` directive for binaries when RUST_LOG is unset.
    pub fn default_filter(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Testing => "info",
            Environment::Production => "warn",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }
}

/// Everything one preload run needs. Typically produced from a manifest.
#[derive(Debug, Clone, Default)]
pub struct BootOptions {
    pub base_dir: Option<PathBuf>,
    pub roots: Vec<Root>,
    pub policy: ExclusionPolicy,
    pub order: TraversalOrder,
    pub mode: LoadMode,
}

/// Resolve the roots and load every selected script exactly once into a
/// fresh VM. One call is one boot sequence: the registry is created here
/// and dropped here, so idempotence never leaks across independent boots.
pub fn preload(opts: BootOptions) -> Result<(ScriptEngine, LoadReport), ConfigError> {
    let resolver = match &opts.base_dir {
        Some(base) => RootResolver::new(base.clone()),
        None => RootResolver::from_cwd(),
    };
    let resolved = resolver.resolve_all(&opts.roots)?;
    let engine = ScriptEngine::new(opts.mode);
    let loader = SourceLoader::with_order(&engine, opts.order);
    let mut registry = LoadedRegistry::new();
    let report = loader.load(&resolved, &opts.policy, &mut registry)?;
    info!(
        target: "preheat::boot",
        "preload finished: loaded={} skipped={} errors={} digest={}",
        report.loaded,
        report.skipped,
        report.errors.len(),
        report.digest
    );
    Ok((engine, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names_parse_case_insensitively() {
        assert_eq!(Environment::parse("development").expect("parse"), Environment::Development);
        assert_eq!(Environment::parse("TESTING").expect("parse"), Environment::Testing);
        assert_eq!(Environment::parse(" Production ").expect("parse"), Environment::Production);
    }

    #[test]
    fn unknown_environment_is_fatal() {
        let err = Environment::parse("staging").expect_err("must fail");
        match err {
            ConfigError::UnknownEnvironment(name) => assert_eq!(name, "staging"),
            other => panic!("expected UnknownEnvironment, got {:?}", other),
        }
    }

    #[test]
    fn default_filters_follow_the_environment() {
        assert_eq!(Environment::Development.default_filter(), "debug");
        assert_eq!(Environment::Testing.default_filter(), "info");
        assert_eq!(Environment::Production.default_filter(), "warn");
    }

    #[test]
    fn ci_detection_wins_over_the_configured_environment() {
        // One test owns both variables so parallel tests never race on them.
        let old_ci = env::var("CI").ok();
        let old_env = env::var("PREHEAT_ENV").ok();

        env::set_var("PREHEAT_ENV", "development");
        env::set_var("CI", "true");
        assert_eq!(Environment::detect().expect("detect"), Environment::Testing);

        env::set_var("CI", "false");
        assert_eq!(Environment::detect().expect("detect"), Environment::Development);

        env::remove_var("PREHEAT_ENV");
        assert_eq!(Environment::detect().expect("detect"), Environment::Production);

        match old_ci {
            Some(v) => env::set_var("CI", v),
            None => env::remove_var("CI"),
        }
        match old_env {
            Some(v) => env::set_var("PREHEAT_ENV", v),
            None => env::remove_var("PREHEAT_ENV"),
        }
    }
}
