//! Error taxonomy for root resolution and script loading.
//! Configuration problems are fatal before anything is loaded; `LoadError`
//! is the per-file failure that aborts the rest of a run and is carried in
//! the final report.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required root is missing, empty, or not a directory.
    #[error("required path does not resolve to a directory: '{}'", .0.display())]
    MissingRequiredPath(PathBuf),

    /// An exclusion pattern failed to compile. Surfaced when the policy is
    /// first used, before any file is loaded.
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    InvalidPolicy {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The process environment names a deployment environment this tool
    /// does not recognize.
    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),
}

/// A selected file failed to load. Path and cause are kept verbatim so the
/// operator can fix the offending file; the loader never retries.
#[derive(Debug, Clone, Error, Serialize)]
#[error("failed to load {}: {cause}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub cause: String,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, cause: impl Into<String>) -> Self {
        Self { path: path.into(), cause: cause.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn missing_path_names_the_path() {
        let err = ConfigError::MissingRequiredPath(PathBuf::from("/srv/app/scripts"));
        assert_eq!(
            err.to_string(),
            "required path does not resolve to a directory: '/srv/app/scripts'"
        );
    }

    #[test]
    fn invalid_policy_names_the_pattern() {
        let source = regex::Regex::new("[oops").expect_err("bad pattern");
        let err = ConfigError::InvalidPolicy { pattern: "[oops".to_string(), source };
        assert!(err.to_string().starts_with("invalid exclusion pattern '[oops'"));
    }

    #[test]
    fn load_error_keeps_path_and_cause_verbatim() {
        let err = LoadError::new(Path::new("/lib/bad.lua"), "syntax error near '('");
        assert_eq!(err.to_string(), "failed to load /lib/bad.lua: syntax error near '('");
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["path"], "/lib/bad.lua");
        assert_eq!(json["cause"], "syntax error near '('");
    }
}
