//! Manifest tests: JSON shape, defaults, error context, and the example
//! manifest shipped with the crate.

use anyhow::Result;
use tempfile::tempdir;

use preheat::{LoadMode, Manifest, Root, RootKind, TraversalOrder};

use std::fs;
use std::path::Path;

#[test]
fn manifests_parse_with_defaults_applied() {
    let manifest: Manifest =
        serde_json::from_str(r#"{ "roots": [ { "path": "scripts" } ] }"#).expect("parse");

    assert_eq!(manifest.base_dir, None);
    assert_eq!(manifest.roots, vec![Root::required("scripts")]);
    assert!(manifest.policy.allowed_extensions.contains("lua"));
    assert_eq!(manifest.order, TraversalOrder::ParentFirst);
    assert_eq!(manifest.mode, LoadMode::Execute);
}

#[test]
fn enum_fields_use_snake_case_names() {
    let manifest: Manifest = serde_json::from_str(
        r#"{
            "base_dir": "/srv/app",
            "roots": [ { "path": "scripts", "kind": "optional" } ],
            "order": "child_first",
            "mode": "compile_only"
        }"#,
    )
    .expect("parse");

    assert_eq!(manifest.base_dir.as_deref(), Some("/srv/app"));
    assert_eq!(manifest.roots[0].kind, RootKind::Optional);
    assert_eq!(manifest.order, TraversalOrder::ChildFirst);
    assert_eq!(manifest.mode, LoadMode::CompileOnly);
}

#[test]
fn unknown_fields_are_tolerated() {
    let manifest: Manifest = serde_json::from_str(
        r#"{
            "comment": "deploy profile for the batch hosts",
            "roots": [ { "path": "scripts" } ]
        }"#,
    )
    .expect("unknown fields should not be fatal");
    assert_eq!(manifest.roots.len(), 1);
}

#[test]
fn missing_manifest_files_report_their_path() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("nope.json");

    let err = Manifest::from_path(&path).expect_err("missing file must fail");
    let text = format!("{:#}", err);
    assert!(text.contains("reading manifest"), "got: {}", text);
    assert!(text.contains("nope.json"), "got: {}", text);
    Ok(())
}

#[test]
fn invalid_json_reports_a_parse_error() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{ not json")?;

    let err = Manifest::from_path(&path).expect_err("broken JSON must fail");
    let text = format!("{:#}", err);
    assert!(text.contains("parsing manifest"), "got: {}", text);
    Ok(())
}

#[test]
fn malformed_patterns_parse_but_fail_at_first_use() {
    let manifest: Manifest = serde_json::from_str(
        r#"{ "roots": [ { "path": "x" } ], "policy": { "name_pattern_excludes": ["("] } }"#,
    )
    .expect("patterns are not validated at parse time");

    let opts = manifest.into_options();
    opts.policy.compile().expect_err("compile must reject the pattern");
}

#[test]
fn into_options_carries_every_field() {
    let mut manifest = Manifest::default();
    manifest.base_dir = Some("/srv/app".to_string());
    manifest.roots = vec![Root::required("scripts"), Root::optional("extras")];
    manifest.policy.name_excludes.insert("scratch.lua".to_string());
    manifest.order = TraversalOrder::ChildFirst;
    manifest.mode = LoadMode::CompileOnly;

    let opts = manifest.clone().into_options();
    assert_eq!(opts.base_dir.as_deref(), Some(Path::new("/srv/app")));
    assert_eq!(opts.roots, manifest.roots);
    assert_eq!(opts.policy, manifest.policy);
    assert_eq!(opts.order, TraversalOrder::ChildFirst);
    assert_eq!(opts.mode, LoadMode::CompileOnly);
}

#[test]
fn the_shipped_example_manifest_stays_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts/preheat.example.json");
    let manifest = Manifest::from_path(&path).expect("example manifest parses");
    assert!(!manifest.roots.is_empty(), "example should declare at least one root");

    let opts = manifest.into_options();
    opts.policy.compile().expect("example policy compiles");
}
