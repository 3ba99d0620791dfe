//!
//! preheat command-line entry point
//! --------------------------------
//! Runs one preload sequence from a JSON manifest and/or CLI flags and
//! reports the outcome. Exit code 0 means every selected file loaded,
//! 1 means a file failed to load, 3 means the configuration was bad.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use preheat::boot::{preload, BootOptions, Environment};
use preheat::loader::collect_load_set;
use preheat::manifest::Manifest;
use preheat::paths::{Root, RootResolver};
use preheat::policy::TraversalOrder;
use preheat::report::load_set_digest;
use preheat::scripts::LoadMode;

const EXIT_OK: u8 = 0;
const EXIT_LOAD: u8 = 1;
const EXIT_CONFIG: u8 = 3;

/// Flags that consume the following token. Positional scanning must skip
/// their values.
const VALUE_FLAGS: [&str; 4] = ["--manifest", "--base", "--mode", "--order"];

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_value_arg(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag
            && i + 1 < args.len() {
                return Some(args[i + 1].clone());
            }
        i += 1;
    }
    None
}

fn positional_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if VALUE_FLAGS.contains(&a.as_str()) {
            i += 2;
            continue;
        }
        if a.starts_with('-') {
            i += 1;
            continue;
        }
        out.push(a.clone());
        i += 1;
    }
    out
}

/// Resolve and filter without touching a VM: the load set goes to stdout in
/// load order, one path per line, and the summary goes to stderr.
fn dry_run(opts: &BootOptions) -> ExitCode {
    let resolver = match &opts.base_dir {
        Some(base) => RootResolver::new(base.clone()),
        None => RootResolver::from_cwd(),
    };
    let resolved = match resolver.resolve_all(&opts.roots) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("preheat: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    let compiled = match opts.policy.compile() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("preheat: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    let set = collect_load_set(&resolved, &compiled, opts.order);
    for path in &set {
        println!("{}", path.display());
    }
    eprintln!(
        "preheat: {} file(s) selected, digest {}",
        set.len(),
        load_set_digest(&set)
    );
    ExitCode::from(EXIT_OK)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("preheat\n\nUSAGE:\n  preheat_cli [ROOTS...] [--manifest PATH] [--base DIR] [--mode MODE] [--order ORDER] [--dry-run] [--json]\n\nOPTIONS:\n  --manifest PATH   JSON manifest (env: PREHEAT_MANIFEST; falls back to ./preheat.json if present)\n  --base DIR        Base directory for relative roots (default: current directory)\n  --mode MODE       execute | compile-only (default execute)\n  --order ORDER     parent-first | child-first (default parent-first)\n  --dry-run         Print the load set in load order without starting a VM\n  --json            Print the full load report as JSON\n\nPositional ROOTS are required directories and replace the manifest's roots.\nSee scripts/preheat.example.json for a complete manifest.\n\nENVIRONMENT:\n  PREHEAT_ENV       development | testing | production (default production; CI implies testing)\n  RUST_LOG          Overrides the environment's default log filter\n\nEXIT CODES:\n  0  every selected file loaded\n  1  a file failed to load (preload aborted)\n  3  bad configuration (unknown environment, unreadable manifest, missing required root)\n");
        return ExitCode::from(EXIT_OK);
    }

    let environment = match Environment::detect() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("preheat: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // RUST_LOG wins; otherwise the environment picks the verbosity.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(environment.default_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    tracing::info!(target: "preheat::cli", "environment: {}", environment.as_str());

    // Manifest source: explicit flag, then PREHEAT_MANIFEST, then ./preheat.json
    // if one is sitting there. An explicitly named manifest that fails to read
    // or parse is fatal.
    let manifest_path = parse_value_arg(&args, "--manifest")
        .or_else(|| env::var("PREHEAT_MANIFEST").ok())
        .map(PathBuf::from)
        .or_else(|| {
            let default = PathBuf::from("preheat.json");
            default.is_file().then_some(default)
        });

    let mut opts = BootOptions::default();
    if let Some(path) = manifest_path {
        match Manifest::from_path(&path) {
            Ok(m) => opts = m.into_options(),
            Err(e) => {
                eprintln!("preheat: {:#}", e);
                return ExitCode::from(EXIT_CONFIG);
            }
        }
    }

    // CLI arguments override the manifest.
    if let Some(base) = parse_value_arg(&args, "--base") {
        opts.base_dir = Some(PathBuf::from(base));
    }
    if let Some(mode) = parse_value_arg(&args, "--mode") {
        opts.mode = match mode.as_str() {
            "execute" => LoadMode::Execute,
            "compile-only" => LoadMode::CompileOnly,
            other => {
                eprintln!("preheat: unknown --mode '{}' (expected execute|compile-only)", other);
                return ExitCode::from(EXIT_CONFIG);
            }
        };
    }
    if let Some(order) = parse_value_arg(&args, "--order") {
        opts.order = match order.as_str() {
            "parent-first" => TraversalOrder::ParentFirst,
            "child-first" => TraversalOrder::ChildFirst,
            other => {
                eprintln!("preheat: unknown --order '{}' (expected parent-first|child-first)", other);
                return ExitCode::from(EXIT_CONFIG);
            }
        };
    }

    // Positional roots replace the manifest's list entirely, as required
    // directories.
    let roots = positional_args(&args);
    if !roots.is_empty() {
        opts.roots = roots.into_iter().map(Root::required).collect();
    }
    if opts.roots.is_empty() {
        eprintln!("preheat: no roots to search (give a manifest or positional directories)");
        return ExitCode::from(EXIT_CONFIG);
    }

    if has_flag(&args, "--dry-run") {
        return dry_run(&opts);
    }

    let json = has_flag(&args, "--json");
    match preload(opts) {
        Ok((_engine, report)) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("preheat: serializing report: {}", e);
                        return ExitCode::from(EXIT_CONFIG);
                    }
                }
            } else {
                println!(
                    "preheat {}: loaded={} skipped={} selected={} errors={} digest={} elapsed={}ms",
                    if report.is_ok() { "done" } else { "ABORTED" },
                    report.loaded,
                    report.skipped,
                    report.selected,
                    report.errors.len(),
                    report.digest,
                    report.elapsed_ms
                );
                for err in &report.errors {
                    eprintln!("preheat: {}", err);
                }
            }
            if report.is_ok() {
                ExitCode::from(EXIT_OK)
            } else {
                ExitCode::from(EXIT_LOAD)
            }
        }
        Err(e) => {
            eprintln!("preheat: {}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}
