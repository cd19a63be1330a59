use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use data_compare::{find_directives, CompareContext, CompareOptions, CompareRequest, Engine, IgnorePathConfig};

/// Compare an actual JSON document against an expected pattern that may
/// embed {{compare:...}} directives.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Expected pattern document (JSON string). You can also pipe a file
    /// using shell quoting.
    expected: String,
    /// Actual document (JSON string). Omit together with --scan.
    actual: Option<String>,
    /// Treat every object as exact-property mode
    #[arg(long)]
    strict: bool,
    /// Report actual properties absent from the expected pattern
    #[arg(long)]
    no_ignore_extra: bool,
    /// Stop descending past this depth
    #[arg(long)]
    max_depth: Option<usize>,
    /// Stop descending once this many errors are logged
    #[arg(long)]
    max_errors: Option<usize>,
    /// Base time for temporal directives (ISO-8601 or epoch)
    #[arg(long)]
    start_time_test: Option<String>,
    /// Fallback base time (ISO-8601 or epoch)
    #[arg(long)]
    start_time_script: Option<String>,
    /// Path prefix to suppress, dotted with * wildcards (repeatable),
    /// e.g. items.*.richtung
    #[arg(long = "ignore-path")]
    ignore_paths: Vec<String>,
    /// List the directives embedded in the expected document and exit
    #[arg(long)]
    scan: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.scan {
        for directive in find_directives(&args.expected) {
            println!("{directive}");
        }
        return;
    }

    let expected: Value = match serde_json::from_str(&args.expected) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid expected JSON: {e}");
            std::process::exit(2);
        }
    };
    let Some(actual_raw) = args.actual.as_ref() else {
        eprintln!("actual document is required unless --scan is given");
        std::process::exit(2);
    };
    let actual: Value = match serde_json::from_str(actual_raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid actual JSON: {e}");
            std::process::exit(2);
        }
    };

    let mut context = CompareContext::default();
    if let Some(t) = args.start_time_test.as_ref() {
        context.start_time_test = Some(Value::String(t.clone()));
    }
    if let Some(t) = args.start_time_script.as_ref() {
        context.start_time_script = Some(Value::String(t.clone()));
    }

    let options = CompareOptions {
        strict_mode: args.strict,
        ignore_extra_properties: !args.no_ignore_extra,
        max_depth: args.max_depth,
        max_errors: args.max_errors,
        ignore_paths: args
            .ignore_paths
            .iter()
            .map(|spec| IgnorePathConfig {
                path: spec.split('.').map(str::to_string).collect(),
                doc: vec![format!("--ignore-path {spec}")],
            })
            .collect(),
        ..CompareOptions::default()
    };

    let engine = Engine::with_builtins();
    let report = engine.run(&CompareRequest {
        expected,
        actual: Some(actual),
        context,
        options,
    });

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    if !report.success {
        std::process::exit(1);
    }
}
