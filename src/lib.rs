pub mod errors;
pub mod context;
pub mod options;
pub mod path;
pub mod report;
pub mod directive;
pub mod registry;
pub mod directives; // built-in directive set
pub mod timeutil;
pub mod engine;
mod compare;

use serde_json::Value;

pub use compare::Comparer;
pub use context::CompareContext;
pub use engine::{CompareRequest, Engine};
pub use errors::DirectiveError;
pub use options::CompareOptions;
pub use path::IgnorePathConfig;
pub use registry::{DirectiveHandler, MatchOutcome, Matcher, Predicate, Registry, Transform};
pub use report::{CompareReport, ErrorKind};

/// Re-export the grammar helpers for users who inspect patterns directly.
pub use directive::{find_directives, is_directive, is_keyword};

/// Convenience: compare with the built-in directive set and default
/// context/options.
pub fn compare_data(expected: &Value, actual: &Value) -> CompareReport {
    let engine = Engine::with_builtins();
    engine.run(&CompareRequest::new(expected.clone(), actual.clone()))
}

/// Convenience: accept the full request envelope as untyped JSON.
pub fn compare_request(raw: &Value) -> serde_json::Result<CompareReport> {
    let request: CompareRequest = serde_json::from_value(raw.clone())?;
    Ok(Engine::with_builtins().run(&request))
}
