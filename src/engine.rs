use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::compare::Comparer;
use crate::context::CompareContext;
use crate::options::CompareOptions;
use crate::registry::Registry;
use crate::report::{CheckDetail, CheckError, CompareReport, CompareStats, ErrorKind};

/// =========================
/// Request envelope
/// =========================

/// One comparison call, in the wire shape callers send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub expected: Value,
    /// Absent means the system under test produced nothing at all; this is
    /// the single call-level contract violation.
    #[serde(default)]
    pub actual: Option<Value>,
    #[serde(default)]
    pub context: CompareContext,
    #[serde(default)]
    pub options: CompareOptions,
}

impl CompareRequest {
    pub fn new(expected: Value, actual: Value) -> Self {
        Self {
            expected,
            actual: Some(actual),
            context: CompareContext::default(),
            options: CompareOptions::default(),
        }
    }
}

/// =========================
/// Engine facade
/// =========================

/// Owns one registry instance and runs one comparison per call. Thin and
/// stateless per call; safe to reuse across comparisons as long as nothing
/// registers into the registry concurrently.
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Engine wired with the built-in directive set.
    pub fn with_builtins() -> Self {
        Self::new(Registry::with_builtins())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn run(&self, request: &CompareRequest) -> CompareReport {
        let started = Instant::now();
        debug!("running comparison");

        let (errors, details, max_depth_reached) = match &request.actual {
            None => {
                let error = CheckError {
                    path: "root".to_string(),
                    kind: ErrorKind::MissingProperty,
                    expected: Some(request.expected.clone()),
                    actual: None,
                    message: "actual data is missing".to_string(),
                };
                (vec![error], Vec::new(), 0)
            }
            Some(actual) => {
                let mut comparer =
                    Comparer::new(&self.registry, &request.context, &request.options);
                comparer.compare(&request.expected, actual);
                comparer.into_logs()
            }
        };

        finish(errors, details, max_depth_reached, started)
    }
}

/// Assemble the report; every stat is derived from the logs.
fn finish(
    errors: Vec<CheckError>,
    details: Vec<CheckDetail>,
    max_depth_reached: usize,
    started: Instant,
) -> CompareReport {
    let passed_checks = details.iter().filter(|d| d.passed).count();
    let failed_checks = errors.len();
    CompareReport {
        success: errors.is_empty(),
        stats: CompareStats {
            total_checks: passed_checks + failed_checks,
            passed_checks,
            failed_checks,
            duration: started.elapsed().as_secs_f64() * 1_000.0,
            max_depth_reached,
        },
        errors,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn missing_actual_short_circuits_to_root_error() {
        let engine = Engine::with_builtins();
        let request = CompareRequest {
            expected: json!({"a": 1}),
            actual: None,
            context: CompareContext::default(),
            options: CompareOptions::default(),
        };
        let report = engine.run(&request);
        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "root");
        assert_eq!(report.errors[0].kind, ErrorKind::MissingProperty);
        assert_eq!(report.stats.total_checks, 1);
        assert_eq!(report.stats.max_depth_reached, 0);
    }

    #[test]
    fn stats_are_derived_from_the_logs() {
        let engine = Engine::with_builtins();
        let request = CompareRequest::new(json!({"a": 1, "b": 2}), json!({"a": 1, "b": 99}));
        let report = engine.run(&request);
        assert!(!report.success);
        assert_eq!(report.stats.failed_checks, report.errors.len());
        assert_eq!(
            report.stats.passed_checks,
            report.details.iter().filter(|d| d.passed).count()
        );
        assert_eq!(
            report.stats.total_checks,
            report.stats.passed_checks + report.stats.failed_checks
        );
    }

    #[test]
    fn request_envelope_round_trips_through_serde() {
        let raw = json!({
            "expected": {"a": "{{compare:ignore}}"},
            "actual": {"a": 5},
            "context": {"startTimeTest": "2025-11-05T15:30:00Z", "runId": 7},
            "options": {"strictMode": false, "maxErrors": 3}
        });
        let request: CompareRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.options.max_errors, Some(3));
        assert_eq!(request.context.extra.get("runId"), Some(&json!(7)));
        let report = Engine::with_builtins().run(&request);
        assert!(report.success);
    }
}
