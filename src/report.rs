//! Wire shapes for the comparison report.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error taxonomy surfaced via `CheckError::kind`. The two `reference-*`
/// kinds are reserved for a not-yet-specified reference directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    MissingProperty,
    ExtraProperty,
    TypeMismatch,
    ValueMismatch,
    PatternMismatch,
    RangeExceeded,
    ArrayLengthMismatch,
    ArrayElementMismatch,
    ReferenceUnresolved,
    ReferenceAmbiguous,
    DirectiveError,
}

/// One failed check. Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckError {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    pub message: String,
}

/// One performed check, passing or failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDetail {
    pub path: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate counters, derived purely from the error/detail logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareStats {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    /// Wall-clock milliseconds for the whole call.
    pub duration: f64,
    pub max_depth_reached: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareReport {
    pub success: bool,
    pub errors: Vec<CheckError>,
    pub details: Vec<CheckDetail>,
    pub stats: CompareStats,
}
