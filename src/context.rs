use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::timeutil;

/// Ambient values supplied once per comparison call. The two recognized
/// time fields feed base-time resolution for temporal directives; anything
/// else the caller sends lands in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareContext {
    /// ISO-8601 string or Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_test: Option<Value>,
    /// ISO-8601 string or Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_script: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompareContext {
    /// Resolve the ambient data handed to directive factories. Base-time
    /// priority: `startTimeTest` > `startTimeScript` > current wall clock.
    /// Evaluated once per comparison, not per directive.
    pub fn resolve(&self) -> EvalContext {
        let base_time = self
            .start_time_test
            .as_ref()
            .and_then(timeutil::parse_timestamp)
            .or_else(|| {
                self.start_time_script
                    .as_ref()
                    .and_then(timeutil::parse_timestamp)
            })
            .unwrap_or_else(Utc::now);
        EvalContext { base_time }
    }
}

/// Per-comparison resolved context, read-only during the walk.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    pub base_time: DateTime<Utc>,
}
