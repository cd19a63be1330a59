use serde::{Deserialize, Serialize};

use crate::path::IgnorePathConfig;

/// Frozen configuration for one comparison call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareOptions {
    /// Reserved report-format selector; accepted on the wire, unused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Treat every object as exact-property mode.
    pub strict_mode: bool,
    /// Tolerate actual keys absent from the expected mapping.
    pub ignore_extra_properties: bool,
    /// Stop descending past this depth (recorded as a directive-error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Stop descending silently once this many errors are logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_paths: Vec<IgnorePathConfig>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            format: None,
            strict_mode: false,
            ignore_extra_properties: true,
            max_depth: None,
            max_errors: None,
            ignore_paths: Vec::new(),
        }
    }
}
