use serde::{Deserialize, Serialize};

/// One step of the live traversal path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

/// Dot/bracket rendering: `items[0].name`; `"root"` for the empty path.
pub fn render(segments: &[PathSeg]) -> String {
    if segments.is_empty() {
        return "root".to_string();
    }
    let mut out = String::new();
    for seg in segments {
        match seg {
            PathSeg::Key(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
            PathSeg::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// A configured path prefix whose subtree is excluded from comparison.
/// `*` matches any single key or index segment; `doc` carries the
/// human-readable justification and is echoed into the suppression detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnorePathConfig {
    pub path: Vec<String>,
    #[serde(default)]
    pub doc: Vec<String>,
}

impl IgnorePathConfig {
    /// Prefix match against the live path, segment-wise.
    pub fn matches_prefix(&self, segments: &[PathSeg]) -> bool {
        if self.path.is_empty() || self.path.len() > segments.len() {
            return false;
        }
        self.path.iter().zip(segments).all(|(pat, seg)| {
            if pat == "*" {
                return true;
            }
            match seg {
                PathSeg::Key(k) => pat == k,
                PathSeg::Index(i) => *pat == i.to_string(),
            }
        })
    }
}
