// src/directive.rs
use serde_json::Value;

use crate::errors::{DirectiveError, Result};

const OPEN: &str = "{{compare:";
const CLOSE: &str = "}}";

/// One parsed `{{compare:...}}` occurrence. Immutable after parsing;
/// `args` and `transforms` preserve declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub original: String,
    pub action: String,
    pub args: Vec<String>,
    pub transforms: Vec<TransformSpec>,
}

/// A `|name:param:param` suffix clause. Parsed and validated, but the core
/// comparison walk does not evaluate the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSpec {
    pub name: String,
    pub params: Vec<String>,
}

/// Zero-argument structural markers. These steer the traversal itself and
/// are never resolved through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Exact,
    Ignore,
    IgnoreRest,
    IgnoreOrder,
}

impl Keyword {
    pub const fn literal(self) -> &'static str {
        match self {
            Keyword::Exact => "{{compare:exact}}",
            Keyword::Ignore => "{{compare:ignore}}",
            Keyword::IgnoreRest => "{{compare:ignoreRest}}",
            Keyword::IgnoreOrder => "{{compare:ignoreOrder}}",
        }
    }

    pub fn parse(s: &str) -> Option<Keyword> {
        match s.trim() {
            "{{compare:exact}}" => Some(Keyword::Exact),
            "{{compare:ignore}}" => Some(Keyword::Ignore),
            "{{compare:ignoreRest}}" => Some(Keyword::IgnoreRest),
            "{{compare:ignoreOrder}}" => Some(Keyword::IgnoreOrder),
            _ => None,
        }
    }

    /// Keyword carried by a string leaf, if any.
    pub fn of_value(v: &Value) -> Option<Keyword> {
        v.as_str().and_then(Keyword::parse)
    }
}

pub fn is_keyword(s: &str) -> bool {
    Keyword::parse(s).is_some()
}

/// True iff the trimmed input is exactly one wrapped directive with at
/// least one character inside. Interior single braces (regex quantifiers
/// like `{5}`) do not confuse boundary detection because the closing
/// delimiter is anchored at end-of-string here.
pub fn is_directive(s: &str) -> bool {
    let t = s.trim();
    t.starts_with(OPEN) && t.ends_with(CLOSE) && t.len() > OPEN.len() + CLOSE.len()
}

/// Every non-overlapping directive substring, each ended at the first `}}`
/// after its opening wrapper (non-greedy).
pub fn find_directives(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = s[from..].find(OPEN) {
        let start = from + rel;
        let body_start = start + OPEN.len();
        match s[body_start..].find(CLOSE) {
            Some(body_len) => {
                let end = body_start + body_len + CLOSE.len();
                if body_len > 0 {
                    out.push(&s[start..end]);
                }
                from = end;
            }
            None => break,
        }
    }
    out
}

/// Parse one directive string into `(action, args, transforms)`.
///
/// The wrapper is stripped, the remainder is split on unescaped `|` into a
/// main clause and transform clauses, and each clause is split on unescaped
/// `:`. Escape sequences stay verbatim inside the produced segments; apply
/// [`unescape`] where the raw literal is needed.
pub fn parse(input: &str) -> Result<Directive> {
    let trimmed = input.trim();
    if !is_directive(trimmed) {
        return Err(DirectiveError::Parse(format!(
            "not a directive: '{trimmed}'"
        )));
    }
    let body = &trimmed[OPEN.len()..trimmed.len() - CLOSE.len()];

    let clauses = split_unescaped(body, '|');
    let mut main = split_unescaped(&clauses[0], ':');
    if main[0].is_empty() {
        return Err(DirectiveError::Parse(format!(
            "empty main clause in '{trimmed}'"
        )));
    }
    let action = main.remove(0);

    let mut transforms = Vec::new();
    for clause in &clauses[1..] {
        let mut parts = split_unescaped(clause, ':');
        if parts[0].is_empty() {
            return Err(DirectiveError::Parse(format!(
                "empty transform name in '{trimmed}'"
            )));
        }
        let name = parts.remove(0);
        transforms.push(TransformSpec {
            name,
            params: parts,
        });
    }

    Ok(Directive {
        original: trimmed.to_string(),
        action,
        args: main,
        transforms,
    })
}

/// Split on `sep`, honoring backslash escapes: a separator preceded by `\`
/// does not split, and the escape sequence is kept verbatim in its segment.
fn split_unescaped(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            cur.push(c);
            if let Some(next) = chars.next() {
                cur.push(next);
            }
        } else if c == sep {
            out.push(std::mem::take(&mut cur));
        } else {
            cur.push(c);
        }
    }
    out.push(cur);
    out
}

/// Reverse the escape syntax: `\:` becomes `:` and `\\` becomes `\`. Any
/// other backslash (e.g. `\d` inside a regex pattern) is preserved
/// verbatim.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(':') => out.push(':'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
