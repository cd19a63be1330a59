//! Recursive comparer: walks the expected/actual pair in lock-step,
//! resolves directives through the registry, and accumulates the
//! error/detail logs for one comparison call.

use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::trace;

use crate::context::{CompareContext, EvalContext};
use crate::directive::{self, Keyword};
use crate::options::CompareOptions;
use crate::path::{render, PathSeg};
use crate::registry::{MatchOutcome, Registry};
use crate::report::{CheckDetail, CheckError, ErrorKind};

pub struct Comparer<'a> {
    registry: &'a Registry,
    options: &'a CompareOptions,
    eval: EvalContext,
    errors: Vec<CheckError>,
    details: Vec<CheckDetail>,
    depth: usize,
    max_depth_reached: usize,
}

impl<'a> Comparer<'a> {
    pub fn new(
        registry: &'a Registry,
        context: &CompareContext,
        options: &'a CompareOptions,
    ) -> Self {
        Self {
            registry,
            options,
            eval: context.resolve(),
            errors: Vec::new(),
            details: Vec::new(),
            depth: 0,
            max_depth_reached: 0,
        }
    }

    /// Run one comparison. Resets all per-invocation state first, so a
    /// reused instance behaves like a fresh one.
    pub fn compare(&mut self, expected: &Value, actual: &Value) {
        self.errors.clear();
        self.details.clear();
        self.depth = 0;
        self.max_depth_reached = 0;
        let mut path = Vec::new();
        self.check_node(expected, actual, &mut path);
    }

    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    pub fn details(&self) -> &[CheckDetail] {
        &self.details
    }

    pub fn max_depth_reached(&self) -> usize {
        self.max_depth_reached
    }

    pub fn into_logs(self) -> (Vec<CheckError>, Vec<CheckDetail>, usize) {
        (self.errors, self.details, self.max_depth_reached)
    }

    /// Isolated instance for trial comparisons during unordered-array
    /// matching; shares registry/options/context, never the logs.
    fn fresh_trial(&self) -> Comparer<'a> {
        Comparer {
            registry: self.registry,
            options: self.options,
            eval: self.eval,
            errors: Vec::new(),
            details: Vec::new(),
            depth: 0,
            max_depth_reached: 0,
        }
    }

    fn check_node(&mut self, expected: &Value, actual: &Value, path: &mut Vec<PathSeg>) {
        self.depth += 1;
        if self.depth > self.max_depth_reached {
            self.max_depth_reached = self.depth;
        }
        self.check_node_inner(expected, actual, path);
        self.depth -= 1;
    }

    fn check_node_inner(&mut self, expected: &Value, actual: &Value, path: &mut Vec<PathSeg>) {
        trace!(path = %render(path), depth = self.depth, "checking node");

        if let Some(max_depth) = self.options.max_depth {
            if self.depth > max_depth {
                self.push_error(
                    path,
                    ErrorKind::DirectiveError,
                    None,
                    None,
                    format!("maximum comparison depth {max_depth} exceeded"),
                );
                return;
            }
        }

        // Error budget reached: truncate descent without logging more
        if let Some(max_errors) = self.options.max_errors {
            if self.errors.len() >= max_errors {
                return;
            }
        }

        if let Some(rule) = self
            .options
            .ignore_paths
            .iter()
            .find(|rule| rule.matches_prefix(path))
        {
            let mut message = format!("subtree {} suppressed by ignore-path rule", render(path));
            if !rule.doc.is_empty() {
                message = format!("{message} ({})", rule.doc.iter().join("; "));
            }
            self.push_pass(path, None, None, message);
            return;
        }

        if expected.is_null() {
            if actual.is_null() {
                self.push_pass(path, Some(Value::Null), Some(Value::Null), "both are null");
            } else {
                self.push_error(
                    path,
                    ErrorKind::ValueMismatch,
                    Some(Value::Null),
                    Some(actual.clone()),
                    format!("expected null, got {actual}"),
                );
            }
            return;
        }

        if let Value::String(s) = expected {
            if Keyword::parse(s) == Some(Keyword::Ignore) {
                self.push_pass(path, None, None, "value ignored");
                return;
            }
            if directive::is_directive(s) {
                self.check_directive(s, actual, path);
                return;
            }
        }

        match expected {
            Value::Array(exp) => match actual {
                Value::Array(act) => self.check_array(exp, act, path),
                _ => self.push_error(
                    path,
                    ErrorKind::TypeMismatch,
                    Some(expected.clone()),
                    Some(actual.clone()),
                    format!("expected an array, got {}", type_name(actual)),
                ),
            },
            Value::Object(exp) => match actual {
                Value::Object(act) => self.check_object(exp, act, path),
                _ => self.push_error(
                    path,
                    ErrorKind::TypeMismatch,
                    Some(expected.clone()),
                    Some(actual.clone()),
                    format!("expected an object, got {}", type_name(actual)),
                ),
            },
            scalar => self.check_scalar(scalar, actual, path),
        }
    }

    fn check_directive(&mut self, raw: &str, actual: &Value, path: &mut Vec<PathSeg>) {
        let expected = || Some(Value::String(raw.to_string()));
        let parsed = match directive::parse(raw) {
            Ok(d) => d,
            Err(e) => {
                self.push_error(
                    path,
                    ErrorKind::DirectiveError,
                    expected(),
                    Some(actual.clone()),
                    e.to_string(),
                );
                return;
            }
        };
        let handler = match self.registry.get_directive(&parsed.action) {
            Ok(h) => h,
            Err(e) => {
                self.push_error(
                    path,
                    ErrorKind::DirectiveError,
                    expected(),
                    Some(actual.clone()),
                    e.to_string(),
                );
                return;
            }
        };
        let predicate = match handler.build(&parsed, &self.eval) {
            Ok(p) => p,
            Err(e) => {
                self.push_error(
                    path,
                    ErrorKind::DirectiveError,
                    expected(),
                    Some(actual.clone()),
                    e.to_string(),
                );
                return;
            }
        };
        match predicate(actual) {
            MatchOutcome::Pass { message } => {
                self.push_pass(path, expected(), Some(actual.clone()), message);
            }
            MatchOutcome::Fail { kind, message } => {
                self.push_error(path, kind, expected(), Some(actual.clone()), message);
            }
        }
    }

    fn check_object(
        &mut self,
        expected: &Map<String, Value>,
        actual: &Map<String, Value>,
        path: &mut Vec<PathSeg>,
    ) {
        let exact_key = Keyword::Exact.literal();
        let exact_mode = self.options.strict_mode
            || matches!(expected.get(exact_key), Some(Value::Bool(true)));

        for (key, exp_val) in expected {
            if key == exact_key {
                continue;
            }
            path.push(PathSeg::Key(key.clone()));
            match actual.get(key) {
                Some(act_val) => self.check_node(exp_val, act_val, path),
                None => self.push_error(
                    path,
                    ErrorKind::MissingProperty,
                    Some(exp_val.clone()),
                    None,
                    format!("missing property '{key}'"),
                ),
            }
            path.pop();
        }

        if exact_mode || !self.options.ignore_extra_properties {
            for (key, act_val) in actual {
                if key == exact_key || expected.contains_key(key) {
                    continue;
                }
                path.push(PathSeg::Key(key.clone()));
                self.push_error(
                    path,
                    ErrorKind::ExtraProperty,
                    None,
                    Some(act_val.clone()),
                    format!("unexpected property '{key}'"),
                );
                path.pop();
            }
        }
    }

    fn check_array(&mut self, expected: &[Value], actual: &[Value], path: &mut Vec<PathSeg>) {
        let ignore_order = expected
            .iter()
            .any(|v| Keyword::of_value(v) == Some(Keyword::IgnoreOrder));
        let ignore_rest = expected
            .iter()
            .any(|v| Keyword::of_value(v) == Some(Keyword::IgnoreRest));
        // Structural markers are stripped before any strategy runs
        let stripped: Vec<&Value> = expected
            .iter()
            .filter(|v| {
                !matches!(
                    Keyword::of_value(v),
                    Some(Keyword::IgnoreOrder | Keyword::IgnoreRest)
                )
            })
            .collect();

        if ignore_order {
            self.check_array_unordered(&stripped, actual, path);
        } else if ignore_rest {
            self.check_array_partial(&stripped, actual, path);
        } else {
            self.check_array_ordered(&stripped, actual, path);
        }
    }

    fn check_array_ordered(&mut self, expected: &[&Value], actual: &[Value], path: &mut Vec<PathSeg>) {
        if expected.len() != actual.len() {
            self.push_error(
                path,
                ErrorKind::ArrayLengthMismatch,
                Some(Value::from(expected.len())),
                Some(Value::from(actual.len())),
                format!(
                    "expected {} elements, got {}",
                    expected.len(),
                    actual.len()
                ),
            );
            // The overlapping prefix is still compared
        }
        for i in 0..expected.len().min(actual.len()) {
            path.push(PathSeg::Index(i));
            if Keyword::of_value(expected[i]) == Some(Keyword::Ignore) {
                self.push_pass(path, None, None, "element ignored");
            } else {
                self.check_node(expected[i], &actual[i], path);
            }
            path.pop();
        }
    }

    /// Greedy single-assignment matching: each expected element consumes
    /// the first unconsumed actual element that passes an isolated trial
    /// comparison. O(n²) trial comparisons in the worst case.
    fn check_array_unordered(
        &mut self,
        expected: &[&Value],
        actual: &[Value],
        path: &mut Vec<PathSeg>,
    ) {
        if expected.len() != actual.len() {
            self.push_error(
                path,
                ErrorKind::ArrayLengthMismatch,
                Some(Value::from(expected.len())),
                Some(Value::from(actual.len())),
                format!(
                    "ignoreOrder requires equal lengths, expected {} elements, got {}",
                    expected.len(),
                    actual.len()
                ),
            );
            return;
        }
        let mut consumed = vec![false; actual.len()];
        for (i, exp_el) in expected.iter().enumerate() {
            let mut matched = None;
            for (j, act_el) in actual.iter().enumerate() {
                if consumed[j] {
                    continue;
                }
                let mut trial = self.fresh_trial();
                trial.compare(exp_el, act_el);
                if trial.errors().is_empty() {
                    matched = Some(j);
                    break;
                }
            }
            path.push(PathSeg::Index(i));
            match matched {
                Some(j) => {
                    consumed[j] = true;
                    self.push_pass(
                        path,
                        Some((*exp_el).clone()),
                        Some(actual[j].clone()),
                        format!("matched actual element at index {j}"),
                    );
                }
                None => self.push_error(
                    path,
                    ErrorKind::ArrayElementMismatch,
                    Some((*exp_el).clone()),
                    None,
                    "no remaining actual element matches".to_string(),
                ),
            }
            path.pop();
        }
    }

    fn check_array_partial(&mut self, expected: &[&Value], actual: &[Value], path: &mut Vec<PathSeg>) {
        if actual.len() < expected.len() {
            self.push_error(
                path,
                ErrorKind::ArrayLengthMismatch,
                Some(Value::from(expected.len())),
                Some(Value::from(actual.len())),
                format!(
                    "ignoreRest requires at least {} elements, got {}",
                    expected.len(),
                    actual.len()
                ),
            );
            return;
        }
        // Trailing actual elements are unexamined and never reported
        for (i, exp_el) in expected.iter().enumerate() {
            path.push(PathSeg::Index(i));
            self.check_node(exp_el, &actual[i], path);
            path.pop();
        }
    }

    fn check_scalar(&mut self, expected: &Value, actual: &Value, path: &mut Vec<PathSeg>) {
        let same_type =
            std::mem::discriminant(expected) == std::mem::discriminant(actual);
        if same_type && values_equal(expected, actual) {
            self.push_pass(
                path,
                Some(expected.clone()),
                Some(actual.clone()),
                format!("values equal: {expected}"),
            );
        } else if same_type {
            self.push_error(
                path,
                ErrorKind::ValueMismatch,
                Some(expected.clone()),
                Some(actual.clone()),
                format!("expected {expected}, got {actual}"),
            );
        } else {
            self.push_error(
                path,
                ErrorKind::TypeMismatch,
                Some(expected.clone()),
                Some(actual.clone()),
                format!(
                    "expected {} {expected}, got {} {actual}",
                    type_name(expected),
                    type_name(actual)
                ),
            );
        }
    }

    fn push_pass(
        &mut self,
        path: &[PathSeg],
        expected: Option<Value>,
        actual: Option<Value>,
        message: impl Into<String>,
    ) {
        self.details.push(CheckDetail {
            path: render(path),
            passed: true,
            expected,
            actual,
            message: Some(message.into()),
        });
    }

    fn push_error(
        &mut self,
        path: &[PathSeg],
        kind: ErrorKind,
        expected: Option<Value>,
        actual: Option<Value>,
        message: String,
    ) {
        let rendered = render(path);
        self.errors.push(CheckError {
            path: rendered.clone(),
            kind,
            expected: expected.clone(),
            actual: actual.clone(),
            message: message.clone(),
        });
        self.details.push(CheckDetail {
            path: rendered,
            passed: false,
            expected,
            actual,
            message: Some(message),
        });
    }
}

/// Strict scalar equality, with numbers compared through f64 so integer
/// and float encodings of the same quantity agree.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => match (na.as_f64(), nb.as_f64()) {
            (Some(da), Some(db)) => (da - db).abs() < f64::EPSILON,
            _ => na == nb,
        },
        _ => a == b,
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
