//! Built-in directive set and reference transforms.
//!
//! Every implementation compiles its parsed arguments once into a reusable
//! predicate. Type mismatches and out-of-range values come back as
//! structured failures; only malformed arguments abort construction, and
//! the comparer turns those into a localized directive-error.

use chrono::Duration;
use regex::Regex;
use serde_json::Value;

use crate::context::EvalContext;
use crate::directive::{unescape, Directive};
use crate::errors::{DirectiveError, Result};
use crate::registry::{DirectiveHandler, MatchOutcome, Predicate, Registry, Transform};
use crate::report::ErrorKind;
use crate::timeutil::{self, TimeUnit};

/// Register the built-in directives and reference transforms.
pub fn install(registry: &mut Registry) -> Result<()> {
    registry.register_directive(StartsWith)?;
    registry.register_directive(EndsWith)?;
    registry.register_directive(Contains)?;
    registry.register_directive(RegexMatch)?;
    registry.register_directive(NumberCheck)?;
    registry.register_directive(TimeCheck)?;
    registry.register_transform(Lower)?;
    registry.register_transform(Upper)?;
    Ok(())
}

/// Rejoin args with `:` (restoring colons split as argument separators)
/// and resolve the escape syntax. At least one argument is required.
fn joined_pattern(directive: &Directive) -> Result<String> {
    if directive.args.is_empty() {
        return Err(DirectiveError::Args {
            action: directive.action.clone(),
            reason: "a pattern argument is required".into(),
        });
    }
    Ok(unescape(&directive.args.join(":")))
}

fn args_error(directive: &Directive, reason: impl Into<String>) -> DirectiveError {
    DirectiveError::Args {
        action: directive.action.clone(),
        reason: reason.into(),
    }
}

fn parse_f64(directive: &Directive, raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| args_error(directive, format!("{what} '{raw}' is not numeric")))
}

// ─── String-pattern family ───────────────────────────────────────────────

pub struct StartsWith;

impl DirectiveHandler for StartsWith {
    fn name(&self) -> &'static str {
        "startsWith"
    }

    fn build(&self, directive: &Directive, _ctx: &EvalContext) -> Result<Predicate> {
        let pattern = joined_pattern(directive)?;
        Ok(Box::new(move |actual| match actual.as_str() {
            Some(s) if s.starts_with(&pattern) => {
                MatchOutcome::pass(format!("'{s}' starts with '{pattern}'"))
            }
            Some(s) => MatchOutcome::fail(
                ErrorKind::PatternMismatch,
                format!("'{s}' does not start with '{pattern}'"),
            ),
            None => MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a string starting with '{pattern}', got {actual}"),
            ),
        }))
    }
}

pub struct EndsWith;

impl DirectiveHandler for EndsWith {
    fn name(&self) -> &'static str {
        "endsWith"
    }

    fn build(&self, directive: &Directive, _ctx: &EvalContext) -> Result<Predicate> {
        let pattern = joined_pattern(directive)?;
        Ok(Box::new(move |actual| match actual.as_str() {
            Some(s) if s.ends_with(&pattern) => {
                MatchOutcome::pass(format!("'{s}' ends with '{pattern}'"))
            }
            Some(s) => MatchOutcome::fail(
                ErrorKind::PatternMismatch,
                format!("'{s}' does not end with '{pattern}'"),
            ),
            None => MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a string ending with '{pattern}', got {actual}"),
            ),
        }))
    }
}

pub struct Contains;

impl DirectiveHandler for Contains {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn build(&self, directive: &Directive, _ctx: &EvalContext) -> Result<Predicate> {
        let pattern = joined_pattern(directive)?;
        Ok(Box::new(move |actual| match actual.as_str() {
            Some(s) if s.contains(&pattern) => {
                MatchOutcome::pass(format!("'{s}' contains '{pattern}'"))
            }
            Some(s) => MatchOutcome::fail(
                ErrorKind::PatternMismatch,
                format!("'{s}' does not contain '{pattern}'"),
            ),
            None => MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a string containing '{pattern}', got {actual}"),
            ),
        }))
    }
}

pub struct RegexMatch;

impl DirectiveHandler for RegexMatch {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn build(&self, directive: &Directive, _ctx: &EvalContext) -> Result<Predicate> {
        let pattern = joined_pattern(directive)?;
        // Compiled once here so bad syntax fails fast at the directive path
        let re = Regex::new(&pattern).map_err(|e| args_error(directive, e.to_string()))?;
        Ok(Box::new(move |actual| match actual.as_str() {
            Some(s) if re.is_match(s) => {
                MatchOutcome::pass(format!("'{s}' matches /{}/", re.as_str()))
            }
            Some(s) => MatchOutcome::fail(
                ErrorKind::PatternMismatch,
                format!("'{s}' does not match /{}/", re.as_str()),
            ),
            None => MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a string matching /{}/, got {actual}", re.as_str()),
            ),
        }))
    }
}

// ─── Numeric ─────────────────────────────────────────────────────────────

pub struct NumberCheck;

impl DirectiveHandler for NumberCheck {
    fn name(&self) -> &'static str {
        "number"
    }

    fn build(&self, directive: &Directive, _ctx: &EvalContext) -> Result<Predicate> {
        let mode = directive
            .args
            .first()
            .ok_or_else(|| args_error(directive, "missing mode, expected 'range' or 'tolerance'"))?;
        match mode.as_str() {
            "range" => build_number_range(directive),
            "tolerance" => build_number_tolerance(directive),
            other => Err(args_error(
                directive,
                format!("unknown mode '{other}', expected 'range' or 'tolerance'"),
            )),
        }
    }
}

fn build_number_range(directive: &Directive) -> Result<Predicate> {
    if directive.args.len() != 3 {
        return Err(args_error(directive, "range expects 'range:min:max'"));
    }
    let min = parse_f64(directive, &directive.args[1], "min")?;
    let max = parse_f64(directive, &directive.args[2], "max")?;
    if min > max {
        return Err(args_error(
            directive,
            format!("min {min} is greater than max {max}"),
        ));
    }
    Ok(Box::new(move |actual| {
        let Some(v) = actual.as_f64() else {
            return MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a number in [{min}, {max}], got {actual}"),
            );
        };
        // Signed distance from the nearest violated bound
        if v < min {
            MatchOutcome::fail(
                ErrorKind::RangeExceeded,
                format!("{v} is outside [{min}, {max}] by {}", v - min),
            )
        } else if v > max {
            MatchOutcome::fail(
                ErrorKind::RangeExceeded,
                format!("{v} is outside [{min}, {max}] by {}", v - max),
            )
        } else {
            MatchOutcome::pass(format!("{v} is within [{min}, {max}]"))
        }
    }))
}

fn build_number_tolerance(directive: &Directive) -> Result<Predicate> {
    if directive.args.len() != 3 {
        return Err(args_error(directive, "tolerance expects 'tolerance:value:±N'"));
    }
    let value = parse_f64(directive, &directive.args[1], "value")?;
    let spec = directive.args[2].trim();
    let spec = spec.strip_prefix('±').unwrap_or(spec);
    let (amount, percent) = match spec.strip_suffix('%') {
        Some(body) => (parse_f64(directive, body, "tolerance")?, true),
        None => (parse_f64(directive, spec, "tolerance")?, false),
    };
    let allowed = if percent {
        value.abs() * amount / 100.0
    } else {
        amount
    };
    Ok(Box::new(move |actual| {
        let Some(v) = actual.as_f64() else {
            return MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a number near {value}, got {actual}"),
            );
        };
        let diff = (v - value).abs();
        if diff > allowed {
            MatchOutcome::fail(
                ErrorKind::RangeExceeded,
                format!("{v} differs from {value} by {diff}, allowed {allowed}"),
            )
        } else {
            MatchOutcome::pass(format!("{v} is within {allowed} of {value}"))
        }
    }))
}

// ─── Temporal ────────────────────────────────────────────────────────────

pub struct TimeCheck;

impl DirectiveHandler for TimeCheck {
    fn name(&self) -> &'static str {
        "time"
    }

    fn build(&self, directive: &Directive, ctx: &EvalContext) -> Result<Predicate> {
        let mode = directive
            .args
            .first()
            .ok_or_else(|| args_error(directive, "missing mode, expected 'range' or 'exact'"))?;
        match mode.as_str() {
            "range" => build_time_range(directive, ctx),
            "exact" => build_time_exact(directive, ctx),
            other => Err(args_error(
                directive,
                format!("unknown mode '{other}', expected 'range' or 'exact'"),
            )),
        }
    }
}

fn parse_unit(directive: &Directive, raw: &str) -> Result<TimeUnit> {
    TimeUnit::parse(raw).ok_or_else(|| {
        args_error(
            directive,
            format!("unknown unit '{raw}', expected milliseconds..years"),
        )
    })
}

fn build_time_range(directive: &Directive, ctx: &EvalContext) -> Result<Predicate> {
    let rest = &directive.args[1..];
    let (before, after, unit) = match rest {
        // Explicit two-sided window
        [before, after, unit] => (
            parse_f64(directive, before, "window start")?,
            parse_f64(directive, after, "window end")?,
            parse_unit(directive, unit)?,
        ),
        // One-sided: non-negative means future-only, negative past-only
        [signed, unit] => {
            let v = parse_f64(directive, signed, "window")?;
            let unit = parse_unit(directive, unit)?;
            if v >= 0.0 {
                (0.0, v, unit)
            } else {
                (v, 0.0, unit)
            }
        }
        _ => {
            return Err(args_error(
                directive,
                "range expects 'range:before:after:unit' or 'range:value:unit'",
            ))
        }
    };
    let base = ctx.base_time;
    Ok(Box::new(move |actual| {
        let Some(ts) = timeutil::parse_timestamp(actual) else {
            return MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a timestamp, got {actual}"),
            );
        };
        let diff = (ts - base).num_milliseconds() as f64 / unit.millis();
        if diff < before || diff > after {
            MatchOutcome::fail(
                ErrorKind::RangeExceeded,
                format!(
                    "timestamp is {diff:.3} {} from base, outside [{before}, {after}]",
                    unit.name()
                ),
            )
        } else {
            MatchOutcome::pass(format!(
                "timestamp is {diff:.3} {} from base, within [{before}, {after}]",
                unit.name()
            ))
        }
    }))
}

fn build_time_exact(directive: &Directive, ctx: &EvalContext) -> Result<Predicate> {
    let rest = &directive.args[1..];
    let offset_ms = match rest {
        [] => 0.0,
        [offset, unit] => {
            parse_f64(directive, offset, "offset")? * parse_unit(directive, unit)?.millis()
        }
        _ => {
            return Err(args_error(
                directive,
                "exact expects 'exact' or 'exact:offset:unit'",
            ))
        }
    };
    let expected_ts = ctx.base_time + Duration::milliseconds(offset_ms.round() as i64);
    Ok(Box::new(move |actual| {
        let Some(ts) = timeutil::parse_timestamp(actual) else {
            return MatchOutcome::fail(
                ErrorKind::TypeMismatch,
                format!("expected a timestamp, got {actual}"),
            );
        };
        let delta = (ts - expected_ts).num_milliseconds();
        if delta == 0 {
            MatchOutcome::pass(format!("timestamp equals {}", expected_ts.to_rfc3339()))
        } else {
            MatchOutcome::fail(
                ErrorKind::ValueMismatch,
                format!(
                    "timestamp differs from {} by {delta} milliseconds",
                    expected_ts.to_rfc3339()
                ),
            )
        }
    }))
}

// ─── Reference transforms ────────────────────────────────────────────────

pub struct Lower;

impl Transform for Lower {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn apply(&self, value: &Value, _params: &[String]) -> Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        })
    }
}

pub struct Upper;

impl Transform for Upper {
    fn name(&self) -> &'static str {
        "upper"
    }

    fn apply(&self, value: &Value, _params: &[String]) -> Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other.clone(),
        })
    }
}
