use data_compare as dc;
use data_compare::ErrorKind;
use serde_json::json;

#[test]
fn test_range_is_boundary_inclusive() {
    let pattern = json!("{{compare:number:range:10:20}}");
    assert!(dc::compare_data(&pattern, &json!(10)).success);
    assert!(dc::compare_data(&pattern, &json!(20)).success);
    assert!(dc::compare_data(&pattern, &json!(15.5)).success);
    assert!(!dc::compare_data(&pattern, &json!(9.999)).success);
    assert!(!dc::compare_data(&pattern, &json!(20.001)).success);
}

#[test]
fn test_range_reports_signed_distance() {
    let pattern = json!("{{compare:number:range:10:20}}");
    let report = dc::compare_data(&pattern, &json!(25));
    assert_eq!(report.errors[0].kind, ErrorKind::RangeExceeded);
    assert!(report.errors[0].message.contains("by 5"));
    let report = dc::compare_data(&pattern, &json!(7));
    assert!(report.errors[0].message.contains("by -3"));
}

#[test]
fn test_inverted_range_is_a_directive_error() {
    let report = dc::compare_data(&json!("{{compare:number:range:20:10}}"), &json!(15));
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::DirectiveError);
    assert!(report.errors[0].message.contains("greater than max"));
}

#[test]
fn test_absolute_tolerance() {
    let pattern = json!("{{compare:number:tolerance:42:±5}}");
    assert!(dc::compare_data(&pattern, &json!(37)).success);
    assert!(dc::compare_data(&pattern, &json!(47)).success);
    assert!(dc::compare_data(&pattern, &json!(42)).success);
    assert!(!dc::compare_data(&pattern, &json!(36.9)).success);
    assert!(!dc::compare_data(&pattern, &json!(47.1)).success);
}

#[test]
fn test_percentage_tolerance() {
    let pattern = json!("{{compare:number:tolerance:100:±10%}}");
    assert!(dc::compare_data(&pattern, &json!(90)).success);
    assert!(dc::compare_data(&pattern, &json!(110)).success);
    assert!(!dc::compare_data(&pattern, &json!(89)).success);
    assert!(!dc::compare_data(&pattern, &json!(111)).success);
}

#[test]
fn test_number_rejects_non_numeric_actual() {
    let report = dc::compare_data(&json!("{{compare:number:range:0:10}}"), &json!("five"));
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_string_family_rejects_non_string_actual() {
    let report = dc::compare_data(&json!("{{compare:contains:abc}}"), &json!(123));
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_pattern_with_escaped_colons() {
    // unescaped colons split into args and are rejoined, escaped ones pass
    // through the tokenizer untouched
    let pattern = json!(r"{{compare:startsWith:https\://example.com}}");
    assert!(dc::compare_data(&pattern, &json!("https://example.com/login")).success);
    let pattern = json!("{{compare:contains:a:b}}");
    assert!(dc::compare_data(&pattern, &json!("xx a:b yy")).success);
}

#[test]
fn test_invalid_regex_is_a_localized_directive_error() {
    let expected = json!({
        "bad": "{{compare:regex:([unclosed}}",
        "good": "fine"
    });
    let actual = json!({"bad": "whatever", "good": "fine"});
    let report = dc::compare_data(&expected, &actual);
    // the broken directive fails alone, the sibling branch is still checked
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, "bad");
    assert_eq!(report.errors[0].kind, ErrorKind::DirectiveError);
    assert!(report.details.iter().any(|d| d.path == "good" && d.passed));
}

#[test]
fn test_unknown_action_is_a_directive_error() {
    let report = dc::compare_data(&json!("{{compare:fuzzy:abc}}"), &json!("abc"));
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::DirectiveError);
    assert!(report.errors[0].message.contains("unknown directive 'fuzzy'"));
}

#[test]
fn test_time_range_one_sided_future() {
    let request = json!({
        "expected": "{{compare:time:range:90:seconds}}",
        "actual": "2025-11-05T14:31:00Z",
        "context": {"startTimeTest": "2025-11-05T14:30:00Z"}
    });
    let report = dc::compare_request(&request).unwrap();
    assert!(report.success, "errors: {:?}", report.errors);

    // past timestamps fall outside a future-only window
    let request = json!({
        "expected": "{{compare:time:range:90:seconds}}",
        "actual": "2025-11-05T14:29:00Z",
        "context": {"startTimeTest": "2025-11-05T14:30:00Z"}
    });
    let report = dc::compare_request(&request).unwrap();
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::RangeExceeded);
}

#[test]
fn test_time_range_one_sided_past() {
    let request = json!({
        "expected": "{{compare:time:range:-5:minutes}}",
        "actual": "2025-11-05T14:27:00Z",
        "context": {"startTimeScript": "2025-11-05T14:30:00Z"}
    });
    let report = dc::compare_request(&request).unwrap();
    assert!(report.success, "errors: {:?}", report.errors);
}

#[test]
fn test_time_range_two_sided_window() {
    let request = json!({
        "expected": "{{compare:time:range:-1:1:hours}}",
        "actual": "2025-11-05T14:50:00Z",
        "context": {"startTimeTest": "2025-11-05T14:30:00Z"}
    });
    assert!(dc::compare_request(&request).unwrap().success);
}

#[test]
fn test_time_accepts_epoch_actual() {
    // 2025-11-05T14:30:00Z as epoch seconds
    let request = json!({
        "expected": "{{compare:time:exact}}",
        "actual": 1762353000,
        "context": {"startTimeTest": "2025-11-05T14:30:00Z"}
    });
    let report = dc::compare_request(&request).unwrap();
    assert!(report.success, "errors: {:?}", report.errors);
}

#[test]
fn test_time_exact_reports_millisecond_delta() {
    let request = json!({
        "expected": "{{compare:time:exact}}",
        "actual": "2025-11-05T14:30:01Z",
        "context": {"startTimeTest": "2025-11-05T14:30:00Z"}
    });
    let report = dc::compare_request(&request).unwrap();
    assert!(!report.success);
    assert!(report.errors[0].message.contains("1000 milliseconds"));
}

#[test]
fn test_start_time_test_wins_over_script() {
    let request = json!({
        "expected": "{{compare:time:exact}}",
        "actual": "2025-11-05T14:30:00Z",
        "context": {
            "startTimeTest": "2025-11-05T14:30:00Z",
            "startTimeScript": "2020-01-01T00:00:00Z"
        }
    });
    assert!(dc::compare_request(&request).unwrap().success);
}

#[test]
fn test_unknown_unit_is_a_directive_error() {
    let request = json!({
        "expected": "{{compare:time:range:5:fortnights}}",
        "actual": "2025-11-05T14:30:00Z",
        "context": {"startTimeTest": "2025-11-05T14:30:00Z"}
    });
    let report = dc::compare_request(&request).unwrap();
    assert_eq!(report.errors[0].kind, ErrorKind::DirectiveError);
    assert!(report.errors[0].message.contains("unknown unit"));
}

#[test]
fn test_transform_pipeline_is_parsed_but_not_evaluated() {
    // suffix clauses must not break matching of the main clause
    let pattern = json!("{{compare:startsWith:HELLO|lower}}");
    assert!(dc::compare_data(&pattern, &json!("HELLO world")).success);
    assert!(!dc::compare_data(&pattern, &json!("hello world")).success);
}
