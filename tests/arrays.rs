use data_compare as dc;
use data_compare::ErrorKind;
use serde_json::json;

#[test]
fn test_ordered_is_the_default_and_order_sensitive() {
    let report = dc::compare_data(&json!([1, 2, 3]), &json!([1, 2, 3]));
    assert!(report.success);

    let report = dc::compare_data(&json!([1, 2, 3]), &json!([3, 2, 1]));
    assert!(!report.success);
    assert!(report.errors.iter().any(|e| e.path == "[0]"));
}

#[test]
fn test_ignore_order_accepts_any_permutation() {
    let expected = json!(["{{compare:ignoreOrder}}", 1, 2, 3]);
    let report = dc::compare_data(&expected, &json!([3, 2, 1]));
    assert!(report.success, "errors: {:?}", report.errors);
}

#[test]
fn test_ordered_length_mismatch_still_compares_the_prefix() {
    let report = dc::compare_data(&json!([1, 2, 3]), &json!([1, 9]));
    let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&ErrorKind::ArrayLengthMismatch));
    // index 1 of the overlap is still checked and fails
    assert!(report
        .errors
        .iter()
        .any(|e| e.path == "[1]" && e.kind == ErrorKind::ValueMismatch));
    assert!(report.details.iter().any(|d| d.path == "[0]" && d.passed));
}

#[test]
fn test_ignore_order_aborts_on_length_mismatch() {
    let expected = json!(["{{compare:ignoreOrder}}", 1, 2]);
    let report = dc::compare_data(&expected, &json!([1, 2, 3]));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::ArrayLengthMismatch);
    // no partial credit: element checks are not attempted
    assert!(report.details.iter().all(|d| !d.passed));
}

#[test]
fn test_unordered_matching_is_single_assignment() {
    // both expected elements would match the single 5; only one may
    let expected = json!(["{{compare:ignoreOrder}}", 5, 5]);
    let report = dc::compare_data(&expected, &json!([5, 6]));
    assert!(!report.success);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::ArrayElementMismatch);
    assert_eq!(report.errors[0].path, "[1]");
}

#[test]
fn test_unordered_works_with_directives_and_objects() {
    let expected = json!([
        "{{compare:ignoreOrder}}",
        {"name": "{{compare:startsWith:a}}"},
        {"name": "{{compare:startsWith:b}}"}
    ]);
    let actual = json!([{"name": "bob"}, {"name": "alice"}]);
    let report = dc::compare_data(&expected, &actual);
    assert!(report.success, "errors: {:?}", report.errors);
}

#[test]
fn test_trial_comparisons_do_not_leak_into_the_report() {
    let expected = json!(["{{compare:ignoreOrder}}", 2, 1]);
    let report = dc::compare_data(&expected, &json!([1, 2]));
    assert!(report.success);
    // failed pairings tried along the way must leave no trace
    assert!(report.errors.is_empty());
    assert!(report.details.iter().all(|d| d.passed));
}

#[test]
fn test_ignore_rest_requires_enough_elements() {
    let expected = json!([1, 2, 3, "{{compare:ignoreRest}}"]);
    let report = dc::compare_data(&expected, &json!([1, 2]));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::ArrayLengthMismatch);
}

#[test]
fn test_ignore_order_takes_priority_over_ignore_rest() {
    let expected = json!(["{{compare:ignoreOrder}}", "{{compare:ignoreRest}}", 1, 2]);
    // equal lengths after stripping: unordered strategy applies
    assert!(dc::compare_data(&expected, &json!([2, 1])).success);
    // ignoreRest would tolerate the extra element; ignoreOrder must not
    let report = dc::compare_data(&expected, &json!([2, 1, 3]));
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::ArrayLengthMismatch);
}

#[test]
fn test_ignore_element_skips_the_actual_value() {
    let expected = json!([1, "{{compare:ignore}}", 3]);
    let report = dc::compare_data(&expected, &json!([1, {"anything": [true]}, 3]));
    assert!(report.success, "errors: {:?}", report.errors);
}

#[test]
fn test_expected_array_against_non_array_is_a_type_mismatch() {
    let report = dc::compare_data(&json!([1, 2]), &json!({"0": 1, "1": 2}));
    assert!(!report.success);
    assert_eq!(report.errors[0].kind, ErrorKind::TypeMismatch);
}

#[test]
fn test_nested_arrays_carry_bracketed_paths() {
    let report = dc::compare_data(&json!({"rows": [[1, 2], [3, 4]]}), &json!({"rows": [[1, 2], [3, 9]]}));
    assert!(!report.success);
    assert_eq!(report.errors[0].path, "rows[1][1]");
}
