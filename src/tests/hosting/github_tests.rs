use super::*;

#[test]
fn head_field_422_is_eventual_consistency() {
    let body = r#"{"message":"Validation Failed","errors":[{"resource":"PullRequest","field":"head","code":"invalid"}]}"#;
    assert!(matches!(
        classify_create_failure(422, body),
        Some(GraftError::EventualConsistency(_))
    ));
}

#[test]
fn other_validation_errors_are_not_retryable() {
    let body = r#"{"message":"Validation Failed","errors":[{"resource":"PullRequest","code":"custom","message":"A pull request already exists for acme:feature-x."}]}"#;
    assert_eq!(classify_create_failure(422, body), None);
    assert_eq!(classify_create_failure(500, "{}"), None);
    assert_eq!(classify_create_failure(422, "not json"), None);
}

#[test]
fn merged_pull_maps_to_merged_state() {
    let raw = r#"{
        "number": 7,
        "title": "Add parser",
        "html_url": "https://github.com/acme/widgets/pull/7",
        "state": "closed",
        "merged_at": "2026-01-25T00:00:00Z",
        "head": {"ref": "feature-x"},
        "base": {"ref": "main"}
    }"#;
    let pull: GhPull = serde_json::from_str(raw).unwrap();
    let pr = PullRequest::from(pull);
    assert_eq!(pr.state, PrState::Merged);
    assert_eq!(pr.head_branch, "feature-x");
    assert_eq!(pr.base_branch, "main");
}
