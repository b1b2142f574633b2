use std::collections::HashMap;

use crate::error::NavigationError;
use crate::locator::ResourceSelector;
use crate::navigation::{
    parse_line, NavigationReference, NavigationRequest, NavigationTarget, RequestKind,
};

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_reference_without_line() {
    let reference =
        NavigationReference::new("jetbrains", "Acme", "src/main/java/com/acme/Foo.java", None);
    assert_eq!(
        reference.as_str(),
        "jetbrains://idea/navigate/reference?project=Acme&path=src/main/java/com/acme/Foo.java"
    );
}

#[test]
fn test_reference_line_is_zero_based() {
    let reference =
        NavigationReference::new("jetbrains", "Acme", "src/main/java/com/acme/Foo.java", Some(10));
    assert!(reference.as_str().ends_with("Foo.java:9"));

    let first = NavigationReference::new("jetbrains", "Acme", "a.txt", Some(1));
    assert!(first.as_str().ends_with("a.txt:0"));
}

#[test]
fn test_reference_encodes_unsafe_path_characters() {
    let reference =
        NavigationReference::new("jetbrains", "my-app_2", "docs/release notes&v2.md", None);
    assert_eq!(
        reference.to_string(),
        "jetbrains://idea/navigate/reference?project=my-app_2&path=docs/release%20notes%26v2.md"
    );
}

#[test]
fn test_class_request() {
    let request = NavigationRequest::from_query(
        RequestKind::Class,
        &query(&[("project", "Acme"), ("class", "com.acme.Foo$1"), ("line", "10")]),
    )
    .unwrap();

    assert_eq!(request.project, "Acme");
    assert_eq!(request.line, Some(10));
    assert!(!request.test_priority);
    match request.target {
        NavigationTarget::Class(reference) => assert_eq!(reference.to_string(), "com.acme.Foo"),
        other => panic!("expected class target, got {other:?}"),
    }
}

#[test]
fn test_resource_request_regex_wins_over_path() {
    let request = NavigationRequest::from_query(
        RequestKind::Resource,
        &query(&[
            ("project", "Acme"),
            ("path", "/a.yml"),
            ("regex", r".*\.yml"),
            ("focustestresource", ""),
        ]),
    )
    .unwrap();

    assert!(request.test_priority);
    assert_eq!(request.kind(), RequestKind::Resource);
    assert!(matches!(
        request.target,
        NavigationTarget::Resource(ResourceSelector::Regex(_))
    ));
}

#[test]
fn test_resource_path_kinds() {
    let literal = NavigationRequest::from_query(
        RequestKind::Resource,
        &query(&[("project", "Acme"), ("path", "/templates/example.html")]),
    )
    .unwrap();
    assert!(matches!(
        literal.target,
        NavigationTarget::Resource(ResourceSelector::Literal(ref p)) if p == "templates/example.html"
    ));

    let glob = NavigationRequest::from_query(
        RequestKind::Resource,
        &query(&[("project", "Acme"), ("path", "/templates/**/example.html")]),
    )
    .unwrap();
    assert!(matches!(
        glob.target,
        NavigationTarget::Resource(ResourceSelector::Glob { .. })
    ));
}

#[test]
fn test_invalid_requests() {
    let cases: Vec<(RequestKind, Vec<(&str, &str)>)> = vec![
        (RequestKind::Class, vec![("class", "com.acme.Foo")]),
        (RequestKind::Class, vec![("project", "Acme")]),
        (RequestKind::Class, vec![("project", "../Acme"), ("class", "com.acme.Foo")]),
        (RequestKind::Resource, vec![("project", "Acme")]),
        (RequestKind::Resource, vec![("project", "Acme"), ("regex", "(")]),
        (
            RequestKind::Class,
            vec![("project", "Acme"), ("class", "com.acme.Foo"), ("line", "0")],
        ),
        (
            RequestKind::Class,
            vec![("project", "Acme"), ("class", "com.acme.Foo"), ("line", "ten")],
        ),
    ];

    for (kind, pairs) in cases {
        let err = NavigationRequest::from_query(kind, &query(&pairs)).unwrap_err();
        assert!(
            matches!(err, NavigationError::InvalidReference(_)),
            "{pairs:?} gave {err:?}"
        );
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn test_line_parsing() {
    assert_eq!(parse_line("42"), Ok(42));
    assert_eq!(parse_line(" 7 "), Ok(7));
    assert!(parse_line("-1").is_err());
}

#[test]
fn test_not_found_messages() {
    assert_eq!(RequestKind::Class.not_found().to_string(), "Class file not found");
    assert_eq!(RequestKind::Resource.not_found().to_string(), "Resource not found");
    assert_eq!(NavigationError::Cancelled.to_string(), "Selection cancelled");
}
