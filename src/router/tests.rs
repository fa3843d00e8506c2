use http::Method;
use serde_json::Value;

use super::{ParamKind, PathValue, RouteTemplate, Router};
use crate::dispatcher::{Action, ActionContext, ControllerId};
use crate::error::{RegistrationError, TemplateError};

fn action(name: &str, arity: usize) -> Action {
    Action::raw(&ControllerId::new("test"), name, arity, |_, _| Ok(Value::Null))
}

fn values(template: &RouteTemplate, path: &str) -> Vec<PathValue> {
    template
        .extract(path)
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|p| p.value)
        .collect()
}

#[test]
fn test_prefix_is_normalized() {
    let t = RouteTemplate::new("books", "list");
    assert_eq!(t.prefix(), "/books");
    assert_eq!(t.compiled_pattern(), Some("^/books/list$"));

    let root = RouteTemplate::new("/", "about");
    assert_eq!(root.compiled_pattern(), Some("^/about$"));
    assert!(root.is_match("/about"));
}

#[test]
fn test_typed_placeholders_compile() {
    let t = RouteTemplate::new("books", "{string:category}/{int:id}.html");
    assert!(t.is_valid());
    assert_eq!(
        t.compiled_pattern(),
        Some(r"^/books/([0-9a-zA-Z\-_]+)/([0-9]+).html$")
    );
    let params: Vec<_> = t.params().iter().map(|p| (p.name(), p.kind())).collect();
    assert_eq!(
        params,
        vec![("category", ParamKind::String), ("id", ParamKind::Int)]
    );
}

#[test]
fn test_placeholder_type_resolution() {
    let t = RouteTemplate::new("a", "{id}/{INT:n}/{Long:big}/{uuid:ref}/{int:}");
    let params: Vec<_> = t.params().iter().map(|p| (p.name(), p.kind())).collect();
    assert_eq!(
        params,
        vec![
            ("id", ParamKind::String),
            ("n", ParamKind::Int),
            ("big", ParamKind::Long),
            ("ref", ParamKind::String),
            ("int", ParamKind::String),
        ]
    );
}

#[test]
fn test_capture_count_matches_params() {
    for pattern in [
        "",
        "*",
        "list",
        "{id}",
        "files/*",
        "{string:a}/{int:b}/{long:c}",
        "*/{int:id}",
        "{int:year}-{int:month}/*.html",
    ] {
        let t = RouteTemplate::new("/p", pattern);
        assert!(t.is_valid(), "{pattern} should be valid");
        assert_eq!(t.capture_count(), t.params().len(), "pattern {pattern}");
    }
}

#[test]
fn test_extract_round_trip() {
    let t = RouteTemplate::new("/shop", "{string:category}/{int:id}/{long:sku}.html");
    assert_eq!(
        values(&t, "/shop/garden-tools/17/9000000000.html"),
        vec![
            PathValue::Str("garden-tools".into()),
            PathValue::Int(17),
            PathValue::Long(9_000_000_000),
        ]
    );

    let names: Vec<_> = t
        .extract("/shop/a/1/2.html")
        .unwrap()
        .unwrap()
        .iter()
        .map(|p| p.name.to_string())
        .collect();
    assert_eq!(names, ["category", "id", "sku"]);
}

#[test]
fn test_int_and_long_typing() {
    let int = RouteTemplate::new("books", "{int:id}");
    let long = RouteTemplate::new("books", "{long:id}");
    assert_eq!(values(&int, "/books/42"), vec![PathValue::Int(42)]);
    assert_eq!(values(&long, "/books/42"), vec![PathValue::Long(42)]);
}

#[test]
fn test_numeric_overflow_is_a_conversion_error() {
    let t = RouteTemplate::new("books", "{int:id}");
    let err = t.extract("/books/99999999999").unwrap_err();
    assert_eq!(err.name, "id");
    assert_eq!(err.kind, ParamKind::Int);
    assert_eq!(err.raw, "99999999999");

    let long = RouteTemplate::new("books", "{long:id}");
    assert_eq!(
        values(&long, "/books/99999999999"),
        vec![PathValue::Long(99_999_999_999)]
    );
}

#[test]
fn test_non_numeric_segment_is_never_a_number() {
    let t = RouteTemplate::new("books", "{int:id}");
    assert!(!t.is_match("/books/abc"));
    assert_eq!(t.extract("/books/abc").unwrap(), None);

    let err = ParamKind::Int.convert("id", "abc").unwrap_err();
    assert_eq!(err.to_string(), "path parameter 'id' expects int, got 'abc'");
    assert!(ParamKind::Long.convert("id", "12x").is_err());
    assert_eq!(
        ParamKind::String.convert("id", "abc").unwrap(),
        PathValue::Str("abc".into())
    );
}

#[test]
fn test_extract_without_params_or_match() {
    let fixed = RouteTemplate::new("books", "list");
    assert!(fixed.is_match("/books/list"));
    assert_eq!(fixed.extract("/books/list").unwrap(), None);

    let t = RouteTemplate::new("books", "{int:id}");
    assert_eq!(t.extract("/authors/1").unwrap(), None);
    assert_eq!(t.extract("/books/1/extra").unwrap(), None);
}

#[test]
fn test_wildcard_spans_segments() {
    let t = RouteTemplate::new("static", "*");
    assert!(t.is_universal());
    assert!(t.params().is_empty());
    assert!(t.is_match("/static/"));
    assert!(t.is_match("/static/css/site.min.css"));
    assert!(!t.is_match("/other/site.css"));

    let mixed = RouteTemplate::new("files", "*/{int:id}");
    assert_eq!(values(&mixed, "/files/a/b/7"), vec![PathValue::Int(7)]);
}

#[test]
fn test_illegal_prefix_is_invalid() {
    for prefix in ["bo oks", "books!", "/a.b", "/books?x", "/ü"] {
        let t = RouteTemplate::new(prefix, "list");
        assert!(!t.is_valid(), "{prefix} should be rejected");
        assert!(matches!(t.error(), Some(TemplateError::IllegalPrefix { .. })));
        assert_eq!(t.compiled_pattern(), None);
        assert!(!t.is_match("/books/list"));
    }
}

#[test]
fn test_malformed_pattern_is_invalid() {
    for pattern in ["{int:id", "id}", "{}", "{a{b}}", "x/{int:id}/}"] {
        let t = RouteTemplate::new("books", pattern);
        assert!(!t.is_valid(), "{pattern} should be rejected");
        assert!(matches!(
            t.error(),
            Some(TemplateError::MalformedPattern { .. })
        ));
    }
}

#[test]
fn test_pattern_charset_violation_is_tolerated() {
    // Leading slash and '~' fail the charset rule, which is only logged.
    let t = RouteTemplate::new("books", "/list");
    assert!(t.is_valid());
    assert_eq!(t.compiled_pattern(), Some("^/books//list$"));

    let tilde = RouteTemplate::new("books", "~draft");
    assert!(tilde.is_valid());
    assert!(tilde.is_match("/books/~draft"));
}

#[test]
fn test_unbalanced_regex_is_invalid() {
    let t = RouteTemplate::new("books", "list(");
    assert!(!t.is_valid());
    assert!(matches!(t.error(), Some(TemplateError::Regex { .. })));
}

#[test]
fn test_universal_detection() {
    let cases = [
        ("*", true),
        ("files/*", true),
        ("files/*.txt", true),
        ("{id}", true),
        ("a/{int:id}.html", true),
        ("list", false),
        ("", false),
        ("a/b.html", false),
        ("a*", false),
    ];
    for (pattern, expected) in cases {
        assert_eq!(
            RouteTemplate::new("p", pattern).is_universal(),
            expected,
            "pattern {pattern}"
        );
    }
}

#[test]
fn test_literal_route_wins_regardless_of_order() {
    let mut param_first = Router::new();
    param_first
        .register(Method::GET, "books", "{string:id}", action("show", 1))
        .unwrap();
    param_first
        .register(Method::GET, "books", "list", action("list", 0))
        .unwrap();

    let mut literal_first = Router::new();
    literal_first
        .register(Method::GET, "books", "list", action("list", 0))
        .unwrap();
    literal_first
        .register(Method::GET, "books", "{string:id}", action("show", 1))
        .unwrap();

    for router in [&param_first, &literal_first] {
        let entry = router.route(&Method::GET, "/books/list").unwrap();
        assert_eq!(entry.action.name(), "list");
        let entry = router.route(&Method::GET, "/books/dune").unwrap();
        assert_eq!(entry.action.name(), "show");
    }
}

#[test]
fn test_first_registered_universal_wins() {
    let mut router = Router::new();
    router
        .register(Method::GET, "docs", "*", action("catch_all", 0))
        .unwrap();
    router
        .register(Method::GET, "docs", "{string:page}", action("page", 1))
        .unwrap();

    let entry = router.route(&Method::GET, "/docs/intro").unwrap();
    assert_eq!(entry.action.name(), "catch_all");
}

#[test]
fn test_routes_are_per_method() {
    let mut router = Router::new();
    router
        .register(Method::POST, "books", "{int:id}", action("update", 1))
        .unwrap();

    assert!(router.route(&Method::GET, "/books/1").is_none());
    assert_eq!(
        router.route(&Method::POST, "/books/1").unwrap().action.name(),
        "update"
    );
}

#[test]
fn test_invalid_template_is_not_registered() {
    let mut router = Router::new();
    let err = router
        .register(Method::GET, "bad prefix", "list", action("list", 0))
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::InvalidTemplate {
            source: TemplateError::IllegalPrefix { .. },
            ..
        }
    ));
    assert!(router.is_empty());
    assert!(router.route(&Method::GET, "/bad prefix/list").is_none());
}

#[test]
fn test_arity_mismatch_is_rejected() {
    let mut router = Router::new();
    let err = router
        .register(Method::GET, "books", "{string:c}/{int:id}", action("show", 1))
        .unwrap_err();
    match err {
        RegistrationError::ArityMismatch {
            declared, expected, ..
        } => {
            assert_eq!(declared, 1);
            assert_eq!(expected, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(router.len(), 0);
}

#[test]
fn test_no_match_returns_none() {
    let mut router = Router::new();
    router
        .register(Method::GET, "books", "list", action("list", 0))
        .unwrap();
    assert!(router.route(&Method::GET, "/books").is_none());
    assert!(router.route(&Method::GET, "/books/list/").is_none());
    assert!(router.route(&Method::DELETE, "/books/list").is_none());
}

fn list(_ctx: &mut ActionContext<'_>) -> anyhow::Result<Vec<i32>> {
    Ok(vec![1, 2])
}

fn remove(_ctx: &mut ActionContext<'_>, id: i32) -> anyhow::Result<i32> {
    Ok(id)
}

#[test]
fn test_controller_scope_registers_under_prefix() {
    let mut router = Router::new();
    router
        .controller("books", "/books")
        .get("list", "list", list)
        .unwrap()
        .delete("{int:id}", "remove", remove)
        .unwrap();

    assert_eq!(router.len(), 2);
    let entry = router.route(&Method::DELETE, "/books/3").unwrap();
    assert_eq!(entry.action.controller().as_str(), "books");
    assert_eq!(entry.action.arity(), 1);
    assert_eq!(router.routes().count(), 2);
}

#[test]
fn test_routes_listed_in_method_order() {
    // Each table gets its own hasher seed, so the listing must not depend on it.
    for _ in 0..8 {
        let mut router = Router::new();
        router
            .register(Method::POST, "books", "new", action("create", 0))
            .unwrap();
        router
            .register(Method::GET, "books", "{string:id}", action("show", 1))
            .unwrap();
        router
            .register(Method::DELETE, "books", "{int:id}", action("remove", 1))
            .unwrap();
        router
            .register(Method::GET, "books", "list", action("list", 0))
            .unwrap();

        let listed: Vec<_> = router
            .routes()
            .map(|e| (e.method.as_str(), e.action.name()))
            .collect();
        assert_eq!(
            listed,
            [
                ("DELETE", "remove"),
                ("GET", "list"),
                ("GET", "show"),
                ("POST", "create"),
            ]
        );
    }
}

#[test]
fn test_path_params_serialize() {
    let t = RouteTemplate::new("books", "{string:category}/{long:id}");
    let params = t.extract("/books/poetry/12").unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(&params).unwrap(),
        serde_json::json!([
            { "name": "category", "value": "poetry" },
            { "name": "id", "value": 12 },
        ])
    );
}
