#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use routeplate::dispatcher::Disposition;
use routeplate::middleware::MiddlewareChain;
use routeplate::server::ResponseBody;
use routeplate::DispatchError;
use serde_json::json;

#[test]
fn test_typed_handler_returns_json() {
    let dispatcher = common::bookstore(MiddlewareChain::new());
    let outcome = dispatcher.dispatch(common::get("/books/novel/42.html"));

    assert!(matches!(outcome.disposition, Disposition::Handled));
    assert_eq!(outcome.status(), 200);
    assert_eq!(
        outcome.response.body(),
        &ResponseBody::Json(json!({ "category": "novel", "id": 42 }))
    );
    assert_eq!(
        outcome.response.body().to_bytes(),
        br#"{"category":"novel","id":42}"#.to_vec()
    );
}

#[test]
fn test_string_result_is_plain_text() {
    let dispatcher = common::bookstore(MiddlewareChain::new());
    let outcome = dispatcher.dispatch(common::get("/books/isbn/9780441013593"));

    assert_eq!(outcome.status(), 200);
    assert_eq!(
        outcome.response.body(),
        &ResponseBody::Text("isbn 9780441013593".into())
    );
    assert_eq!(outcome.response.get_header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_literal_route_dispatches_to_literal_action() {
    let dispatcher = common::bookstore(MiddlewareChain::new());

    let outcome = dispatcher.dispatch(common::get("/books/list"));
    assert_eq!(outcome.response.body(), &ResponseBody::Json(json!(["dune", "emma"])));

    let outcome = dispatcher.dispatch(common::get("/books/sci-fi"));
    assert_eq!(
        outcome.response.body(),
        &ResponseBody::Text("category sci-fi".into())
    );
}

#[test]
fn test_unknown_path_is_404() {
    let dispatcher = common::bookstore(MiddlewareChain::new());
    for path in ["/", "/books", "/books/novel/x.html", "/authors/1"] {
        let outcome = dispatcher.dispatch(common::get(path));
        assert!(
            matches!(outcome.disposition, Disposition::NoRoute),
            "{path} should not route"
        );
        assert_eq!(outcome.status(), 404);
    }
}

#[test]
fn test_handler_failure_is_500_with_message() {
    let dispatcher = common::bookstore(MiddlewareChain::new());
    let outcome = dispatcher.dispatch(common::get("/books/novel/0.html"));

    assert!(matches!(
        outcome.disposition,
        Disposition::Failed(DispatchError::Handler(_))
    ));
    assert_eq!(outcome.status(), 500);
    assert_eq!(
        outcome.response.body(),
        &ResponseBody::Text("book 0 does not exist".into())
    );
}

#[test]
fn test_out_of_range_parameter_is_500() {
    let dispatcher = common::bookstore(MiddlewareChain::new());
    let outcome = dispatcher.dispatch(common::get("/books/novel/4294967296.html"));

    match outcome.disposition {
        Disposition::Failed(DispatchError::ParamConversion(e)) => {
            assert_eq!(e.name, "id");
            assert_eq!(e.raw, "4294967296");
        }
        other => panic!("unexpected disposition: {other:?}"),
    }
    assert_eq!(outcome.response.status_code(), 500);
}

#[test]
fn test_request_id_follows_client_header() {
    let dispatcher = common::bookstore(MiddlewareChain::new());
    let request = common::get("/books/list").with_header("x-request-id", "01ARZ3NDEKTSV4RRFFQ69G5FAV");
    assert_eq!(request.request_id.to_string(), "01ARZ3NDEKTSV4RRFFQ69G5FAV");

    let outcome = dispatcher.dispatch(request);
    assert_eq!(outcome.status(), 200);
}
