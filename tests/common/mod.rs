#![allow(dead_code)]

use http::Method;
use routeplate::dispatcher::{ActionContext, Dispatcher};
use routeplate::middleware::MiddlewareChain;
use routeplate::router::Router;
use routeplate::server::HandlerRequest;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Book {
    pub category: String,
    pub id: i32,
}

fn by_category(_ctx: &mut ActionContext<'_>, category: String) -> anyhow::Result<String> {
    Ok(format!("category {category}"))
}

fn list(_ctx: &mut ActionContext<'_>) -> anyhow::Result<Vec<&'static str>> {
    Ok(vec!["dune", "emma"])
}

fn show(_ctx: &mut ActionContext<'_>, category: String, id: i32) -> anyhow::Result<Book> {
    if id == 0 {
        anyhow::bail!("book 0 does not exist");
    }
    Ok(Book { category, id })
}

fn isbn(_ctx: &mut ActionContext<'_>, isbn: i64) -> anyhow::Result<String> {
    Ok(format!("isbn {isbn}"))
}

fn asset(_ctx: &mut ActionContext<'_>) -> anyhow::Result<&'static str> {
    Ok("asset")
}

/// Router for a small bookstore: a literal route, typed routes and a wildcard.
pub fn bookstore_router() -> Router {
    let mut router = Router::new();
    router
        .controller("books", "books")
        .get("{string:category}", "by_category", by_category)
        .unwrap()
        .get("list", "list", list)
        .unwrap()
        .get("{string:category}/{int:id}.html", "show", show)
        .unwrap()
        .get("isbn/{long:isbn}", "isbn", isbn)
        .unwrap();
    router
        .controller("assets", "static")
        .get("*", "asset", asset)
        .unwrap();
    router
}

pub fn bookstore(chain: MiddlewareChain) -> Dispatcher {
    Dispatcher::new(bookstore_router(), chain)
}

pub fn get(path: &str) -> HandlerRequest {
    HandlerRequest::new(Method::GET, path)
}
