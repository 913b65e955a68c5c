use std::sync::Arc;

use askama::Template;
use axum::{extract::Query, routing::get, Router};
use http::{HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use tmpl_resp::{into_context, DeferredResponse, Result};

use crate::AppState;

pub fn new_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/hello", get(hello))
        .with_state(state)
}

#[derive(Template, Deserialize)]
#[template(path = "index.html")]
pub struct Index {
    pub site_name: String,
    pub version: String,
    pub title: String,
    pub pages: Vec<String>,
}

#[derive(Template, Deserialize)]
#[template(path = "hello.html")]
pub struct Hello {
    pub site_name: String,
    pub version: String,
    pub name: String,
}

async fn index(app: AppState) -> Result<DeferredResponse> {
    let context = into_context(json!({
        "title": "Pages",
        "pages": ["/", "/hello"],
    }))?;
    Ok(DeferredResponse::ok(Arc::clone(&app.renderers.index), context))
}

#[derive(Debug, Deserialize)]
struct HelloQuery {
    name: Option<String>,
}

async fn hello(
    app: AppState,
    Query(query): Query<HelloQuery>,
) -> Result<DeferredResponse> {
    info!("hello query {:?}", query);
    let name = query.name.unwrap_or_else(|| String::from("World"));
    let context = into_context(json!({ "name": name }))?;
    Ok(DeferredResponse::ok(Arc::clone(&app.renderers.hello), context)
        .with_header(
            HeaderName::from_static("cache-control"),
            HeaderValue::from_static("no-store"),
        ))
}
