use axum::{
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    Router,
};
use http::{HeaderValue, Uri};
use tower::ServiceBuilder;
use tower_http::{
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use tmpl_resp::errors;

use crate::{controllers::pages, AppState};

const TRACE_HEADER: &str = "X-Trace-Id";

pub struct AppRouter;

impl AppRouter {
    pub fn build(state: AppState) -> Router {
        Router::new()
            .merge(pages::new_router(state))
            .layer(
                ServiceBuilder::new().layer(
                    TraceLayer::new_for_http()
                        .make_span_with(
                            DefaultMakeSpan::new().level(Level::INFO),
                        )
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                ),
            )
            .layer(middleware::from_fn(Self::trace))
            .fallback(Self::not_found)
    }

    async fn trace(request: Request, next: Next) -> impl IntoResponse {
        let (mut head, body) = request.into_parts();
        let trace_header = match head.headers.get(TRACE_HEADER) {
            Some(v) => v.clone(),
            None => {
                let id = uuid::Uuid::new_v4().hyphenated().to_string();
                let v = HeaderValue::from_str(&id)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
                head.headers.insert(TRACE_HEADER, v.clone());
                v
            }
        };
        let mut response = next.run(Request::from_parts(head, body)).await;
        response.headers_mut().insert(TRACE_HEADER, trace_header);
        response
    }

    async fn not_found(uri: Uri) -> impl IntoResponse {
        errors::not_found(&format!("no route for {}", uri))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use http::{header::CONTENT_TYPE, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{App, AppConfig};

    fn router() -> Router {
        let config = AppConfig {
            site_name: String::from("docs"),
            ..Default::default()
        };
        AppRouter::build(AppState(Arc::new(App::new(config))))
    }

    async fn body_string(body: Body) -> String {
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_page() {
        let resp = router()
            .oneshot(http::Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert!(resp.headers().contains_key(TRACE_HEADER));
        let body = body_string(resp.into_body()).await;
        assert!(body.contains("<title>Pages | docs</title>"));
        assert_eq!(body.matches("<li>").count(), 2);
    }

    #[tokio::test]
    async fn hello_page() {
        let resp = router()
            .oneshot(
                http::Request::get("/hello?name=Moon")
                    .header(TRACE_HEADER, "abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[TRACE_HEADER], "abc");
        assert_eq!(resp.headers()["cache-control"], "no-store");
        let body = body_string(resp.into_body()).await;
        assert!(body.contains("<p>Hello, Moon</p>"));
        assert!(body.contains(concat!("docs ", env!("CARGO_PKG_VERSION"))));
    }

    #[tokio::test]
    async fn hello_defaults_to_world() {
        let resp = router()
            .oneshot(http::Request::get("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_string(resp.into_body()).await;
        assert!(body.contains("<p>Hello, World</p>"));
    }

    #[tokio::test]
    async fn unknown_route() {
        let resp = router()
            .oneshot(http::Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let payload: Value =
            serde_json::from_str(&body_string(resp.into_body()).await)
                .unwrap();
        assert_eq!(payload["code"], "1020005");
        assert_eq!(payload["message"], "Not found. no route for /nope");
    }
}
