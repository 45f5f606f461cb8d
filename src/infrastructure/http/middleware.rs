//! HTTP Middleware
//!
//! HTTP 状态码错误日志中间件

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 超过该耗时的请求记录为慢请求（毫秒）
///
/// 剧本合成等待远端服务，通常需要数秒，不计入。
const SLOW_REQUEST_MS: u128 = 30_000;

/// HTTP 状态码错误日志中间件
///
/// 4xx 记 warn，5xx 记 error；业务错误（errno != 0）在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        );
    } else if elapsed_ms > SLOW_REQUEST_MS {
        tracing::warn!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed_ms,
            "Slow HTTP request"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::{get, post},
        Router,
    };
    use tower::util::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/api/ping", get(|| async { "ok" }))
            .route("/api/live/start", post(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_passes_responses_through() {
        assert_eq!(status_of("GET", "/api/ping").await, StatusCode::OK);
        assert_eq!(
            status_of("POST", "/api/live/start").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        assert_eq!(status_of("GET", "/api/missing").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("GET", "/api/live/start").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
