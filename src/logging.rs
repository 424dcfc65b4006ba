use axum::{
    extract::Request,
    http::{header, HeaderMap, Method, Uri},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // a second call (e.g. from tests) leaves the first subscriber in place
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// One access log line per request
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_agent = header_or_dash(request.headers(), header::USER_AGENT.as_str());
    let remote_addr = client_address(request.headers());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let content_length = header_or_dash(response.headers(), header::CONTENT_LENGTH.as_str());
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    info!(
        target: "access_log",
        "{} {} \"{}\" {} {} {}ms \"{}\"",
        timestamp,
        remote_addr,
        format_request(&method, &uri),
        response.status().as_u16(),
        content_length,
        duration.as_millis(),
        user_agent,
    );

    response
}

/// Client address as reported by a fronting proxy, or `-`
fn client_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .or_else(|| headers.get("x-real-ip").and_then(|h| h.to_str().ok()))
        .unwrap_or("-")
        .to_string()
}

fn header_or_dash(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

fn format_request(method: &Method, uri: &Uri) -> String {
    format!("{} {} HTTP/1.1", method, uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderValue, http::StatusCode, response::Html, routing::get, Router};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_logging_middleware_passes_response_through() {
        let app = Router::new()
            .route("/test", get(|| async { Html("Hello, World!") }))
            .layer(axum::middleware::from_fn(logging_middleware));

        let server = TestServer::new(app).unwrap();
        let response = server.get("/test").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Hello, World!");
    }

    #[test]
    fn test_client_address_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_address(&headers), "-");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_address(&headers), "10.0.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_address(&headers), "203.0.113.7");
    }

    #[test]
    fn test_format_request() {
        let uri: Uri = "/admin/allowlist?settings-updated=true".parse().unwrap();
        assert_eq!(
            format_request(&Method::GET, &uri),
            "GET /admin/allowlist?settings-updated=true HTTP/1.1"
        );
    }
}
