//! Security headers middleware
//!
//! Adds security-related HTTP headers to every response, following OWASP
//! recommendations:
//!
//! - `X-Content-Type-Options: nosniff` - prevents MIME type sniffing
//! - `X-Frame-Options: DENY` - prevents clickjacking
//! - `Referrer-Policy: strict-origin-when-cross-origin`
//! - `Content-Security-Policy` - restricts resource loading
//!
//! HTTPS enforcement (HSTS) belongs to the TLS-terminating proxy in front of
//! this server.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

/// Applies the security headers to the response.
///
/// Use with `axum::middleware::from_fn`:
///
/// ```no_run
/// use axum::{middleware, Router};
/// use flowboard_api::middleware::security::security_headers;
///
/// let app: Router = Router::new().layer(middleware::from_fn(security_headers));
/// ```
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'"),
    );

    response
}
