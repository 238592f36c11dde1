//! Request middleware: access logging and optional HTTP Basic auth

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Log every request before it is dispatched
pub async fn log_request(req: Request, next: Next) -> Response {
    tracing::info!("handle {} {}", req.method(), req.uri().path());
    next.run(req).await
}

/// The single username/password pair accepted by [`require_basic_auth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("admin", "admin")
    }
}

/// Reject requests that do not carry the expected Basic credentials
pub async fn require_basic_auth(
    State(credentials): State<Arc<Credentials>>,
    req: Request,
    next: Next,
) -> Response {
    match basic_credentials(req.headers()) {
        Some((username, password))
            if username == credentials.username && password == credentials.password =>
        {
            next.run(req).await
        }
        Some((username, _)) => {
            tracing::warn!("Rejected credentials for user {}", username);
            unauthorized()
        }
        None => unauthorized(),
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"todolist\""),
        )],
        "Unauthorized",
    )
        .into_response()
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_basic_credentials() {
        // "admin:s3cr:et"
        let headers = headers_with("Basic YWRtaW46czNjcjpldA==");
        assert_eq!(
            basic_credentials(&headers),
            Some(("admin".to_string(), "s3cr:et".to_string()))
        );
    }

    #[test]
    fn rejects_when_authorization_header_missing() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
    }

    #[test]
    fn rejects_when_scheme_is_not_basic() {
        assert!(basic_credentials(&headers_with("Bearer YWRtaW46YWRtaW4=")).is_none());
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(basic_credentials(&headers_with("Basic not-base64!")).is_none());
        // "nocolon"
        assert!(basic_credentials(&headers_with("Basic bm9jb2xvbg==")).is_none());
    }
}
