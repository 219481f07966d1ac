use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::ApiError;

/// Pull the bearer token out of the Authorization header. Every authenticated
/// endpoint funnels through this before hitting the token verifier.
pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    match raw.trim().split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = rest.trim();
            if token.is_empty() {
                Err(ApiError::unauthorized("missing bearer token"))
            } else {
                Ok(token.to_string())
            }
        }
        Some(_) => Err(ApiError::unauthorized("invalid authorization scheme")),
        None => Err(ApiError::unauthorized("missing bearer token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn header(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn require_bearer_extracts_token_case_insensitive() {
        let token = require_bearer(&header("bearer TOKEN123")).expect("token should be extracted");
        assert_eq!(token, "TOKEN123");
    }

    #[test]
    fn require_bearer_rejects_missing_token() {
        let error = require_bearer(&header("Bearer")).expect_err("should reject missing token");
        assert_eq!(error.status, axum::http::StatusCode::UNAUTHORIZED);
        assert!(error.message.contains("missing bearer token"));
    }

    #[test]
    fn require_bearer_rejects_basic_scheme() {
        let error =
            require_bearer(&header("Basic dXNlcjpwdw==")).expect_err("should reject basic auth");
        assert_eq!(error.status, axum::http::StatusCode::UNAUTHORIZED);
        assert!(error.message.contains("invalid authorization scheme"));
    }

    #[test]
    fn require_bearer_tolerates_extra_whitespace() {
        let token = require_bearer(&header("Bearer   abc.def.ghi ")).expect("token expected");
        assert_eq!(token, "abc.def.ghi");
    }
}
