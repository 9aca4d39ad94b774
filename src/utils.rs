use std::sync::LazyLock;

use axum::http::{HeaderMap, header};
use chrono::Utc;
use getrandom::fill;
use hex::encode;
use regex::Regex;

use crate::error::Error;

// Matrix user identifiers: @localpart:server.name
pub static USER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[a-z0-9._=/+-]+:[A-Za-z0-9.-]+(:\d+)?$").unwrap());

/// Extracts the bearer token from the `Authorization` header.
///
/// Every failure mode is `Unauthorized`: a missing header, a non-Bearer
/// scheme and an empty token are all the same thing to a caller that has
/// not proven who it is.
pub fn get_auth_header(headers: &HeaderMap) -> Result<&str, Error> {
    let auth_raw = headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::Unauthorized(
            "Missing authorization header".to_string(),
        ))?
        .to_str()
        .map_err(|_| Error::Unauthorized("Invalid authorization format".to_string()))?;

    let mut auth = auth_raw.split_whitespace();

    let auth_type = auth.next();

    let auth_value = auth.next();

    if auth_type.is_none_or(|at| at != "Bearer") {
        return Err(Error::Unauthorized(
            "Invalid authorization format".to_string(),
        ));
    }

    auth_value.ok_or(Error::Unauthorized("No token provided".to_string()))
}

/// Generates a Matrix-style event identifier (`$` followed by 32 hex chars).
pub fn generate_event_id() -> Result<String, getrandom::Error> {
    let mut buf = [0u8; 16];
    fill(&mut buf)?;
    Ok(format!("${}", encode(buf)))
}

/// Shared clock; all persisted timestamps are epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers_with_auth("Bearer abc123");
        assert_eq!(get_auth_header(&headers).unwrap(), "abc123");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(matches!(
            get_auth_header(&headers),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert!(matches!(
            get_auth_header(&headers),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn empty_token_is_unauthorized() {
        let headers = headers_with_auth("Bearer");
        assert!(matches!(
            get_auth_header(&headers),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn event_ids_are_dollar_prefixed_hex() {
        let id = generate_event_id().unwrap();
        assert_eq!(id.len(), 33);
        assert!(id.starts_with('$'));
        assert!(id[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn user_id_regex_accepts_canonical_ids() {
        assert!(USER_ID_REGEX.is_match("@alice:example.com"));
        assert!(USER_ID_REGEX.is_match("@bob.smith_2:matrix.org"));
        assert!(USER_ID_REGEX.is_match("@carol:localhost:8448"));
    }

    #[test]
    fn user_id_regex_rejects_garbage() {
        assert!(!USER_ID_REGEX.is_match("alice"));
        assert!(!USER_ID_REGEX.is_match("@alice"));
        assert!(!USER_ID_REGEX.is_match("@Alice:example.com"));
        assert!(!USER_ID_REGEX.is_match(""));
    }
}
