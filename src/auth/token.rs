//! Bearer credential extraction from an incoming request.

use axum::extract::Query;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, Uri};

/// Length of the `"Bearer "` prefix stripped from the `Authorization` header.
const BEARER_PREFIX_LEN: usize = 7;

/// Name of both the query parameter and the cookie carrying the token.
const TOKEN_KEY: &str = "token";

/// Pulls the bearer credential out of a request.
///
/// Sources, first non-empty wins:
/// 1. `Authorization` header, minus its 7-byte `"Bearer "` prefix
/// 2. `token` query parameter (its first occurrence)
/// 3. `token` cookie, query-unescaped (`+` is a space)
///
/// Returns an empty string when no source carries a token.
#[must_use]
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> String {
    if let Some(token) = from_authorization(headers) {
        return token;
    }
    if let Some(token) = from_query(uri) {
        return token;
    }
    from_cookie(headers).unwrap_or_default()
}

fn from_authorization(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    // Shorter headers, or ones whose prefix ends mid-character, carry no token.
    value
        .get(BEARER_PREFIX_LEN..)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

fn from_query(uri: &Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    pairs
        .into_iter()
        .find(|(name, _)| name == TOKEN_KEY)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

fn from_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_KEY && !value.is_empty())
        .and_then(|(_, value)| unescape_cookie(value))
        .filter(|token| !token.is_empty())
}

/// Malformed escapes are kept verbatim; undecodable UTF-8 yields no token.
fn unescape_cookie(value: &str) -> Option<String> {
    urlencoding::decode(&value.replace('+', " "))
        .ok()
        .map(std::borrow::Cow::into_owned)
}
