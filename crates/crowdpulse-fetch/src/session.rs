//! Per-run anonymous session state.
//!
//! Some sources only serve their JSON API to clients holding a cookie issued
//! by the landing page. The token is acquired once per pipeline run and passed
//! explicitly into every fetch; it is never written into shared client headers.

use reqwest::header::SET_COOKIE;

/// Cookie material acquired by a warm-up request. Empty when warm-up was
/// skipped or failed; requests then go out without a `Cookie` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken {
    cookie: Option<String>,
}

impl SessionToken {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Token carrying a single `name=value` cookie pair.
    #[must_use]
    pub fn with_cookie(name: &str, value: &str) -> Self {
        Self {
            cookie: Some(format!("{name}={value}")),
        }
    }

    /// Value for the `Cookie` request header, if any.
    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookie.is_none()
    }
}

/// Finds `cookie_name` among `Set-Cookie` response headers and returns its value.
pub(crate) fn find_cookie(headers: &reqwest::header::HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| parse_set_cookie(raw, cookie_name))
}

fn parse_set_cookie(raw: &str, cookie_name: &str) -> Option<String> {
    let pair = raw.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    if name.trim() != cookie_name {
        return None;
    }
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn parse_set_cookie_extracts_named_value() {
        let raw = "xq_a_token=abc123; path=/; domain=.xueqiu.com; httponly";
        assert_eq!(
            parse_set_cookie(raw, "xq_a_token").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn parse_set_cookie_ignores_other_names() {
        assert_eq!(parse_set_cookie("u=1; path=/", "xq_a_token"), None);
    }

    #[test]
    fn parse_set_cookie_rejects_empty_value() {
        assert_eq!(parse_set_cookie("xq_a_token=; path=/", "xq_a_token"), None);
    }

    #[test]
    fn find_cookie_scans_every_set_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("acw_tc=zzz; path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("xq_a_token=tok; path=/"),
        );
        assert_eq!(find_cookie(&headers, "xq_a_token").as_deref(), Some("tok"));
    }

    #[test]
    fn token_formats_cookie_header() {
        let token = SessionToken::with_cookie("xq_a_token", "tok");
        assert_eq!(token.cookie_header(), Some("xq_a_token=tok"));
        assert!(SessionToken::none().is_empty());
    }
}
