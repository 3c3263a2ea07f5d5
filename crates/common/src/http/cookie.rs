use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "session";

/// Session cookie as sent in `Set-Cookie`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub value: String,
    pub max_age_seconds: i64,
    pub secure: bool,
}

impl SessionCookie {
    pub fn new(value: String, max_age_seconds: i64, secure: bool) -> Self {
        Self {
            value,
            max_age_seconds: max_age_seconds.max(0),
            secure,
        }
    }

    /// Expired cookie that makes the browser drop the session
    pub fn clear(secure: bool) -> Self {
        Self::new(String::new(), 0, secure)
    }

    pub fn to_header_value(&self) -> String {
        let mut parts = vec![
            format!("{}={}", SESSION_COOKIE_NAME, self.value),
            format!("Max-Age={}", self.max_age_seconds),
            "Path=/".to_string(),
            "HttpOnly".to_string(),
            "SameSite=Lax".to_string(),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.join("; ")
    }

    /// Header value for `Set-Cookie`, `None` if the token has illegal characters
    pub fn to_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.to_header_value()).ok()
    }
}

/// Session token from the session cookie, else from `Authorization: Bearer`
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    from_cookie.or_else(|| {
        let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_flags() {
        let header = SessionCookie::new("tok".to_string(), 3600, true).to_header_value();
        assert_eq!(
            header,
            "session=tok; Max-Age=3600; Path=/; HttpOnly; SameSite=Lax; Secure"
        );

        let header = SessionCookie::new("tok".to_string(), 3600, false).to_header_value();
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = SessionCookie::clear(false);
        assert!(cookie.to_header_value().starts_with("session=; Max-Age=0"));
    }

    #[test]
    fn test_extract_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "theme=dark; session=abc.def.ghi; lang=it".parse().unwrap(),
        );
        assert_eq!(extract_session_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_similar_cookie_names_do_not_match() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "session_old=zzz".parse().unwrap());
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer tok123".parse().unwrap());
        assert_eq!(extract_session_token(&headers), Some("tok123".to_string()));

        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }
}
