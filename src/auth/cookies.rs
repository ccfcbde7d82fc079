use axum::http::{header, HeaderMap, HeaderValue};

/// Value of cookie `name`, searching every `Cookie` header
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    None,
}

/// `Set-Cookie` value for an HttpOnly cookie scoped to the whole site.
///
/// `SameSite=None` requires `Secure`. Without https the attribute is left off, so the
/// browser's lax default still sends the cookie on a top-level cross-site POST.
pub fn set_cookie(name: &str, value: &str, max_age: i64, same_site: SameSite, secure: bool) -> HeaderValue {
    let mut cookie = format!("{}={}; Path=/; HttpOnly", name, value);
    match (same_site, secure) {
        (SameSite::None, true) => cookie.push_str("; SameSite=None"),
        (SameSite::None, false) => {}
        (SameSite::Lax, _) => cookie.push_str("; SameSite=Lax"),
    }
    cookie.push_str(&format!("; Max-Age={}", max_age));
    if secure {
        cookie.push_str("; Secure");
    }
    // Cookie names and JWT values are ASCII
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

pub fn clear_cookie(name: &str, secure: bool) -> HeaderValue {
    set_cookie(name, "", 0, SameSite::Lax, secure)
}
