use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// `Content-Security-Policy` allowing same-origin content plus the configured script hosts
pub fn content_security_policy(script_sources: &[String]) -> String {
    let sources = script_sources.join(" ");
    format!(
        "default-src 'self'; script-src {sources}; style-src {sources}; img-src 'self' data: https:; \
         font-src 'self' https: data:; object-src 'none'; base-uri 'self'; \
         form-action 'self' https:; frame-ancestors 'self'"
    )
}

/// Add browser hardening headers to every response that does not set its own
pub async fn security_headers(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let csp = content_security_policy(&state.config.security.script_sources);
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(&csp) {
        headers.entry(header::CONTENT_SECURITY_POLICY).or_insert(value);
    }
    for (name, value) in [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "no-referrer"),
        (HeaderName::from_static("cross-origin-opener-policy"), "same-origin"),
    ] {
        headers.entry(name).or_insert(HeaderValue::from_static(value));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_lists_script_hosts() {
        let csp = content_security_policy(&["'self'".to_string(), "cdnjs.cloudflare.com".to_string()]);
        assert!(csp.starts_with("default-src 'self'; script-src 'self' cdnjs.cloudflare.com;"));
        assert!(csp.contains("style-src 'self' cdnjs.cloudflare.com;"));
    }
}
