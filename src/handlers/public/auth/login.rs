use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::auth::{cookies, sanitize_return_to, LoginVerification, SESSION_COOKIE, VERIFICATION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::PageContext;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// GET /login - start the provider round trip.
///
/// State, nonce and the post-login destination ride along in a signed cookie that
/// `/callback` checks.
pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Result<Response, ApiError> {
    let verification = LoginVerification::new(sanitize_return_to(query.return_to.as_deref()));
    let authorize = state.oidc.authorization_url(&verification).await?;
    let token = state.sessions.issue_verification(&verification)?;

    let cookie = verification_cookie(&token, state.config.secure_cookies());

    tracing::debug!("Redirecting to identity provider, return to {}", verification.return_to);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(authorize.as_str())).into_response())
}

/// The provider posts `/callback` cross-site, so this cookie must survive a cross-site
/// top-level POST on both http and https origins.
fn verification_cookie(token: &str, secure: bool) -> HeaderValue {
    cookies::set_cookie(VERIFICATION_COOKIE, token, 600, cookies::SameSite::None, secure)
}

/// GET /logout - drop the local session and leave through the provider
pub async fn logout(State(state): State<AppState>, page: PageContext) -> Result<Response, ApiError> {
    let target = state.oidc.logout_url()?;
    if let Some(email) = page.email.as_deref() {
        tracing::info!("Logging out {}", email);
    }

    let cookie = cookies::clear_cookie(SESSION_COOKIE, state.config.secure_cookies());
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target.as_str())).into_response())
}

/// GET /authtest
pub async fn authtest(page: PageContext) -> &'static str {
    if page.is_logged_in {
        "Logged in"
    } else {
        "Logged out"
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use super::verification_cookie;
    use crate::testing::{body_text, get, location, send, session_cookie, test_state, user_with_email};

    #[test]
    fn verification_cookie_reaches_cross_site_callback() {
        let plain = verification_cookie("t", false);
        let plain = plain.to_str().unwrap();
        assert!(plain.starts_with("auth_verification=t;"));
        assert!(!plain.contains("SameSite"));
        assert!(!plain.contains("Secure"));

        let tls = verification_cookie("t", true);
        let tls = tls.to_str().unwrap();
        assert!(tls.contains("SameSite=None"));
        assert!(tls.ends_with("; Secure"));
    }

    #[tokio::test]
    async fn authtest_reports_login_state() {
        let (state, _) = test_state();
        let body = body_text(send(&state, get("/authtest", None)).await).await;
        assert_eq!(body, "Logged out");

        let cookie = session_cookie(&state, &user_with_email("u@example.com"));
        let body = body_text(send(&state, get("/authtest", Some(&cookie))).await).await;
        assert_eq!(body, "Logged in");
    }

    #[tokio::test]
    async fn logout_clears_session_and_leaves_through_provider() {
        let (state, _) = test_state();
        let cookie = session_cookie(&state, &user_with_email("u@example.com"));

        let response = send(&state, get("/logout", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(set_cookie.starts_with("app_session=;"));
        assert!(set_cookie.contains("Max-Age=0"));

        let target = location(&response).unwrap();
        assert!(target.starts_with("https://issuer.invalid/v2/logout?"));
        assert!(target.contains("client_id=test-client"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_bad_gateway() {
        let (state, _) = test_state();
        let response = send(&state, get("/login?returnTo=%2Fstuff", None)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(!response.headers().contains_key(header::SET_COOKIE));
    }
}
