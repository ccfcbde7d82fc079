use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::auth::{cookies, OidcError, SESSION_COOKIE, VERIFICATION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Fields the provider posts back (`response_mode=form_post`)
#[derive(Debug, Deserialize)]
pub struct CallbackForm {
    pub id_token: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// POST /callback - finish login and issue the session cookie
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CallbackForm>,
) -> Result<Response, ApiError> {
    if let Some(error) = form.error {
        let detail = form.error_description.unwrap_or_else(|| error.clone());
        return Err(OidcError::Rejected(detail).into());
    }

    let pending = cookies::read_cookie(&headers, VERIFICATION_COOKIE)
        .and_then(|token| state.sessions.verify_verification(&token).ok())
        .ok_or(OidcError::StateMismatch)?;

    if form.state.as_deref() != Some(pending.state.as_str()) {
        return Err(OidcError::StateMismatch.into());
    }

    let id_token = form
        .id_token
        .ok_or_else(|| ApiError::bad_request("Missing id_token"))?;
    let user = state.oidc.verify_id_token(&id_token, &pending).await?;
    let session = state.sessions.issue(&user)?;

    tracing::info!(
        "Login for {} ({})",
        user.email().unwrap_or("no email"),
        user.sub
    );

    let secure = state.config.secure_cookies();
    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                cookies::set_cookie(
                    SESSION_COOKIE,
                    &session,
                    state.sessions.ttl_seconds(),
                    cookies::SameSite::Lax,
                    secure,
                ),
            ),
            (header::SET_COOKIE, cookies::clear_cookie(VERIFICATION_COOKIE, secure)),
        ]),
        Redirect::to(&pending.return_to),
    )
        .into_response())
}
