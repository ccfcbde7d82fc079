use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{cookies, SessionUser, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;
use crate::views::PageContext;

/// Authenticated owner of the rows a protected handler touches
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub email: String,
    pub user: SessionUser,
}

/// Session middleware, runs on every request.
///
/// Verifies the session cookie (anything invalid counts as logged out) and publishes
/// the `PageContext` plus, when present, the `SessionUser` into request extensions.
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = cookies::read_cookie(request.headers(), SESSION_COOKIE).and_then(|token| {
        state
            .sessions
            .verify(&token)
            .map_err(|e| tracing::debug!("Ignoring session cookie: {}", e))
            .ok()
    });

    let page = PageContext {
        is_logged_in: user.is_some(),
        email: user.as_ref().and_then(|u| u.email()).map(str::to_string),
        user_name: user.as_ref().and_then(|u| u.display_name()).map(str::to_string),
    };

    request.extensions_mut().insert(page);
    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Gate for protected routes: without a session the browser is sent to log in and
/// the handler never runs.
pub async fn require_auth(request: Request, next: Next) -> Response {
    if request.extensions().get::<SessionUser>().is_some() {
        return next.run(request).await;
    }

    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    tracing::debug!("Unauthenticated request to {}, redirecting to login", original);

    let target = format!(
        "/login?{}",
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("returnTo", original)
            .finish()
    );
    Redirect::to(&target).into_response()
}

#[async_trait]
impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<PageContext>().cloned().unwrap_or_default())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Login required"))?;

        let email = user
            .email()
            .map(str::to_string)
            .ok_or_else(|| ApiError::forbidden("Your account has no email address to own inventory"))?;

        Ok(CurrentUser { email, user })
    }
}
