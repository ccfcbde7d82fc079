use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod views;

#[cfg(test)]
pub mod testing;

pub use state::AppState;

/// Full application router: public pages, login round trip, protected inventory
/// routes, and static files from the configured directory as the fallback.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .fallback_service(static_files)
        // Outermost last: trace → security headers → session → routes
        .layer(from_fn_with_state(state.clone(), middleware::session_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::home))
        .route("/health", get(public::health))
        .route("/authtest", get(public::authtest))
        .route("/login", get(public::login))
        .route("/callback", post(public::callback))
        .route("/logout", get(public::logout))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{categories, profile, stuff};

    Router::new()
        .route("/stuff", get(stuff::list).post(stuff::create))
        .route("/stuff/item/:id", get(stuff::show).post(stuff::update))
        .route("/stuff/item/:id/delete", get(stuff::delete))
        .route("/categories", get(categories::list))
        .route("/categories/:id/delete", get(categories::delete))
        .route("/categories/:email", post(categories::create))
        .route("/profile", get(profile))
        .route_layer(from_fn(middleware::require_auth))
}
