// handlers/protected/categories.rs - category routes

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views::{self, PageContext, View};

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub category_name: String,
}

/// GET /categories
pub async fn list(State(state): State<AppState>, page: PageContext, user: CurrentUser) -> Result<Html<String>, ApiError> {
    let categories = state
        .store
        .list_categories(&user.email)
        .await
        .map_err(|e| state.store_error(e))?;

    Ok(views::render(&View::Categories(&categories), &page))
}

/// POST /categories/:email
///
/// The owner comes from the path, which must name the logged-in user.
pub async fn create(
    State(state): State<AppState>,
    Path(email): Path<String>,
    user: CurrentUser,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, ApiError> {
    if email != user.email {
        tracing::warn!("{} tried to create a category for {}", user.email, email);
        return Err(ApiError::forbidden("Categories can only be created for your own account"));
    }

    let id = state
        .store
        .create_category(&email, &form.category_name)
        .await
        .map_err(|e| state.store_error(e))?;

    tracing::info!("Created category {} for {}", id, email);
    Ok(Redirect::to("/categories"))
}

/// GET /categories/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> Result<Redirect, ApiError> {
    // A non-numeric id matches no row
    let deleted = match id.parse::<i64>() {
        Ok(category_id) => state
            .store
            .delete_category(category_id, &user.email)
            .await
            .map_err(|e| state.store_error(e))?,
        Err(_) => 0,
    };

    tracing::info!("Deleted {} category row(s) with id {} of {}", deleted, id, user.email);
    Ok(Redirect::to("/categories"))
}
