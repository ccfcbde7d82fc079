// handlers/protected/stuff.rs - inventory item routes
//
// Every handler issues exactly one store call scoped to the logged-in owner.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::database::models::{ItemUpdate, NewItem};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views::{self, PageContext, View};

#[derive(Debug, Deserialize)]
pub struct ItemForm {
    pub name: String,
    pub quantity: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ItemForm {
    fn quantity(&self) -> Result<i32, ApiError> {
        self.quantity
            .trim()
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Quantity must be a whole number, got \"{}\"", self.quantity)))
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("No item found with id = \"{}\"", id))
}

/// Non-numeric ids cannot match a row
fn parse_id(id: &str) -> Result<i64, ApiError> {
    id.parse().map_err(|_| not_found(id))
}

fn item_path(id: &str) -> String {
    let segment: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("/stuff/item/{}", segment)
}

/// GET /stuff
pub async fn list(State(state): State<AppState>, page: PageContext, user: CurrentUser) -> Result<Html<String>, ApiError> {
    let items = state
        .store
        .list_items(&user.email)
        .await
        .map_err(|e| state.store_error(e))?;

    tracing::debug!("Listing {} items for {}", items.len(), user.email);
    Ok(views::render(&View::Stuff(&items), &page))
}

/// GET /stuff/item/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageContext,
    user: CurrentUser,
) -> Result<Html<String>, ApiError> {
    let item_id = parse_id(&id)?;
    let item = state
        .store
        .get_item(item_id, &user.email)
        .await
        .map_err(|e| state.store_error(e))?
        .ok_or_else(|| not_found(&id))?;

    Ok(views::render(&View::Item(&item), &page))
}

/// POST /stuff
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, ApiError> {
    let item = NewItem {
        quantity: form.quantity()?,
        name: form.name,
    };
    let id = state
        .store
        .create_item(&user.email, item)
        .await
        .map_err(|e| state.store_error(e))?;

    tracing::info!("Created item {} for {}", id, user.email);
    Ok(Redirect::to(&format!("/stuff/item/{}", id)))
}

/// POST /stuff/item/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, ApiError> {
    let update = ItemUpdate {
        quantity: form.quantity()?,
        name: form.name,
        description: form.description.filter(|d| !d.trim().is_empty()),
    };
    // A non-numeric id matches no row: nothing to update
    let updated = match id.parse::<i64>() {
        Ok(item_id) => state
            .store
            .update_item(item_id, &user.email, update)
            .await
            .map_err(|e| state.store_error(e))?,
        Err(_) => 0,
    };

    tracing::debug!("Updated {} row(s) for item {} of {}", updated, id, user.email);
    Ok(Redirect::to(&item_path(&id)))
}

/// GET /stuff/item/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> Result<Redirect, ApiError> {
    let deleted = match id.parse::<i64>() {
        Ok(item_id) => state
            .store
            .delete_item(item_id, &user.email)
            .await
            .map_err(|e| state.store_error(e))?,
        Err(_) => 0,
    };

    tracing::info!("Deleted {} row(s) for item {} of {}", deleted, id, user.email);
    Ok(Redirect::to("/stuff"))
}
