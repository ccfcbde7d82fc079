//! In-memory store and request helpers for router tests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use serde_json::{json, Map};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::auth::{SessionUser, SESSION_COOKIE};
use crate::config::AppConfig;
use crate::database::models::{Category, Item, ItemSummary, ItemUpdate, NewItem};
use crate::database::{DatabaseError, InventoryStore};
use crate::state::AppState;

#[derive(Debug, Clone)]
struct StoredItem {
    id: i64,
    item: String,
    quantity: i32,
    description: Option<String>,
    userid: String,
}

#[derive(Debug, Clone)]
struct StoredCategory {
    category_id: i64,
    category_name: String,
    user_email: String,
}

#[derive(Debug, Default)]
struct Tables {
    stuff: Vec<StoredItem>,
    categories: Vec<StoredCategory>,
    next_item_id: i64,
    next_category_id: i64,
}

/// `InventoryStore` over two vectors with the same owner scoping as the SQL.
/// `fail_with` makes every call return a query error.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failure: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, message: &str) {
        *self.failure.write().await = Some(message.to_string());
    }

    pub async fn item_count(&self) -> usize {
        self.tables.read().await.stuff.len()
    }

    async fn check(&self) -> Result<(), DatabaseError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(DatabaseError::QueryError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_items(&self, owner: &str) -> Result<Vec<ItemSummary>, DatabaseError> {
        self.check().await?;
        let tables = self.tables.read().await;
        let category = tables
            .categories
            .iter()
            .find(|c| c.user_email == owner)
            .map(|c| c.category_name.clone());
        Ok(tables
            .stuff
            .iter()
            .filter(|row| row.userid == owner)
            .map(|row| ItemSummary {
                id: row.id,
                item: row.item.clone(),
                quantity: row.quantity,
                category: category.clone(),
            })
            .collect())
    }

    async fn get_item(&self, id: i64, owner: &str) -> Result<Option<Item>, DatabaseError> {
        self.check().await?;
        let tables = self.tables.read().await;
        Ok(tables
            .stuff
            .iter()
            .find(|row| row.id == id && row.userid == owner)
            .map(|row| Item {
                id: row.id,
                item: row.item.clone(),
                quantity: row.quantity,
                description: row.description.clone(),
            }))
    }

    async fn create_item(&self, owner: &str, item: NewItem) -> Result<i64, DatabaseError> {
        self.check().await?;
        let mut tables = self.tables.write().await;
        tables.next_item_id += 1;
        let id = tables.next_item_id;
        tables.stuff.push(StoredItem {
            id,
            item: item.name,
            quantity: item.quantity,
            description: None,
            userid: owner.to_string(),
        });
        Ok(id)
    }

    async fn update_item(&self, id: i64, owner: &str, update: ItemUpdate) -> Result<u64, DatabaseError> {
        self.check().await?;
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for row in tables.stuff.iter_mut().filter(|row| row.id == id && row.userid == owner) {
            row.item = update.name.clone();
            row.quantity = update.quantity;
            row.description = update.description.clone();
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_item(&self, id: i64, owner: &str) -> Result<u64, DatabaseError> {
        self.check().await?;
        let mut tables = self.tables.write().await;
        let before = tables.stuff.len();
        tables.stuff.retain(|row| !(row.id == id && row.userid == owner));
        Ok((before - tables.stuff.len()) as u64)
    }

    async fn list_categories(&self, owner: &str) -> Result<Vec<Category>, DatabaseError> {
        self.check().await?;
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|row| row.user_email == owner)
            .map(|row| Category {
                category_id: row.category_id,
                category_name: row.category_name.clone(),
            })
            .collect())
    }

    async fn create_category(&self, owner: &str, name: &str) -> Result<i64, DatabaseError> {
        self.check().await?;
        let mut tables = self.tables.write().await;
        tables.next_category_id += 1;
        let category_id = tables.next_category_id;
        tables.categories.push(StoredCategory {
            category_id,
            category_name: name.to_string(),
            user_email: owner.to_string(),
        });
        Ok(category_id)
    }

    async fn delete_category(&self, id: i64, owner: &str) -> Result<u64, DatabaseError> {
        self.check().await?;
        let mut tables = self.tables.write().await;
        let before = tables.categories.len();
        tables
            .categories
            .retain(|row| !(row.category_id == id && row.user_email == owner));
        Ok((before - tables.categories.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check().await
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.secret = "test-secret-do-not-use".to_string();
    config.auth.base_url = "http://localhost:8080".to_string();
    config.auth.client_id = "test-client".to_string();
    config.auth.issuer_base_url = "https://issuer.invalid".to_string();
    config.database.url = "postgres://localhost/unused".to_string();
    config.security.expose_store_errors = true;
    config
}

/// Router state backed by a fresh `MemoryStore`, which is returned for assertions
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(test_config(), store.clone()).expect("test state");
    (state, store)
}

pub fn user_with_email(email: &str) -> SessionUser {
    let mut profile = Map::new();
    profile.insert("email".to_string(), json!(email));
    profile.insert("name".to_string(), json!(email.split('@').next().unwrap_or(email)));
    SessionUser {
        sub: format!("test|{}", email),
        profile,
    }
}

/// `Cookie` header value carrying a valid session for `user`
pub fn session_cookie(state: &AppState, user: &SessionUser) -> String {
    let token = state.sessions.issue(user).expect("session token");
    format!("{}={}", SESSION_COOKIE, token)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

/// Run one request through the full application router
pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    crate::app(state.clone()).oneshot(request).await.expect("infallible router")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ignores_process_environment() {
        std::env::set_var("SECURITY_EXPOSE_STORE_ERRORS", "false");
        std::env::set_var("STATIC_DIR", "/nonexistent");
        let config = test_config();
        std::env::remove_var("SECURITY_EXPOSE_STORE_ERRORS");
        std::env::remove_var("STATIC_DIR");

        assert!(config.security.expose_store_errors);
        assert_eq!(config.server.static_dir, "public");
        assert_eq!(config.server.port, 8080);
    }
}
