use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{Category, Item, ItemSummary, ItemUpdate, NewItem};

/// Every inventory statement the application issues. Each method runs exactly one
/// statement with bound parameters, scoped to `owner`.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list_items(&self, owner: &str) -> Result<Vec<ItemSummary>, DatabaseError>;
    async fn get_item(&self, id: i64, owner: &str) -> Result<Option<Item>, DatabaseError>;
    async fn create_item(&self, owner: &str, item: NewItem) -> Result<i64, DatabaseError>;
    async fn update_item(&self, id: i64, owner: &str, update: ItemUpdate) -> Result<u64, DatabaseError>;
    async fn delete_item(&self, id: i64, owner: &str) -> Result<u64, DatabaseError>;

    async fn list_categories(&self, owner: &str) -> Result<Vec<Category>, DatabaseError>;
    async fn create_category(&self, owner: &str, name: &str) -> Result<i64, DatabaseError>;
    async fn delete_category(&self, id: i64, owner: &str) -> Result<u64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

// Categories are not linked to items: the listing shows whichever category of the
// owner the database returns first.
const LIST_ITEMS_SQL: &str = r#"
    SELECT id, item, quantity,
        (SELECT category_name FROM categories WHERE user_email = stuff.userid LIMIT 1) AS category
    FROM stuff
    WHERE userid = $1
"#;

const GET_ITEM_SQL: &str = r#"
    SELECT id, item, quantity, description
    FROM stuff
    WHERE id = $1 AND userid = $2
"#;

const CREATE_ITEM_SQL: &str = r#"
    INSERT INTO stuff (item, quantity, userid)
    VALUES ($1, $2, $3)
    RETURNING id
"#;

const UPDATE_ITEM_SQL: &str = r#"
    UPDATE stuff
    SET item = $1, quantity = $2, description = $3
    WHERE id = $4 AND userid = $5
"#;

const DELETE_ITEM_SQL: &str = "DELETE FROM stuff WHERE id = $1 AND userid = $2";

const LIST_CATEGORIES_SQL: &str = r#"
    SELECT category_name, category_id
    FROM categories
    WHERE user_email = $1
"#;

const CREATE_CATEGORY_SQL: &str = r#"
    INSERT INTO categories (user_email, category_name)
    VALUES ($1, $2)
    RETURNING category_id
"#;

const DELETE_CATEGORY_SQL: &str = "DELETE FROM categories WHERE category_id = $1 AND user_email = $2";

/// PostgreSQL implementation over the shared connection pool
pub struct PgStore {
    pool: PgPool,
    log_queries: bool,
    slow_threshold: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, config: &DatabaseConfig) -> Self {
        Self {
            pool,
            log_queries: config.enable_query_logging,
            slow_threshold: Duration::from_millis(config.slow_query_threshold_ms),
        }
    }

    async fn timed<T, F>(&self, statement: &'static str, query: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let result = query.await;
        let elapsed = started.elapsed();

        if elapsed >= self.slow_threshold {
            tracing::warn!("Slow query {} took {:?}", statement, elapsed);
        } else if self.log_queries {
            tracing::debug!("Query {} took {:?}", statement, elapsed);
        }

        result.map_err(|e| {
            tracing::error!("Query {} failed: {}", statement, e);
            DatabaseError::from(e)
        })
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn list_items(&self, owner: &str) -> Result<Vec<ItemSummary>, DatabaseError> {
        self.timed(
            "list_items",
            sqlx::query_as::<_, ItemSummary>(LIST_ITEMS_SQL)
                .bind(owner)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_item(&self, id: i64, owner: &str) -> Result<Option<Item>, DatabaseError> {
        self.timed(
            "get_item",
            sqlx::query_as::<_, Item>(GET_ITEM_SQL)
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn create_item(&self, owner: &str, item: NewItem) -> Result<i64, DatabaseError> {
        self.timed(
            "create_item",
            sqlx::query_scalar::<_, i64>(CREATE_ITEM_SQL)
                .bind(item.name)
                .bind(item.quantity)
                .bind(owner)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn update_item(&self, id: i64, owner: &str, update: ItemUpdate) -> Result<u64, DatabaseError> {
        let result = self
            .timed(
                "update_item",
                sqlx::query(UPDATE_ITEM_SQL)
                    .bind(update.name)
                    .bind(update.quantity)
                    .bind(update.description)
                    .bind(id)
                    .bind(owner)
                    .execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_item(&self, id: i64, owner: &str) -> Result<u64, DatabaseError> {
        let result = self
            .timed(
                "delete_item",
                sqlx::query(DELETE_ITEM_SQL).bind(id).bind(owner).execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_categories(&self, owner: &str) -> Result<Vec<Category>, DatabaseError> {
        self.timed(
            "list_categories",
            sqlx::query_as::<_, Category>(LIST_CATEGORIES_SQL)
                .bind(owner)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn create_category(&self, owner: &str, name: &str) -> Result<i64, DatabaseError> {
        self.timed(
            "create_category",
            sqlx::query_scalar::<_, i64>(CREATE_CATEGORY_SQL)
                .bind(owner)
                .bind(name)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn delete_category(&self, id: i64, owner: &str) -> Result<u64, DatabaseError> {
        let result = self
            .timed(
                "delete_category",
                sqlx::query(DELETE_CATEGORY_SQL).bind(id).bind(owner).execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.timed("health_check", sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map(|_| ())
    }
}
