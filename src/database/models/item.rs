use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `stuff` table as shown on the detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub item: String,
    pub quantity: i32,
    pub description: Option<String>,
}

/// A row of the inventory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ItemSummary {
    pub id: i64,
    pub item: String,
    pub quantity: i32,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
}
