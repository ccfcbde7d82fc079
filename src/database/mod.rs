pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{connect_pool, DatabaseError};
pub use repository::{InventoryStore, PgStore};
