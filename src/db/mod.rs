//! Row storage for the resource collections
//!
//! The dispatcher only ever inserts one row into one collection and reads the
//! stored row back. [`RowStore`] is that seam; [`PostgrestStore`] talks to
//! the hosted database and [`InMemoryStore`] backs dev mode and tests.

pub mod memory;
pub mod postgrest;

use serde::Serialize;
use std::fmt;

use crate::types::ApiError;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

/// The five collections rows can be inserted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tasks,
    Projects,
    Habits,
    Goals,
    Transactions,
}

impl Collection {
    /// Table name in the database
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Projects => "projects",
            Collection::Habits => "habits",
            Collection::Goals => "goals",
            Collection::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Insert-and-return-one-row storage
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    /// Insert `row` into `collection` and return the row as stored
    async fn insert_one(
        &self,
        collection: Collection,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError>;

    /// Short name for health output and logs
    fn name(&self) -> &'static str;
}
