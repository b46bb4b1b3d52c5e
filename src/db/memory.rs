//! In-memory row store for dev mode and tests

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::db::{Collection, RowStore};
use crate::types::ApiError;

/// Keeps inserted rows per collection
///
/// Mimics the database defaults the edge functions rely on: every row gets
/// a fresh `id` and a `created_at` timestamp.
#[derive(Default)]
pub struct InMemoryStore {
    rows: DashMap<Collection, Vec<serde_json::Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows stored in a collection, in insertion order
    pub fn rows(&self, collection: Collection) -> Vec<serde_json::Value> {
        self.rows
            .get(&collection)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Total rows across all collections
    pub fn len(&self) -> usize {
        self.rows.iter().map(|r| r.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl RowStore for InMemoryStore {
    async fn insert_one(
        &self,
        collection: Collection,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let serde_json::Value::Object(mut fields) = row else {
            return Err(ApiError::Store("Row must be a JSON object".into()));
        };

        fields.insert("id".into(), Uuid::new_v4().to_string().into());
        fields.insert("created_at".into(), Utc::now().to_rfc3339().into());

        let stored = serde_json::Value::Object(fields);
        self.rows.entry(collection).or_default().push(stored.clone());
        Ok(stored)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = InMemoryStore::new();
        let row = store
            .insert_one(Collection::Tasks, json!({ "title": "Stretch" }))
            .await
            .unwrap();

        assert_eq!(row["title"], "Stretch");
        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
        assert_eq!(store.rows(Collection::Tasks).len(), 1);
        assert!(store.rows(Collection::Goals).is_empty());
    }

    #[tokio::test]
    async fn test_non_object_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .insert_one(Collection::Tasks, json!(["not", "a", "row"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Store(_)));
        assert!(store.is_empty());
    }
}
