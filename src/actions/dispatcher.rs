//! Runs a parsed action against the row store

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{error, info};

use crate::actions::{Action, ActionRequest};
use crate::auth::Identity;
use crate::db::RowStore;
use crate::types::ApiError;

/// Turns `{action, data}` into exactly one insert
pub struct ActionDispatcher {
    store: Arc<dyn RowStore>,
}

impl ActionDispatcher {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Name of the backing store
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Parse and run a request for `identity`, returning the inserted row
    pub async fn dispatch(
        &self,
        identity: &Identity,
        request: ActionRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let action = Action::parse(&request.action, request.data)?;
        self.execute(identity, action, Utc::now().date_naive()).await
    }

    /// Run an already parsed action
    ///
    /// `today` is the date stamped on transactions that don't carry one.
    pub async fn execute(
        &self,
        identity: &Identity,
        action: Action,
        today: NaiveDate,
    ) -> Result<serde_json::Value, ApiError> {
        let name = action.name();
        let collection = action.collection();
        let row = action.into_row(&identity.id, today)?;

        match self.store.insert_one(collection, row).await {
            Ok(inserted) => {
                info!(
                    action = %name,
                    collection = %collection,
                    user_id = %identity.id,
                    "Row inserted"
                );
                Ok(inserted)
            }
            Err(e) => {
                error!(
                    action = %name,
                    collection = %collection,
                    user_id = %identity.id,
                    error = %e,
                    "Action failed"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Collection, InMemoryStore};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RowStore for FailingStore {
        async fn insert_one(
            &self,
            _collection: Collection,
            _row: serde_json::Value,
        ) -> Result<serde_json::Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Store("permission denied for table tasks".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn request(action: &str, data: serde_json::Value) -> ActionRequest {
        ActionRequest {
            action: action.to_string(),
            data,
        }
    }

    #[tokio::test]
    async fn test_every_action_stamps_owner() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = ActionDispatcher::new(store.clone());
        let identity = Identity::new("user-42");

        let cases = [
            ("create_task", Collection::Tasks),
            ("create_project", Collection::Projects),
            ("create_habit", Collection::Habits),
            ("create_goal", Collection::Goals),
            ("create_transaction", Collection::Transactions),
        ];

        for (action, collection) in cases {
            let row = dispatcher
                .dispatch(&identity, request(action, json!({ "title": "x" })))
                .await
                .unwrap();
            assert_eq!(row["user_id"], "user-42", "{}", action);
            assert_eq!(store.rows(collection).len(), 1, "{}", action);
        }
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_transaction_date_is_today() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = ActionDispatcher::new(store);

        let row = dispatcher
            .dispatch(
                &Identity::new("user-1"),
                request("create_transaction", json!({ "type": "expense", "amount": 9.99 })),
            )
            .await
            .unwrap();

        let expected = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(row["date"], expected);
    }

    #[tokio::test]
    async fn test_identical_calls_create_two_rows() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = ActionDispatcher::new(store.clone());
        let identity = Identity::new("user-1");

        let first = dispatcher
            .dispatch(&identity, request("create_task", json!({ "title": "Same" })))
            .await
            .unwrap();
        let second = dispatcher
            .dispatch(&identity, request("create_task", json!({ "title": "Same" })))
            .await
            .unwrap();

        assert_ne!(first["id"], second["id"]);
        assert_eq!(store.rows(Collection::Tasks).len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_action_never_reaches_store() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = ActionDispatcher::new(store.clone());

        let err = dispatcher
            .dispatch(&Identity::new("user-1"), request("delete_everything", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidAction(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = ActionDispatcher::new(store.clone());

        let err = dispatcher
            .dispatch(&Identity::new("user-1"), request("create_task", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Store(ref m) if m.contains("permission denied")));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
