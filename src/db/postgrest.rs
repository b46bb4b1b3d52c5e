//! PostgREST-backed row store

use std::sync::Arc;
use tracing::error;

use crate::db::{Collection, RowStore};
use crate::supabase::SupabaseClient;
use crate::types::ApiError;

/// Inserts rows through the Supabase REST API with the service role key
pub struct PostgrestStore {
    client: Arc<SupabaseClient>,
}

impl PostgrestStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl RowStore for PostgrestStore {
    async fn insert_one(
        &self,
        collection: Collection,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.client
            .insert_row(collection.table(), &row)
            .await
            .map_err(|e| {
                error!(collection = %collection, error = %e, "Insert failed");
                ApiError::from(e)
            })
    }

    fn name(&self) -> &'static str {
        "postgrest"
    }
}
