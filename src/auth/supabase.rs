//! Identity resolution through the Supabase auth server

use std::sync::Arc;

use crate::auth::gate::{Identity, IdentityResolver};
use crate::supabase::SupabaseClient;
use crate::types::ApiError;

/// Asks `GET /auth/v1/user` who a token belongs to
pub struct SupabaseAuthResolver {
    client: Arc<SupabaseClient>,
}

impl SupabaseAuthResolver {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for SupabaseAuthResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ApiError> {
        let user = self
            .client
            .get_user(token)
            .await
            .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

        Ok(user.map(|u| Identity {
            id: u.id,
            email: u.email,
            role: u.role,
        }))
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
