//! Development identity resolver
//!
//! Accepts any non-empty token and derives a stable user id from it, so a
//! local front end can exercise the functions without a Supabase project.
//! Only wired up when `DEV_MODE` is on.

use sha2::{Digest, Sha256};

use crate::auth::gate::{Identity, IdentityResolver};
use crate::types::ApiError;

#[derive(Debug, Default, Clone)]
pub struct DevIdentityResolver;

impl DevIdentityResolver {
    /// Stable id for a token: `dev-` plus the first 16 hex chars of its SHA-256
    pub fn identity_for(token: &str) -> Identity {
        let digest = Sha256::digest(token.as_bytes());
        let hex = hex::encode(digest);
        Identity {
            id: format!("dev-{}", &hex[..16]),
            email: None,
            role: Some("authenticated".into()),
        }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for DevIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ApiError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::identity_for(token)))
    }

    fn name(&self) -> &'static str {
        "dev"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_token_same_identity() {
        let a = DevIdentityResolver.resolve("alice").await.unwrap().unwrap();
        let b = DevIdentityResolver.resolve("alice").await.unwrap().unwrap();
        let c = DevIdentityResolver.resolve("bob").await.unwrap().unwrap();

        assert_eq!(a, b);
        assert_ne!(a.id, c.id);
        assert!(a.id.starts_with("dev-"));
        assert_eq!(a.id.len(), 20);
    }
}
