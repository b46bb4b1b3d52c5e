//! Local verification of Supabase access tokens
//!
//! Supabase signs user access tokens with the project's JWT secret (HS256).
//! When that secret is configured, tokens are checked here and the identity
//! service is never called.
//!
//! Checks performed:
//! - HS256 signature against the project secret
//! - `exp` in the future
//! - `aud` equal to `authenticated` (anon and service tokens are refused)

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::gate::{Identity, IdentityResolver};
use crate::types::ApiError;

/// Audience Supabase puts on signed-in user tokens
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims carried by a Supabase access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Audience
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Verifies access tokens with the project JWT secret
#[derive(Clone)]
pub struct JwtIdentityResolver {
    secret: String,
}

impl JwtIdentityResolver {
    /// Create a new resolver
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: String) -> Result<Self, ApiError> {
        if secret.len() < 32 {
            return Err(ApiError::Internal(
                "SUPABASE_JWT_SECRET must be at least 32 characters".into(),
            ));
        }
        Ok(Self { secret })
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            let reason = match err.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidToken => "Invalid token",
                ErrorKind::InvalidSignature => "Invalid signature",
                ErrorKind::InvalidAudience => "Token is not a user token",
                _ => "Token validation failed",
            };
            ApiError::Unauthenticated(reason.into())
        })
    }
}

#[async_trait::async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ApiError> {
        let claims = self.verify_token(token)?;
        if claims.sub.is_empty() {
            return Ok(None);
        }
        Ok(Some(Identity {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(aud: &str, exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: "3f1c2a4e-0000-4000-8000-000000000001".into(),
            aud: aud.into(),
            exp: (now + exp_offset) as u64,
            email: Some("player@example.com".into()),
            role: Some("authenticated".into()),
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtIdentityResolver::new("short".into()).is_err());
    }

    #[tokio::test]
    async fn test_valid_token_resolves() {
        let resolver = JwtIdentityResolver::new(SECRET.into()).unwrap();
        let token = sign(&claims(AUTHENTICATED_AUDIENCE, 3600), SECRET);

        let identity = resolver.resolve(&token).await.unwrap().unwrap();
        assert_eq!(identity.id, "3f1c2a4e-0000-4000-8000-000000000001");
        assert_eq!(identity.email.as_deref(), Some("player@example.com"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let resolver = JwtIdentityResolver::new(SECRET.into()).unwrap();
        let token = sign(&claims(AUTHENTICATED_AUDIENCE, -3600), SECRET);

        assert!(resolver.resolve(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let resolver = JwtIdentityResolver::new(SECRET.into()).unwrap();
        let token = sign(
            &claims(AUTHENTICATED_AUDIENCE, 3600),
            "different-secret-that-is-at-least-32-characters",
        );

        assert!(resolver.resolve(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_anon_token_refused() {
        let resolver = JwtIdentityResolver::new(SECRET.into()).unwrap();
        let token = sign(&claims("anon", 3600), SECRET);

        let err = resolver.resolve(&token).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}
