//! Bearer credential extraction and identity resolution

use tracing::{debug, warn};

use crate::types::ApiError;

/// Resolved caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user identifier, stamped on every inserted row
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            role: None,
        }
    }
}

/// Maps an opaque bearer token to a user identity
///
/// Implementations return `Ok(None)` when the token is well-formed but does
/// not belong to anyone, and `Err` when the lookup itself failed. The gate
/// treats both as unauthenticated.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ApiError>;

    /// Short name for health output and logs
    fn name(&self) -> &'static str;
}

/// Strip the `Bearer ` prefix from an Authorization header value
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    let value = header?.trim_start();
    // "Bearer" with nothing after it is an empty credential, not a token
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => value,
    }
    .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticate a request from its Authorization header
pub async fn authenticate(
    resolver: &dyn IdentityResolver,
    auth_header: Option<&str>,
) -> Result<Identity, ApiError> {
    let Some(header) = auth_header else {
        debug!("Request without Authorization header");
        return Err(ApiError::Unauthenticated("Missing Authorization header".into()));
    };

    let token = extract_token_from_header(Some(header))
        .ok_or_else(|| ApiError::Unauthenticated("Empty bearer token".into()))?;

    match resolver.resolve(token).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(ApiError::Unauthenticated("Token did not resolve to a user".into())),
        Err(e) => {
            warn!(resolver = resolver.name(), error = %e, "Identity resolution failed");
            Err(ApiError::Unauthenticated(e.to_string()))
        }
    }
}
