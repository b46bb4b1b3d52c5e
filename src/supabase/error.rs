//! Error types for the Supabase client

use thiserror::Error;

use crate::types::ApiError;

/// Supabase client error
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SupabaseError {
    /// Message suitable for returning to the client
    ///
    /// For server errors this is the store's own message (PostgREST puts it in
    /// `message`), which is what the caller sees on a failed insert.
    pub fn store_message(&self) -> String {
        match self {
            SupabaseError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<SupabaseError> for ApiError {
    fn from(err: SupabaseError) -> Self {
        ApiError::Store(err.store_message())
    }
}

/// Result type for Supabase operations
pub type Result<T> = std::result::Result<T, SupabaseError>;
