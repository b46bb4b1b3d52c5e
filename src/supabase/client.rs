//! HTTP client for the Supabase auth and PostgREST APIs

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SupabaseConfig;
use crate::supabase::error::{Result, SupabaseError};

/// PostgREST media type that makes the server return a single object
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// User record returned by `GET /auth/v1/user`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// HTTP client for a Supabase project
///
/// All requests carry the service role key as `apikey`. Inserts are also
/// authorized with it; user lookups forward the caller's token instead.
pub struct SupabaseClient {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(config: SupabaseConfig, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let api_key = header::HeaderValue::from_str(&config.service_role_key)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Invalid service key: {}", e)))?;
        headers.insert("apikey", api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Resolve an access token to the user it was issued for
    ///
    /// Returns `Ok(None)` when the auth server rejects the token.
    pub async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let url = format!("{}/auth/v1/user", self.config.url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::FORBIDDEN
        {
            return Ok(None);
        }

        let user: AuthUser = self.handle_response(response).await?;
        if user.id.is_empty() {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Insert one row and return it as stored
    pub async fn insert_row(
        &self,
        table: &str,
        row: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/rest/v1/{}", self.config.url, table);

        debug!(table = %table, "Inserting row");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.service_role_key)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let (message, code) = extract_error(&body, status);
            warn!(
                status,
                code = code.as_deref().unwrap_or("-"),
                message = %message,
                "Supabase request failed"
            );
            return Err(SupabaseError::Server { status, message });
        }

        let body = response.json().await?;
        Ok(body)
    }
}

/// Pull the human-readable message, and the PostgREST error code if any,
/// out of a Supabase error body
fn extract_error(body: &str, status: u16) -> (String, Option<String>) {
    if let Ok(parsed) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = parsed.message {
            return (message, parsed.code.filter(|c| !c.is_empty()));
        }
    }

    (extract_error_message(body, status), None)
}

fn extract_error_message(body: &str, status: u16) -> String {
    // Auth endpoints use `msg` / `error_description`
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    if body.trim().is_empty() {
        format!("Request failed with status {}", status)
    } else {
        body.trim().to_string()
    }
}
