//! Configuration for the edge server
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::speech::elevenlabs::DEFAULT_BASE_URL;

/// LevelUp edge functions - action dispatch and speech synthesis
#[derive(Parser, Debug, Clone)]
#[command(name = "levelup-edge")]
#[command(about = "Edge functions for the LevelUp productivity app")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Supabase project URL (data store and identity service)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase service role key, used for inserts and identity lookups
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_service_role_key: Option<String>,

    /// Supabase JWT secret. When set, bearer tokens are verified locally
    /// instead of asking the identity service.
    #[arg(long, env = "SUPABASE_JWT_SECRET", hide_env_values = true)]
    pub supabase_jwt_secret: Option<String>,

    /// ElevenLabs API key for speech synthesis
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub elevenlabs_api_key: Option<String>,

    /// ElevenLabs API base URL
    #[arg(long, env = "ELEVENLABS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub elevenlabs_base_url: String,

    /// Outbound request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Maximum accepted request body in bytes (unbounded when unset)
    #[arg(long, env = "MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Enable development mode (in-memory store, any token accepted)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (text or json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Path of the JSONL usage log (disabled when unset)
    #[arg(long, env = "USAGE_LOG_PATH")]
    pub usage_log_path: Option<std::path::PathBuf>,
}

/// Connection settings for the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

impl Args {
    /// Supabase settings, if both the URL and the service key are present
    pub fn supabase(&self) -> Option<SupabaseConfig> {
        let url = self.supabase_url.as_deref()?.trim_end_matches('/');
        let key = self.supabase_service_role_key.as_deref()?;
        if url.is_empty() || key.is_empty() {
            return None;
        }
        Some(SupabaseConfig {
            url: url.to_string(),
            service_role_key: key.to_string(),
        })
    }

    /// ElevenLabs key, treating an empty value as unset
    pub fn elevenlabs_key(&self) -> Option<&str> {
        self.elevenlabs_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// Outbound request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.supabase_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("SUPABASE_URL must start with http:// or https://".to_string());
            }
        }

        if let Some(ref secret) = self.supabase_jwt_secret {
            if secret.len() < 32 {
                return Err("SUPABASE_JWT_SECRET must be at least 32 characters".to_string());
            }
        }

        if !self.elevenlabs_base_url.starts_with("http://")
            && !self.elevenlabs_base_url.starts_with("https://")
        {
            return Err("ELEVENLABS_BASE_URL must start with http:// or https://".to_string());
        }

        if self.max_body_bytes == Some(0) {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        Ok(())
    }
}
