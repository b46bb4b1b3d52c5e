//! Health check endpoints
//!
//! - /health, /healthz - liveness, always 200 while the process runs
//! - /version - build info for deployment verification
//!
//! The health body reports which backends are wired so a misconfigured
//! deployment shows up without sending a real action.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::response::{json_response, BoxBody};
use crate::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Seconds since the server state was built
    pub uptime: u64,
    pub timestamp: String,
    /// "development" or "production"
    pub mode: &'static str,
    /// Row store behind the action function ("postgrest", "memory", or null)
    pub store: Option<&'static str>,
    /// Identity resolver in use (null when actions are not configured)
    pub identity: Option<&'static str>,
    pub speech: SpeechHealth,
}

#[derive(Serialize)]
pub struct SpeechHealth {
    /// Whether a provider credential is configured
    pub configured: bool,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        store: state.actions.as_ref().map(|a| a.dispatcher.store_name()),
        identity: state.actions.as_ref().map(|a| a.resolver.name()),
        speech: SpeechHealth {
            configured: state.speech.is_configured(),
        },
    }
}

/// Handle liveness probe (/health, /healthz)
pub fn health_check(state: Arc<AppState>) -> Response<BoxBody> {
    json_response(StatusCode::OK, &build_health_response(&state))
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<BoxBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "levelup-edge",
    };

    json_response(StatusCode::OK, &response)
}
