//! Speech synthesis proxy
//!
//! Takes `{text, voice?}`, asks the provider for an MP3 and hands the audio
//! back base64-encoded so it fits in a JSON body.
//!
//! Order of checks:
//! 1. provider configured, else 503 without any outbound call
//! 2. non-blank text, else 400 without any outbound call
//! 3. voice label resolved, unknown labels fall back to `female-natural`
//! 4. one provider request, its failure status passed through

pub mod elevenlabs;

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::types::ApiError;

pub use elevenlabs::ElevenLabsClient;

/// The fixed set of voices offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voice {
    #[default]
    FemaleNatural,
    MaleNatural,
    FemaleWarm,
    MaleCalm,
}

impl Voice {
    pub const ALL: [Voice; 4] = [
        Voice::FemaleNatural,
        Voice::MaleNatural,
        Voice::FemaleWarm,
        Voice::MaleCalm,
    ];

    /// Resolve a client label; unknown or missing labels use the default
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("female-natural") => Voice::FemaleNatural,
            Some("male-natural") => Voice::MaleNatural,
            Some("female-warm") => Voice::FemaleWarm,
            Some("male-calm") => Voice::MaleCalm,
            _ => Voice::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Voice::FemaleNatural => "female-natural",
            Voice::MaleNatural => "male-natural",
            Voice::FemaleWarm => "female-warm",
            Voice::MaleCalm => "male-calm",
        }
    }

    /// Provider voice id
    pub fn voice_id(&self) -> &'static str {
        match self {
            Voice::FemaleNatural => "EXAVITQu4vr4xnSDxMaL",
            Voice::MaleNatural => "TX3LPaxmHKxFdv7VOQHJ",
            Voice::FemaleWarm => "XB0fDUnXU5powFXDhCwa",
            Voice::MaleCalm => "onwK4e9ZLuTAKqWW03F9",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request body of the speech function
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
}

/// Response body of the speech function
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    /// Base64-encoded MP3
    pub audio_content: String,
}

/// Speech provider failures
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// Request never produced a response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// Local client settings are unusable (e.g. a key that is not a valid header)
    #[error("Speech provider misconfigured: {0}")]
    Config(String),
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Provider { status, message } => ApiError::Provider { status, message },
            SpeechError::Http(e) => ApiError::Internal(format!("Speech request failed: {}", e)),
            SpeechError::Config(message) => ApiError::ServiceUnavailable(message),
        }
    }
}

/// Text-to-speech backend
#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` and return the raw MP3 bytes
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Bytes, SpeechError>;
}

/// Validates requests and forwards them to the provider
pub struct SpeechProxy {
    provider: Option<Arc<dyn SpeechProvider>>,
}

impl SpeechProxy {
    /// `None` means no provider credential is configured
    pub fn new(provider: Option<Arc<dyn SpeechProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Run one synthesis request
    pub async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse, ApiError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(ApiError::ServiceUnavailable(
                "Text-to-speech is not configured: ELEVENLABS_API_KEY is missing".into(),
            ));
        };

        let text = request.text.as_deref().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("Text is required".into()));
        }

        let voice = Voice::from_label(request.voice.as_deref());

        let audio = provider.synthesize(text, voice).await.map_err(|e| {
            error!(voice = %voice, error = %e, "Speech synthesis failed");
            ApiError::from(e)
        })?;

        info!(
            voice = %voice,
            chars = text.chars().count(),
            bytes = audio.len(),
            "Speech synthesized"
        );

        Ok(SpeechResponse {
            audio_content: base64::engine::general_purpose::STANDARD.encode(&audio),
        })
    }
}
