//! ElevenLabs text-to-speech client

use bytes::Bytes;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::speech::{SpeechError, SpeechProvider, Voice};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const MODEL_ID: &str = "eleven_multilingual_v2";
pub const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Voice shaping sent with every request
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.3,
            use_speaker_boost: true,
        }
    }
}

/// Body of `POST /v1/text-to-speech/{voice_id}`
#[derive(Debug, Serialize)]
pub struct SynthesisBody<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
}

pub struct ElevenLabsClient {
    base_url: String,
    client: Client,
}

impl ElevenLabsClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, SpeechError> {
        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(api_key)
            .map_err(|e| SpeechError::Config(format!("Invalid ELEVENLABS_API_KEY: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("xi-api-key", key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Endpoint for a voice
    pub fn synthesis_url(&self, voice: Voice) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url,
            voice.voice_id(),
            OUTPUT_FORMAT
        )
    }
}

#[async_trait::async_trait]
impl SpeechProvider for ElevenLabsClient {
    async fn synthesize(&self, text: &str, voice: Voice) -> Result<Bytes, SpeechError> {
        let url = self.synthesis_url(voice);
        let body = SynthesisBody {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings::default(),
        };

        debug!(voice = %voice, voice_id = voice.voice_id(), "Requesting speech synthesis");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %message, "ElevenLabs rejected request");
            return Err(SpeechError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}
