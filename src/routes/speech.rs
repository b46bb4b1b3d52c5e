//! Text-to-speech function
//!
//! `POST /text-to-speech` with `{text, voice?}` returns `{audioContent}`.

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::logging::{EventType, UsageEvent};
use crate::routes::response::{error_response, json_response, parse_json_body, BoxBody, BoxError};
use crate::server::AppState;
use crate::speech::{SpeechRequest, SpeechResponse, Voice};
use crate::types::ApiError;

pub async fn handle_text_to_speech<B>(req: Request<B>, state: Arc<AppState>) -> Response<BoxBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let mut voice = None;

    let result = run_speech(req, &state, &mut voice).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            let voice = voice.unwrap_or_default();
            state
                .usage
                .log(
                    UsageEvent::new(EventType::SpeechSynthesized, StatusCode::OK.as_u16())
                        .with_operation(voice.label())
                        .with_bytes(response.audio_content.len() as u64)
                        .with_duration(duration_ms),
                )
                .await;
            json_response(StatusCode::OK, &response)
        }
        Err(err) => {
            let status = err.status_code();
            warn!(
                voice = voice.map(|v| v.label()).unwrap_or("-"),
                status = status.as_u16(),
                error = %err,
                "Speech request rejected"
            );

            let mut event = UsageEvent::new(EventType::SpeechRejected, status.as_u16())
                .with_duration(duration_ms)
                .with_error(err.kind());
            if let Some(voice) = voice {
                event = event.with_operation(voice.label());
            }
            state.usage.log(event).await;

            error_response(&err)
        }
    }
}

async fn run_speech<B>(
    req: Request<B>,
    state: &AppState,
    voice: &mut Option<Voice>,
) -> Result<SpeechResponse, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    // An unconfigured provider answers 503 before the body is looked at
    let request = if state.speech.is_configured() {
        parse_json_body::<SpeechRequest, _>(req, state.args.max_body_bytes).await?
    } else {
        SpeechRequest::default()
    };

    *voice = Some(Voice::from_label(request.voice.as_deref()));
    state.speech.synthesize(request).await
}
