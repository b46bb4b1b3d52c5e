//! User action function
//!
//! `POST /user-actions` with `{action, data}`. The caller is authenticated
//! before the body is read, so a missing credential is a 401 whatever the
//! payload looks like.

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::actions::ActionRequest;
use crate::auth::{authenticate, Identity};
use crate::logging::{EventType, UsageEvent};
use crate::routes::response::{
    error_response, get_auth_header, json_response, parse_json_body, BoxBody, BoxError,
};
use crate::server::AppState;
use crate::types::ApiError;

/// Successful action response
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub data: serde_json::Value,
}

/// What is known about a call by the time it finishes or fails
#[derive(Default)]
struct CallContext {
    user_id: Option<String>,
    action: Option<String>,
}

pub async fn handle_user_action<B>(req: Request<B>, state: Arc<AppState>) -> Response<BoxBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let mut ctx = CallContext::default();

    let result = run_action(req, &state, &mut ctx).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(row) => {
            let mut event = UsageEvent::new(EventType::ActionDispatched, StatusCode::OK.as_u16())
                .with_duration(duration_ms);
            if let Some(user_id) = ctx.user_id {
                event = event.with_user(user_id);
            }
            if let Some(action) = ctx.action {
                event = event.with_operation(action);
            }
            state.usage.log(event).await;

            json_response(
                StatusCode::OK,
                &ActionResponse {
                    success: true,
                    data: row,
                },
            )
        }
        Err(err) => {
            let status = err.status_code();
            warn!(
                action = ctx.action.as_deref().unwrap_or("-"),
                user_id = ctx.user_id.as_deref().unwrap_or("-"),
                status = status.as_u16(),
                error = %err,
                "User action rejected"
            );

            let event_type = match &err {
                ApiError::Unauthenticated(_) => EventType::AuthRejected,
                _ => EventType::ActionRejected,
            };
            let mut event = UsageEvent::new(event_type, status.as_u16())
                .with_duration(duration_ms)
                .with_error(err.kind());
            if let Some(user_id) = ctx.user_id {
                event = event.with_user(user_id);
            }
            if let Some(action) = ctx.action {
                event = event.with_operation(action);
            }
            state.usage.log(event).await;

            error_response(&err)
        }
    }
}

async fn run_action<B>(
    req: Request<B>,
    state: &AppState,
    ctx: &mut CallContext,
) -> Result<serde_json::Value, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let Some(backend) = state.actions.as_ref() else {
        return Err(ApiError::Internal(
            "Server configuration missing: SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are required"
                .into(),
        ));
    };

    let auth_header = get_auth_header(&req).map(str::to_owned);
    let identity: Identity =
        authenticate(backend.resolver.as_ref(), auth_header.as_deref()).await?;
    ctx.user_id = Some(identity.id.clone());

    let request: ActionRequest = parse_json_body(req, state.args.max_body_bytes).await?;
    ctx.action = Some(request.action.clone());
    debug!(action = %request.action, user_id = %identity.id, "Dispatching user action");

    backend.dispatcher.dispatch(&identity, request).await
}
