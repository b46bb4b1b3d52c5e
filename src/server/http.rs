//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one task per accepted connection. Both
//! functions are served under their bare path and under the hosted
//! `/functions/v1/` prefix.

use bytes::Bytes;
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::actions::ActionDispatcher;
use crate::auth::{DevIdentityResolver, IdentityResolver, JwtIdentityResolver, SupabaseAuthResolver};
use crate::config::Args;
use crate::db::{InMemoryStore, PostgrestStore};
use crate::logging::UsageLogger;
use crate::routes::response::{self, BoxError};
use crate::routes::{self, BoxBody};
use crate::speech::{ElevenLabsClient, SpeechProvider, SpeechProxy};
use crate::supabase::SupabaseClient;
use crate::types::ApiError;

/// Identity resolution plus row store, everything the action function needs
pub struct ActionBackend {
    pub resolver: Arc<dyn IdentityResolver>,
    pub dispatcher: ActionDispatcher,
}

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// `None` when the data store is not configured; action calls then fail
    /// with a 500 while the rest of the server keeps working
    pub actions: Option<ActionBackend>,
    pub speech: SpeechProxy,
    pub usage: UsageLogger,
    pub started_at: Instant,
}

impl AppState {
    /// Build state from configuration
    ///
    /// Dev mode wires the in-memory store and the dev resolver. Otherwise the
    /// Supabase project backs both, with local JWT verification when a
    /// signing secret is configured.
    pub fn new(args: Args) -> Result<Self, ApiError> {
        let actions = build_action_backend(&args)?;
        let speech = build_speech_proxy(&args)?;
        Ok(Self::with_backends(args, actions, speech))
    }

    /// Build state from already constructed backends
    pub fn with_backends(args: Args, actions: Option<ActionBackend>, speech: SpeechProxy) -> Self {
        Self {
            args,
            actions,
            speech,
            usage: UsageLogger::disabled(),
            started_at: Instant::now(),
        }
    }

    pub fn with_usage(mut self, usage: UsageLogger) -> Self {
        self.usage = usage;
        self
    }
}

fn build_action_backend(args: &Args) -> Result<Option<ActionBackend>, ApiError> {
    if args.dev_mode {
        return Ok(Some(ActionBackend {
            resolver: Arc::new(DevIdentityResolver),
            dispatcher: ActionDispatcher::new(Arc::new(InMemoryStore::new())),
        }));
    }

    let Some(config) = args.supabase() else {
        warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY not set - user actions will fail");
        return Ok(None);
    };

    let client = SupabaseClient::new(config, args.request_timeout())
        .map_err(|e| ApiError::Internal(format!("Failed to build Supabase client: {}", e)))?;
    let client = Arc::new(client);

    let resolver: Arc<dyn IdentityResolver> = match args.supabase_jwt_secret.as_deref() {
        Some(secret) if !secret.is_empty() => Arc::new(JwtIdentityResolver::new(secret.to_string())?),
        _ => Arc::new(SupabaseAuthResolver::new(Arc::clone(&client))),
    };

    Ok(Some(ActionBackend {
        resolver,
        dispatcher: ActionDispatcher::new(Arc::new(PostgrestStore::new(client))),
    }))
}

fn build_speech_proxy(args: &Args) -> Result<SpeechProxy, ApiError> {
    let Some(key) = args.elevenlabs_key() else {
        warn!("ELEVENLABS_API_KEY not set - text-to-speech will answer 503");
        return Ok(SpeechProxy::new(None));
    };

    let client = ElevenLabsClient::new(key, &args.elevenlabs_base_url, args.request_timeout())?;
    let provider: Arc<dyn SpeechProvider> = Arc::new(client);
    Ok(SpeechProxy::new(Some(provider)))
}

/// Bind `LISTEN` and serve until the process exits
pub async fn run(state: Arc<AppState>) -> Result<(), ApiError> {
    let listener = TcpListener::bind(state.args.listen).await?;
    info!("LevelUp edge functions listening on {}", state.args.listen);
    serve(listener, state).await
}

/// Serve connections from an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ApiError> {
    if state.args.dev_mode {
        warn!("Development mode enabled - any bearer token is accepted, rows are kept in memory");
    }

    match state.actions.as_ref() {
        Some(backend) => info!(
            "User actions enabled (store: {}, identity: {})",
            backend.dispatcher.store_name(),
            backend.resolver.name()
        ),
        None => warn!("User actions disabled: no data store configured"),
    }
    info!(
        "Text-to-speech {}",
        if state.speech.is_configured() { "enabled" } else { "disabled" }
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req: Request<Incoming>| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    UserActions,
    TextToSpeech,
}

/// Which function a path names, with or without the `/functions/v1` prefix
fn function_for_path(path: &str) -> Option<Function> {
    let name = path
        .strip_prefix("/functions/v1/")
        .or_else(|| path.strip_prefix('/'))?
        .trim_end_matches('/');

    match name {
        "user-actions" => Some(Function::UserActions),
        "text-to-speech" => Some(Function::TextToSpeech),
        _ => None,
    }
}

/// Route one request
pub async fn handle_request<B>(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<B>,
) -> Result<Response<BoxBody>, hyper::Error>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // CORS preflight on any path
    if method == Method::OPTIONS {
        return Ok(response::cors_preflight());
    }

    if let Some(function) = function_for_path(&path) {
        if method != Method::POST {
            return Ok(response::method_not_allowed_response());
        }
        let response = match function {
            Function::UserActions => routes::handle_user_action(req, state).await,
            Function::TextToSpeech => routes::handle_text_to_speech(req, state).await,
        };
        return Ok(response);
    }

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(state),
        (Method::GET, "/version") => routes::version_info(),
        _ => response::not_found_response(&path),
    };

    Ok(response)
}

#[cfg(test)]
pub(crate) fn test_args() -> Args {
    use clap::Parser;
    Args::try_parse_from(["levelup-edge"]).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use http_body_util::{BodyExt, Full};
    use hyper::StatusCode;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::with_backends(test_args(), None, SpeechProxy::new(None)))
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(method: Method, path: &str, body: &str) -> Response<BoxBody> {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        handle_request(state(), addr(), req).await.unwrap()
    }

    async fn body_json(resp: Response<BoxBody>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_function_paths() {
        assert_eq!(function_for_path("/user-actions"), Some(Function::UserActions));
        assert_eq!(
            function_for_path("/functions/v1/text-to-speech"),
            Some(Function::TextToSpeech)
        );
        assert_eq!(function_for_path("/functions/v1/health"), None);
        assert_eq!(function_for_path("/"), None);
    }

    #[tokio::test]
    async fn test_preflight_on_any_path() {
        for path in ["/user-actions", "/functions/v1/text-to-speech", "/anything"] {
            let resp = send(Method::OPTIONS, path, "").await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers()["Access-Control-Allow-Methods"], "POST, GET, OPTIONS");
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            assert!(bytes.is_empty());
        }
    }

    #[tokio::test]
    async fn test_wrong_method_on_function() {
        let resp = send(Method::GET, "/user-actions", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(resp).await["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let resp = send(Method::GET, "/nope", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["path"], "/nope");
    }

    #[tokio::test]
    async fn test_prefixed_speech_without_key() {
        let resp = send(Method::POST, "/functions/v1/text-to-speech", r#"{"text":"hi"}"#).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(resp.headers()["Content-Type"], "application/json");
    }

    #[test]
    fn test_dev_mode_wires_memory_backend() {
        let args = Args::try_parse_from(["levelup-edge", "--dev-mode"]).unwrap();
        let state = AppState::new(args).unwrap();
        let backend = state.actions.as_ref().unwrap();
        assert_eq!(backend.dispatcher.store_name(), "memory");
        assert_eq!(backend.resolver.name(), "dev");
        assert!(!state.speech.is_configured());
    }

    #[tokio::test]
    async fn test_dev_mode_refuses_empty_bearer() {
        let args = Args::try_parse_from(["levelup-edge", "--dev-mode"]).unwrap();
        let state = Arc::new(AppState::new(args).unwrap());

        let req = Request::post("/user-actions")
            .header("Authorization", "Bearer ")
            .body(Full::new(Bytes::from(r#"{"action":"create_task","data":{}}"#)))
            .unwrap();
        let resp = handle_request(state, addr(), req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
