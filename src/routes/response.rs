//! Response helpers shared by the function routes

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use crate::types::ApiError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Error type of a request body, boxed
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Headers a browser client may send on a function call
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const CORS_ALLOW_METHODS: &str = "POST, GET, OPTIONS";

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", CORS_ALLOW_METHODS)
        .header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
        .body(full_body(json))
        .unwrap()
}

/// JSON body and status for an error
pub fn error_response(err: &ApiError) -> Response<BoxBody> {
    json_response(err.status_code(), &err.to_body())
}

/// CORS preflight: empty body, permissive headers
pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", CORS_ALLOW_METHODS)
        .header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not found",
            "path": path,
        }),
    )
}

pub fn method_not_allowed_response() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({ "error": "Method not allowed" }),
    )
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

/// Authorization header value, if present and readable
pub fn get_auth_header<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Read the request body and parse it as JSON
///
/// `limit` caps the body size and is enforced while the body streams in;
/// `None` accepts any size.
pub async fn parse_json_body<T, B>(req: Request<B>, limit: Option<usize>) -> Result<T, ApiError>
where
    T: for<'de> serde::Deserialize<'de>,
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let bytes = match limit {
        Some(max) => Limited::new(req.into_body(), max)
            .collect()
            .await
            .map_err(body_error)?
            .to_bytes(),
        None => req
            .into_body()
            .collect()
            .await
            .map_err(|e| body_error(e.into()))?
            .to_bytes(),
    };

    serde_json::from_slice(&bytes).map_err(ApiError::from)
}

fn body_error(err: BoxError) -> ApiError {
    if err.downcast_ref::<LengthLimitError>().is_some() {
        ApiError::InvalidInput("Request body too large".into())
    } else {
        ApiError::InvalidInput(format!("Failed to read body: {}", err))
    }
}
