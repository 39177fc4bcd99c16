//! HTTP route handlers
//!
//! Thin layer: parse the request, call a service, translate the error kind
//! to a status code. No business logic lives here.

pub mod assignments;
pub mod availabilities;
pub mod duties;
pub mod events;
pub mod health;

pub use health::{health_check, readiness_check, version_info};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{Result, RosterError};

/// JSON response with the given status
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body)
        .unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

/// Error payload in the shape `{"error": "..."}` with the mapped status
pub(crate) fn error_response(err: &RosterError) -> Response<Full<Bytes>> {
    #[derive(Serialize)]
    struct ErrorBody {
        error: String,
    }
    json_response(
        err.status_code(),
        &ErrorBody {
            error: err.to_string(),
        },
    )
}

/// Map a service result to a JSON response
pub(crate) fn respond<T: Serialize>(result: Result<T>, ok_status: StatusCode) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => json_response(ok_status, &body),
        Err(err) => error_response(&err),
    }
}

/// Map a service result with no body to 204
pub(crate) fn respond_empty(result: Result<()>) -> Response<Full<Bytes>> {
    match result {
        Ok(()) => Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Full::new(Bytes::new()))
            .unwrap(),
        Err(err) => error_response(&err),
    }
}

/// Collect and decode a JSON request body; malformed bodies are
/// caller-correctable
pub(crate) async fn read_json<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| RosterError::InvalidInput(format!("failed to read body: {}", e)))?
        .to_bytes();

    serde_json::from_slice(&body)
        .map_err(|e| RosterError::InvalidInput(format!("malformed JSON body: {}", e)))
}

/// Decoded query parameters in order of appearance
pub(crate) fn query_params(uri: &Uri) -> Vec<(String, String)> {
    let Some(query) = uri.query() else {
        return Vec::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(key).map(|s| s.into_owned()).unwrap_or_else(|_| key.to_string()),
                urlencoding::decode(value).map(|s| s.into_owned()).unwrap_or_else(|_| value.to_string()),
            )
        })
        .collect()
}

/// First value of a named query parameter
pub(crate) fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
