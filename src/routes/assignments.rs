//! Duty assignment endpoints
//!
//! Assignments are created by the clock-in consumer, not over HTTP.
//!
//! - GET    /shifts/{shift_id}/assignments
//! - GET    /shifts/{shift_id}/assignments/{duty_id}
//! - PATCH  /shifts/{shift_id}/assignments/{duty_id}
//! - DELETE /shifts/{shift_id}/assignments/{duty_id}

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::routes::{error_response, read_json, respond, respond_empty};
use crate::server::AppState;

#[derive(Deserialize)]
struct UpdateAssignment {
    status: String,
    image_url: Option<String>,
    note: Option<String>,
}

pub async fn handle_list(state: Arc<AppState>, shift_id: &str) -> Response<Full<Bytes>> {
    respond(state.assignments.list_for_shift(shift_id).await, StatusCode::OK)
}

pub async fn handle_get(
    state: Arc<AppState>,
    shift_id: &str,
    duty_id: &str,
) -> Response<Full<Bytes>> {
    respond(state.assignments.get(shift_id, duty_id).await, StatusCode::OK)
}

pub async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    shift_id: &str,
    duty_id: &str,
) -> Response<Full<Bytes>> {
    let body: UpdateAssignment = match read_json(req).await {
        Ok(body) => body,
        Err(e) => return error_response(&e),
    };

    respond(
        state
            .assignments
            .update(shift_id, duty_id, &body.status, body.image_url, body.note)
            .await,
        StatusCode::OK,
    )
}

pub async fn handle_delete(
    state: Arc<AppState>,
    shift_id: &str,
    duty_id: &str,
) -> Response<Full<Bytes>> {
    respond_empty(state.assignments.delete(shift_id, duty_id).await)
}
