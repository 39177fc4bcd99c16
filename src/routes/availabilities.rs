//! Availability endpoints
//!
//! - POST   /availabilities
//! - GET    /availabilities?employee_id=..&from=..&to=..
//! - GET    /availabilities/{employee_id}/{id}
//! - DELETE /availabilities/{employee_id}/{id}

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::schemas::Availability;
use crate::routes::{error_response, param, query_params, read_json, respond, respond_empty};
use crate::server::AppState;
use crate::types::RosterError;

#[derive(Deserialize)]
struct CreateAvailability {
    employee_id: String,
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
}

pub async fn handle_create(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body: CreateAvailability = match read_json(req).await {
        Ok(body) => body,
        Err(e) => return error_response(&e),
    };

    let availability = Availability::new(body.employee_id, body.start, body.end);
    respond(
        state.availabilities.create(availability).await,
        StatusCode::CREATED,
    )
}

pub async fn handle_list(req: &Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let params = query_params(req.uri());
    let Some(employee_id) = param(&params, "employee_id") else {
        return error_response(&RosterError::InvalidInput(
            "employee_id query parameter is required".to_string(),
        ));
    };

    respond(
        state
            .availabilities
            .list(employee_id, param(&params, "from"), param(&params, "to"))
            .await,
        StatusCode::OK,
    )
}

pub async fn handle_get(
    state: Arc<AppState>,
    employee_id: &str,
    id: &str,
) -> Response<Full<Bytes>> {
    respond(state.availabilities.get(employee_id, id).await, StatusCode::OK)
}

pub async fn handle_delete(
    state: Arc<AppState>,
    employee_id: &str,
    id: &str,
) -> Response<Full<Bytes>> {
    respond_empty(state.availabilities.delete(employee_id, id).await)
}
