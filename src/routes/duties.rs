//! Duty catalog endpoints
//!
//! - POST /duties
//! - GET  /duties            (optionally ?role_id=..)
//! - GET  /duties/{id}

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::schemas::Duty;
use crate::routes::{error_response, param, query_params, read_json, respond};
use crate::server::AppState;

#[derive(Deserialize)]
struct CreateDuty {
    role_id: String,
    name: String,
    #[serde(default)]
    description: String,
}

pub async fn handle_create(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body: CreateDuty = match read_json(req).await {
        Ok(body) => body,
        Err(e) => return error_response(&e),
    };

    let duty = Duty::new(body.role_id, body.name, body.description);
    respond(state.duties.create(duty).await, StatusCode::CREATED)
}

pub async fn handle_list(req: &Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let params = query_params(req.uri());
    let result = match param(&params, "role_id") {
        Some(role_id) => state.duties.list_for_role(role_id).await,
        None => state.duties.list_all().await,
    };
    respond(result, StatusCode::OK)
}

pub async fn handle_get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    respond(state.duties.get(id).await, StatusCode::OK)
}
