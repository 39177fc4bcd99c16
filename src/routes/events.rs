//! Event endpoints
//!
//! - POST   /events
//! - GET    /events?status=..&from=..&to=..
//! - GET    /events/{id}
//! - PUT    /events/{id}
//! - DELETE /events/{id}

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::schemas::{ContactPerson, Event, EventStatus};
use crate::routes::{error_response, param, query_params, read_json, respond, respond_empty};
use crate::server::AppState;
use crate::types::{Result, RosterError};

#[derive(Deserialize)]
struct EventBody {
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
    address: String,
    venue: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: i64,
    status: Option<String>,
    #[serde(default)]
    contact: ContactPerson,
    note: Option<String>,
    #[serde(default)]
    shift_ids: Vec<String>,
}

impl EventBody {
    fn into_event(self, id: String) -> Result<Event> {
        let status = match self.status {
            Some(ref literal) => literal.parse::<EventStatus>()?,
            None => EventStatus::Planned,
        };
        Ok(Event {
            id,
            start: self.start,
            end: self.end,
            address: self.address,
            venue: self.venue,
            description: self.description,
            amount: self.amount,
            status,
            contact: self.contact,
            note: self.note,
            shift_ids: self.shift_ids,
        })
    }
}

pub async fn handle_create(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body: EventBody = match read_json(req).await {
        Ok(body) => body,
        Err(e) => return error_response(&e),
    };

    let event = match body.into_event(Uuid::new_v4().to_string()) {
        Ok(event) => event,
        Err(e) => return error_response(&e),
    };
    respond(state.events.create(event).await, StatusCode::CREATED)
}

pub async fn handle_list(req: &Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let params = query_params(req.uri());
    respond(
        state
            .events
            .list(
                param(&params, "status"),
                param(&params, "from"),
                param(&params, "to"),
            )
            .await,
        StatusCode::OK,
    )
}

pub async fn handle_get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    respond(state.events.get(id).await, StatusCode::OK)
}

pub async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<Full<Bytes>> {
    if id.trim().is_empty() {
        return error_response(&RosterError::InvalidInput(
            "event id must not be empty".to_string(),
        ));
    }

    let body: EventBody = match read_json(req).await {
        Ok(body) => body,
        Err(e) => return error_response(&e),
    };

    let event = match body.into_event(id.to_string()) {
        Ok(event) => event,
        Err(e) => return error_response(&e),
    };
    respond(state.events.update(event).await, StatusCode::OK)
}

pub async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    respond_empty(state.events.delete(id).await)
}
