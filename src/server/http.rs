//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. One spawned task per
//! connection; routing is a match over (method, path segments).

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::links::RelationshipIndex;
use crate::nats::NatsClient;
use crate::routes;
use crate::services::{AssignmentService, AvailabilityService, DutyService, EventService};
use crate::store::TableStore;
use crate::types::RosterError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn TableStore>,
    pub store_backend: &'static str,
    pub nats: Option<NatsClient>,
    pub availabilities: AvailabilityService,
    pub duties: DutyService,
    pub assignments: AssignmentService,
    pub events: EventService,
}

impl AppState {
    pub fn new(
        args: Args,
        store: Arc<dyn TableStore>,
        store_backend: &'static str,
        nats: Option<NatsClient>,
    ) -> Self {
        let links = RelationshipIndex::new(Arc::clone(&store));
        Self {
            args,
            availabilities: AvailabilityService::new(Arc::clone(&store)),
            duties: DutyService::new(Arc::clone(&store)),
            assignments: AssignmentService::new(Arc::clone(&store)),
            events: EventService::new(Arc::clone(&store), links),
            store,
            store_backend,
            nats,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), RosterError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "rosterd listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - using in-memory store fallbacks");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
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

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/').to_string();

    info!("[{}] {} {}", addr, method, path);

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let response = match (&method, segments.as_slice()) {
        // Liveness probe - returns 200 while the process runs
        (&Method::GET, ["health"]) | (&Method::GET, ["healthz"]) => {
            routes::health_check(Arc::clone(&state))
        }

        // Readiness probe - 503 until the queue connection is up (dev mode excepted)
        (&Method::GET, ["ready"]) | (&Method::GET, ["readyz"]) => {
            routes::readiness_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (&Method::GET, ["version"]) => routes::version_info(),

        // Availability windows
        (&Method::POST, ["availabilities"]) => {
            routes::availabilities::handle_create(req, state).await
        }
        (&Method::GET, ["availabilities"]) => {
            routes::availabilities::handle_list(&req, state).await
        }
        (&Method::GET, ["availabilities", employee_id, id]) => {
            routes::availabilities::handle_get(state, employee_id, id).await
        }
        (&Method::DELETE, ["availabilities", employee_id, id]) => {
            routes::availabilities::handle_delete(state, employee_id, id).await
        }

        // Duty catalog
        (&Method::POST, ["duties"]) => routes::duties::handle_create(req, state).await,
        (&Method::GET, ["duties"]) => routes::duties::handle_list(&req, state).await,
        (&Method::GET, ["duties", id]) => routes::duties::handle_get(state, id).await,

        // Duty assignments, scoped under their shift
        (&Method::GET, ["shifts", shift_id, "assignments"]) => {
            routes::assignments::handle_list(state, shift_id).await
        }
        (&Method::GET, ["shifts", shift_id, "assignments", duty_id]) => {
            routes::assignments::handle_get(state, shift_id, duty_id).await
        }
        (&Method::PATCH, ["shifts", shift_id, "assignments", duty_id]) => {
            routes::assignments::handle_update(req, state, shift_id, duty_id).await
        }
        (&Method::DELETE, ["shifts", shift_id, "assignments", duty_id]) => {
            routes::assignments::handle_delete(state, shift_id, duty_id).await
        }

        // Events
        (&Method::POST, ["events"]) => routes::events::handle_create(req, state).await,
        (&Method::GET, ["events"]) => routes::events::handle_list(&req, state).await,
        (&Method::GET, ["events", id]) => routes::events::handle_get(state, id).await,
        (&Method::PUT, ["events", id]) => routes::events::handle_update(req, state, id).await,
        (&Method::DELETE, ["events", id]) => routes::events::handle_delete(state, id).await,

        // CORS preflight
        (&Method::OPTIONS, _) => preflight_response(),

        _ => not_found_response(&path),
    };

    Ok(response)
}

fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        )
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
