//! HTTP JSON service
//!
//! `route` maps a request onto the store and demo data sources and is kept
//! free of I/O plumbing so it can be driven directly. `serve` wraps it in a
//! hyper HTTP/1 server, one task per connection, running each request on the
//! blocking pool because the SQLite connection is synchronous.

use crate::model::schema::FormSchema;
use crate::model::user::NewUser;
use crate::services::employees::load_directory;
use crate::services::news;
use crate::services::store::{StoreError, UserQuery, UserStore};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value as Json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::TcpListener;

// ═══════════════════════════════════════════════════════════════════════════════
// State
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared state of the running service
pub struct ServerState {
    store: Mutex<UserStore>,
    employees_path: PathBuf,
    rng: Mutex<StdRng>,
}

impl ServerState {
    pub fn new(store: UserStore, employees_path: PathBuf) -> Self {
        Self::with_rng(store, employees_path, StdRng::from_os_rng())
    }

    /// State with a caller-provided random source for the news endpoint
    pub fn with_rng(store: UserStore, employees_path: PathBuf, rng: StdRng) -> Self {
        Self {
            store: Mutex::new(store),
            employees_path,
            rng: Mutex::new(rng),
        }
    }
}

/// Status and optional JSON body of a response
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Option<Json>,
}

impl Reply {
    fn json(status: StatusCode, body: Json) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn ok<T: serde::Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::json(status, body),
            Err(e) => Self::failure("Failed to encode response", &e.to_string()),
        }
    }

    fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    fn failure(message: &str, details: &str) -> Self {
        Self::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": message, "details": details }),
        )
    }

    fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let bytes = match &self.body {
            Some(body) => Bytes::from(body.to_string()),
            None => Bytes::new(),
        };
        let mut response = Response::new(Full::new(bytes));
        *response.status_mut() = self.status;
        if self.body.is_some() {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        response
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Routing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Route one request
pub fn route(state: &ServerState, method: &Method, path: &str, query: Option<&str>, body: &[u8]) -> Reply {
    let path = path.trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["api", "users"] => match *method {
            Method::GET => list_users(state, &parse_query(query)),
            Method::POST => create_user(state, body),
            _ => method_not_allowed(),
        },
        ["api", "users", id] => {
            let Ok(id) = id.parse::<i64>() else {
                return Reply::error(StatusCode::NOT_FOUND, "Not found");
            };
            match *method {
                Method::PUT => update_user(state, id, body),
                Method::DELETE => delete_user(state, id),
                _ => method_not_allowed(),
            }
        }
        ["api", "employee"] => match *method {
            Method::GET => employees(state),
            _ => method_not_allowed(),
        },
        ["api", "news"] => match *method {
            Method::GET => news_feed(state),
            _ => method_not_allowed(),
        },
        ["api", "schema", "register"] => match *method {
            Method::GET => Reply::ok(StatusCode::OK, &FormSchema::register()),
            _ => method_not_allowed(),
        },
        _ => Reply::error(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn method_not_allowed() -> Reply {
    Reply::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn list_users(state: &ServerState, params: &HashMap<String, String>) -> Reply {
    let query = match UserQuery::from_params(params) {
        Ok(query) => query,
        Err(e) => return Reply::error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let store = state.store.lock().unwrap_or_else(|e| e.into_inner());
    match store.query_page(&query) {
        Ok(page) => Reply::ok(StatusCode::OK, &page),
        Err(e) => {
            error!("Failed to fetch users: {}", e);
            Reply::failure("Failed to fetch users", &e.to_string())
        }
    }
}

/// Decode a user payload; malformed JSON and wrong field types are client errors
fn parse_user(body: &[u8]) -> Result<NewUser, Reply> {
    let value: Json = serde_json::from_slice(body)
        .map_err(|_| Reply::error(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;
    let user: NewUser = serde_json::from_value(value)
        .map_err(|e| Reply::error(StatusCode::BAD_REQUEST, &e.to_string()))?;
    if !user.has_required() {
        return Err(Reply::error(StatusCode::BAD_REQUEST, "name and email required"));
    }
    Ok(user)
}

fn create_user(state: &ServerState, body: &[u8]) -> Reply {
    let user = match parse_user(body) {
        Ok(user) => user,
        Err(reply) => return reply,
    };

    let store = state.store.lock().unwrap_or_else(|e| e.into_inner());
    match store.create(&user) {
        Ok(created) => {
            info!("Created user {} <{}>", created.id, created.email);
            Reply::ok(StatusCode::CREATED, &created)
        }
        Err(StoreError::Validation(msg)) => Reply::error(StatusCode::BAD_REQUEST, &msg),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Reply::failure("Failed to create user", &e.to_string())
        }
    }
}

fn update_user(state: &ServerState, id: i64, body: &[u8]) -> Reply {
    let user = match parse_user(body) {
        Ok(user) => user,
        Err(reply) => return reply,
    };

    let store = state.store.lock().unwrap_or_else(|e| e.into_inner());
    match store.update(id, &user) {
        Ok(updated) => Reply::ok(StatusCode::OK, &updated),
        Err(StoreError::NotFound(_)) => Reply::error(StatusCode::NOT_FOUND, "User not found"),
        Err(StoreError::Validation(msg)) => Reply::error(StatusCode::BAD_REQUEST, &msg),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Reply::failure("Failed to update user", &e.to_string())
        }
    }
}

fn delete_user(state: &ServerState, id: i64) -> Reply {
    let store = state.store.lock().unwrap_or_else(|e| e.into_inner());
    match store.delete(id) {
        Ok(()) => {
            info!("Deleted user {}", id);
            Reply::no_content()
        }
        Err(StoreError::NotFound(_)) => Reply::error(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Reply::failure("Failed to delete user", &e.to_string())
        }
    }
}

fn employees(state: &ServerState) -> Reply {
    match load_directory(&state.employees_path) {
        Ok(directory) => Reply::ok(StatusCode::OK, &directory),
        Err(e) => {
            error!("Error reading employee data: {}", e);
            Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load employee data")
        }
    }
}

fn news_feed(state: &ServerState) -> Reply {
    let mut rng = state.rng.lock().unwrap_or_else(|e| e.into_inner());
    match news::generate(&mut *rng) {
        Some(items) => Reply::ok(StatusCode::OK, &items),
        None => Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "Random API failure"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Server
// ═══════════════════════════════════════════════════════════════════════════════

async fn handle(state: Arc<ServerState>, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return Ok(Reply::error(StatusCode::BAD_REQUEST, "Failed to read request body").into_response());
        }
    };

    let reply = {
        let method = method.clone();
        let path = path.clone();
        tokio::task::spawn_blocking(move || route(&state, &method, &path, query.as_deref(), &body))
            .await
            .unwrap_or_else(|e| Reply::failure("Internal error", &e.to_string()))
    };

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        reply.status.as_u16(),
        started.elapsed().as_millis()
    );
    Ok(reply.into_response())
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(state: Arc<ServerState>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    run(state, listener).await
}

/// Accept connections on a bound listener until Ctrl-C
pub async fn run(state: Arc<ServerState>, listener: TcpListener) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Accept failed: {}", e);
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let state = state.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(state.clone(), req));
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Connection from {} closed with error: {}", peer, e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
