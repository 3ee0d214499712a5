//! Local HTTP server for the operator console. All requests are routed through
//! [routes::route_request] against one shared [MatchSession].

pub mod api;
pub mod routes;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError};
use crate::storage::{FileStore, KeyValueStore};
use crate::tracker::{MatchSession, SessionError};

pub type SharedSession<S> = Arc<Mutex<MatchSession<S>>>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load match session: {0}")]
    Session(#[from] SessionError),
}

pub fn run_server(config: &Config) -> Result<(), ServerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: &Config) -> Result<(), ServerError> {
    let catalog = config.load_catalog()?;
    let store = FileStore::new(config.data_dir.clone());
    let mut session = MatchSession::load(store, catalog)?;
    session.set_history_len(config.history_len);
    let shared = Arc::new(Mutex::new(session));

    tokio::spawn(run_clock(Arc::clone(&shared)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        "handball tracker listening on http://{}",
        config.bind_addr
    );
    axum::serve(listener, router(shared)).await?;
    Ok(())
}

pub fn router<S: KeyValueStore + Send + 'static>(session: SharedSession<S>) -> Router {
    Router::new().fallback(handle::<S>).with_state(session)
}

/// Routing locks the session and may write to disk, so it runs on the blocking pool.
async fn handle<S: KeyValueStore + Send + 'static>(
    State(session): State<SharedSession<S>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let routed = tokio::task::spawn_blocking(move || {
        let body = String::from_utf8_lossy(&body);
        dispatch(&session, method.as_str(), uri.path(), &body)
    })
    .await;
    match routed {
        Ok(response) => response.into_response(),
        Err(err) => {
            error!(error = %err, "request handler panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn dispatch<S: KeyValueStore>(
    session: &SharedSession<S>,
    method: &str,
    path: &str,
    body: &str,
) -> routes::HttpResponse {
    let mut guard = match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let response = routes::route_request(&mut *guard, method, path, body);
    if response.status_code >= 500 {
        warn!(method, path, status = response.status_code, "request failed");
    }
    response
}

/// Advance the match clock once per second while it runs.
async fn run_clock<S: KeyValueStore + Send + 'static>(session: SharedSession<S>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;
    loop {
        interval.tick().await;
        let session = Arc::clone(&session);
        if let Err(err) = tokio::task::spawn_blocking(move || tick_once(&session)).await {
            error!(error = %err, "clock tick panicked");
        }
    }
}

fn tick_once<S: KeyValueStore>(session: &SharedSession<S>) {
    let mut guard = match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Err(err) = guard.tick() {
        warn!(error = %err, "failed to persist match clock");
    }
}
