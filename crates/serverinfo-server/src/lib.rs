//! HTTP speed server — current network throughput as JSON.
//!
//! Every `/speed*` request runs the shared [`RateEstimator`] once, so each
//! call measures the window since the previous call from *any* client. The
//! scaled variants only differ in the unit applied to that reading.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use serverinfo_core::{CounterError, RateEstimator, RateReading, RateUnit};

/// Shared server state.
struct AppState {
    estimator: Arc<Mutex<RateEstimator>>,
}

#[derive(Serialize)]
struct IndexResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Failure while taking a reading, surfaced as a 500.
enum ApiError {
    Counters(CounterError),
    Task(tokio::task::JoinError),
}

impl From<CounterError> for ApiError {
    fn from(e: CounterError) -> Self {
        Self::Counters(e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            Self::Counters(e) => {
                log::error!("network counter read failed: {e}");
                e.to_string()
            }
            Self::Task(e) => {
                log::error!("counter read task failed: {e}");
                "counter read task failed".to_string()
            }
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error }),
        )
            .into_response()
    }
}

async fn handle_index() -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "ok",
        message: "Network Speed Server - usage: GET /speed",
    })
}

async fn read_speed(state: &AppState, unit: RateUnit) -> Result<Json<RateReading>, ApiError> {
    // Counter reads touch /proc or spawn netstat; keep them off the runtime.
    let mut estimator = Arc::clone(&state.estimator).lock_owned().await;
    let reading = tokio::task::spawn_blocking(move || estimator.estimate()).await??;
    let scaled = reading.scaled(unit);
    log::debug!(
        "speed in={} out={} {}",
        scaled.incoming,
        scaled.outgoing,
        scaled.unit
    );
    Ok(Json(scaled))
}

async fn handle_speed(State(state): State<Arc<AppState>>) -> Result<Json<RateReading>, ApiError> {
    read_speed(&state, RateUnit::BytesPerSec).await
}

async fn handle_speed_kb(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateReading>, ApiError> {
    read_speed(&state, RateUnit::KiloBytesPerSec).await
}

async fn handle_speed_mb(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateReading>, ApiError> {
    read_speed(&state, RateUnit::MegaBytesPerSec).await
}

/// Build the axum router around `estimator`.
pub fn build_router(estimator: RateEstimator) -> Router {
    let state = Arc::new(AppState {
        estimator: Arc::new(Mutex::new(estimator)),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route(RateUnit::BytesPerSec.path(), get(handle_speed))
        .route(RateUnit::KiloBytesPerSec.path(), get(handle_speed_kb))
        .route(RateUnit::MegaBytesPerSec.path(), get(handle_speed_mb))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP speed server until Ctrl-C.
pub async fn run_server(estimator: RateEstimator, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(estimator);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("shutting down"),
        Err(e) => {
            log::error!("cannot listen for Ctrl-C, running until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
}
