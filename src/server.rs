use crate::aggregator::Aggregator;
use crate::error::Result;
use crate::github::validate_username;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared by the handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub api_url: String,
    pub start_time: Instant,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Liveness probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub api_url: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/users/:username", get(get_user_h_index))
        .route("/health", get(liveness_check))
        .route("/healthz", get(liveness_check)) // Kubernetes convention
        .route("/livez", get(liveness_check))
        .route("/readyz", get(readiness_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Serve the HTTP API until the process is stopped
pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("H-index server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Aggregate and score a user's repositories
async fn get_user_h_index(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    let username = match validate_username(&username) {
        Ok(username) => username.to_string(),
        Err(e) => {
            warn!("Rejected lookup: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: e.to_string() }),
            )
                .into_response();
        }
    };

    let result = state.aggregator.lookup(&username).await;
    if result.is_partial() {
        warn!(
            %username,
            failures = result.failures.len(),
            "Returning partial results"
        );
    }

    (StatusCode::OK, Json(result)).into_response()
}

async fn liveness_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(LivenessResponse {
            status: "alive".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    )
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ReadinessResponse {
            ready: true,
            api_url: state.api_url.clone(),
        }),
    )
}
