//! REST API for the ledger tracker
//!
//! A thin transport: requests become intents or raw text for the
//! conversation engine, which answers with outcome data plus a reply text.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::conversation::ConversationEngine;
use crate::error::TrackerError;
use crate::models::{Intent, Outcome, UserId};
use crate::presenter::{render_error, render_outcome};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IntentRequest {
    pub user_id: i64,
    pub intent: Intent,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageRequest {
    pub user_id: i64,
    pub text: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String, data: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            data,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<ConversationEngine>,
}

fn status_for(error: &TrackerError) -> StatusCode {
    match error {
        TrackerError::StorageFailure(_) | TrackerError::ConfigError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn respond(result: crate::Result<Outcome>) -> (StatusCode, Json<ApiResponse>) {
    match result {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "reply": render_outcome(&outcome),
                "outcome": outcome,
            }))),
        ),
        Err(e) => (
            status_for(&e),
            Json(ApiResponse::error(
                e.to_string(),
                Some(serde_json::json!({
                    "reply": render_error(&e),
                    "recoverable": e.is_recoverable(),
                })),
            )),
        ),
    }
}

/// =============================
/// Endpoints
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn intent_handler(
    State(state): State<ApiState>,
    Json(req): Json<IntentRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!(user_id = req.user_id, intent = ?req.intent, "Received intent");
    respond(state.engine.dispatch(UserId(req.user_id), req.intent).await)
}

async fn message_handler(
    State(state): State<ApiState>,
    Json(req): Json<MessageRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!(user_id = req.user_id, "Received message");
    respond(state.engine.advance(UserId(req.user_id), &req.text).await)
}

async fn records_handler(
    State(state): State<ApiState>,
    Path(user_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse>) {
    let user = UserId(user_id);
    let records = state.engine.store().list(user).await;
    let conversation = state.engine.state(user).await;

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "records": records,
            "state": conversation,
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(engine: Arc<ConversationEngine>) -> Router {
    let state = ApiState { engine };

    Router::new()
        .route("/health", get(health))
        .route("/api/intent", post(intent_handler))
        .route("/api/message", post(message_handler))
        .route("/api/users/:user_id/records", get(records_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    engine: Arc<ConversationEngine>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(engine);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
