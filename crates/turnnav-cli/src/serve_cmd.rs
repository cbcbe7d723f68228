use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use turnnav_core::{KnowledgeService, PlanError, PlanService};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Handler state: the two services every route dispatches into.
#[derive(Clone)]
pub struct AppState {
    pub plans: Arc<PlanService>,
    pub knowledge: Arc<KnowledgeService>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    /// Extra context carried on generation failures.
    details: Option<String>,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Validation { .. }
            | PlanError::InvalidStatus { .. }
            | PlanError::InvalidUpdate { .. }
            | PlanError::Numeric(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            PlanError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "Plan not found"),
            PlanError::InvalidState { .. } | PlanError::InvalidTransition { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            PlanError::Upstream(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Failed to generate plan".to_string(),
                details: Some(err.to_string()),
            },
            PlanError::Store(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    // The list route is registered with and without the trailing slash so
    // clients written against either form keep working.
    Router::new()
        .route("/api/hello", get(hello))
        .route("/api/plans/generate", post(generate_plan))
        .route("/api/plans", get(list_plans))
        .route("/api/plans/", get(list_plans))
        .route(
            "/api/plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/api/rag/query", post(query_knowledge))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("turnnav serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("turnnav serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello World!" }))
}

async fn generate_plan(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<axum::response::Response, AppError> {
    let record = state.plans.create_and_save(&body).await?;
    Ok(Json(record.to_wire()).into_response())
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

async fn list_plans(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<axum::response::Response, AppError> {
    let records = state.plans.list(params.limit).await?;
    let wire: Vec<Value> = records.iter().map(|r| r.to_wire()).collect();
    Ok(Json(wire).into_response())
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let record = state
        .plans
        .get(id)
        .await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "Plan not found"))?;
    Ok(Json(record.to_wire()).into_response())
}

async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<axum::response::Response, AppError> {
    let record = state.plans.update(id, &body).await?;
    Ok(Json(record.to_wire()).into_response())
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let deleted = state.plans.delete(id).await?;
    if deleted {
        Ok(Json(json!({ "message": "Plan deleted successfully" })).into_response())
    } else {
        Err(AppError::new(StatusCode::NOT_FOUND, "Plan not found"))
    }
}

async fn query_knowledge(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<axum::response::Response, AppError> {
    // Absent and empty-string questions are both rejected.
    let question = body
        .get("question")
        .and_then(Value::as_str)
        .filter(|q| !q.is_empty());
    let Some(question) = question else {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "No question provided"));
    };

    let answer = state.knowledge.query(question).await;
    Ok(Json(answer).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
