//! HTTP entry point for starting and polling workflow runs

use crate::pipeline::{DocumentSet, FrequencyTable};
use crate::workflow::{RunFailure, RunStage, WorkflowHost, WORD_FREQUENCY};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// API server exposing the run trigger and status endpoints
pub struct ApiServer {
    host: Arc<WorkflowHost>,
    port: u16,
}

impl ApiServer {
    pub fn new(host: Arc<WorkflowHost>, port: u16) -> Self {
        Self { host, port }
    }

    /// Bind and serve until the process exits.
    pub async fn start(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let app = build_router(self.host);

        info!("starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the router; exposed so tests can drive it without a socket.
pub fn build_router(host: Arc<WorkflowHost>) -> Router {
    Router::new()
        .route("/orchestrators/{name}", post(start_orchestration))
        .route("/runs/{id}", get(run_status))
        .layer(CorsLayer::permissive())
        .with_state(host)
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    books: DocumentSet,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    id: Uuid,
    status_query_get_uri: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    id: Uuid,
    runtime_status: RunStage,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    work_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<FrequencyTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<RunFailure>,
}

async fn start_orchestration(
    State(host): State<Arc<WorkflowHost>>,
    Path(name): Path<String>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<StartResponse>), StatusCode> {
    if name != WORD_FREQUENCY {
        return Err(StatusCode::NOT_FOUND);
    }

    let id = host.start(request.books).await.map_err(|error| {
        warn!(%error, "failed to start workflow run");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(StartResponse {
            id,
            status_query_get_uri: format!("/runs/{id}"),
        }),
    ))
}

async fn run_status(
    State(host): State<Arc<WorkflowHost>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let run = host.status(id).await.ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(StatusResponse {
        id: run.instance_id,
        runtime_status: run.stage,
        created_at: run.created_at,
        updated_at: run.updated_at,
        work_items: run.work_items,
        output: run.output,
        failure: run.failure,
    }))
}
