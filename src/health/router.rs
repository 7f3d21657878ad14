use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{context::AppContext, notifications::service::BackendStatus};

const STATUS_TAG: &str = "status";

#[derive(Debug, Serialize, ToSchema)]
pub struct GreetingResponse {
    #[schema(example = "Hello API")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the push backend is ready, `degraded` otherwise
    #[schema(example = "ok")]
    pub status: String,
    pub backend: BackendStatus,
}

pub fn router() -> OpenApiRouter<Arc<AppContext>> {
    OpenApiRouter::new()
        .routes(routes!(get_greeting))
        .routes(routes!(get_health))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = GreetingResponse)
    ),
    tag = STATUS_TAG
)]
async fn get_greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hello API".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "State of the push delivery backend", body = HealthResponse)
    ),
    tag = STATUS_TAG
)]
async fn get_health(State(context): State<Arc<AppContext>>) -> Json<HealthResponse> {
    let backend = context.notification_service.status();
    let status = match backend {
        BackendStatus::Ready => "ok",
        BackendStatus::Failed | BackendStatus::Uninitialized => "degraded",
    };

    Json(HealthResponse {
        status: status.to_string(),
        backend,
    })
}
