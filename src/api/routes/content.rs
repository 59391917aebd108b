//! Content handlers: task initiation, status polling, synchronous generation.

use super::{ContentQuery, StatusQuery};
use crate::api::AppState;
use crate::content::render;
use crate::error::{Error, Result, ToHttpStatus};
use crate::types::{ContentRequest, InitiateResponse, TaskId, TaskStatusResponse};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

fn content_request(query: &ContentQuery) -> Result<ContentRequest> {
    ContentRequest::from_params(
        query.topic.as_deref(),
        query.grade.as_deref(),
        query.kind.as_deref(),
        query.stage.as_deref(),
    )
}

/// GET /initiate-content-generation - Start generating stage content
#[utoipa::path(
    get,
    path = "/initiate-content-generation",
    tag = "content",
    params(ContentQuery),
    responses(
        (status = 200, description = "Task created; poll its status with the returned id", body = InitiateResponse),
        (status = 400, description = "A required parameter is missing", body = crate::error::ApiError),
        (status = 429, description = "Too many generation requests", body = crate::error::ApiError),
        (status = 503, description = "Task store full or shutting down", body = crate::error::ApiError)
    )
)]
pub async fn initiate_content_generation(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<InitiateResponse>> {
    let request = content_request(&query)?;
    let task_id = state.hub.initiate(request).await?;
    Ok(Json(InitiateResponse { task_id }))
}

/// GET /check-content-status - Poll a task
#[utoipa::path(
    get,
    path = "/check-content-status",
    tag = "content",
    params(StatusQuery),
    responses(
        (status = 200, description = "Task is pending or completed", body = TaskStatusResponse),
        (status = 400, description = "taskId is missing", body = crate::error::ApiError),
        (status = 404, description = "Task never existed or has expired", body = crate::error::ApiError)
    )
)]
pub async fn check_content_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TaskStatusResponse>> {
    let task_id = query
        .task_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(TaskId::from)
        .ok_or_else(|| Error::InvalidRequest("taskId is required".into()))?;

    let task_state = state.hub.status(&task_id).await?;
    Ok(Json(task_state.into()))
}

/// GET /generate-content - Generate stage content and wait for it
///
/// Provider failures answer with the apology fragment as HTML so the page can
/// render it in place.
#[utoipa::path(
    get,
    path = "/generate-content",
    tag = "content",
    params(ContentQuery),
    responses(
        (status = 200, description = "Rendered HTML fragment", body = String, content_type = "text/html"),
        (status = 400, description = "A required parameter is missing", body = crate::error::ApiError),
        (status = 429, description = "Too many generation requests", body = crate::error::ApiError),
        (status = 502, description = "A provider failed; body is the apology fragment", body = String, content_type = "text/html")
    )
)]
pub async fn generate_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Response {
    let request = match content_request(&query) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match state.hub.generate_content(&request).await {
        Ok(html) => Html(html).into_response(),
        Err(e @ Error::Provider(_)) => {
            tracing::warn!(
                kind = %request.kind,
                topic = %request.topic,
                error = %e,
                "synchronous content generation failed"
            );
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Html(render::apology(&request.kind))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
