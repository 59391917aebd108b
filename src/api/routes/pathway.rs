//! Study pathway handler.

use super::PathwayQuery;
use crate::api::AppState;
use crate::error::Result;
use axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::{Html, IntoResponse, Response},
};

/// Response header reporting whether the pathway came from the cache
pub const PATHWAY_CACHE_HEADER: &str = "x-pathway-cache";

/// GET /study-pathway - Generate (or fetch from cache) a study pathway
#[utoipa::path(
    get,
    path = "/study-pathway",
    tag = "pathway",
    params(PathwayQuery),
    responses(
        (status = 200, description = "Pathway HTML; failed stages are replaced by an inline error block", body = String, content_type = "text/html"),
        (status = 400, description = "topic or grade is missing", body = crate::error::ApiError),
        (status = 429, description = "Too many generation requests", body = crate::error::ApiError),
        (status = 502, description = "Every stage failed", body = crate::error::ApiError)
    )
)]
pub async fn study_pathway(
    State(state): State<AppState>,
    Query(query): Query<PathwayQuery>,
) -> Result<Response> {
    let pathway = state
        .hub
        .pathway(query.topic.as_deref(), query.grade.as_deref())
        .await?;

    let mut response = Html(pathway.html).into_response();
    response.headers_mut().insert(
        PATHWAY_CACHE_HEADER,
        HeaderValue::from_static(if pathway.cached { "hit" } else { "miss" }),
    );
    Ok(response)
}
