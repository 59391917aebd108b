//! Document upload handler.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::DocumentInsights;
use axum::{
    Json,
    extract::{Multipart, State},
};

/// Name of the multipart field carrying the document
pub const UPLOAD_FIELD: &str = "pdf";

/// POST /upload-pdf - Infer topic and level from a PDF
#[utoipa::path(
    post,
    path = "/upload-pdf",
    tag = "documents",
    request_body(content = Vec<u8>, description = "PDF upload (multipart/form-data, field \"pdf\")", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Inferred topic, level and text preview", body = DocumentInsights),
        (status = 400, description = "No file uploaded, or file too large", body = crate::error::ApiError),
        (status = 422, description = "No extractable text in the document", body = crate::error::ApiError),
        (status = 501, description = "No document analyzer configured", body = crate::error::ApiError),
        (status = 502, description = "Document analyzer or model failed", body = crate::error::ApiError)
    )
)]
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentInsights>> {
    if !state.hub.document_upload_enabled() {
        return Err(Error::NotSupported(
            "document upload requires a document analyzer".into(),
        ));
    }

    let mut document: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("malformed multipart upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("failed to read upload: {e}")))?;
        document = Some((bytes.to_vec(), file_name));
        break;
    }

    let (bytes, file_name) =
        document.ok_or_else(|| Error::InvalidRequest("no PDF file uploaded".into()))?;

    tracing::info!(
        bytes = bytes.len(),
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        "analyzing uploaded document"
    );

    let insights = state
        .hub
        .analyze_document(&bytes, file_name.as_deref())
        .await?;
    Ok(Json(insights))
}
