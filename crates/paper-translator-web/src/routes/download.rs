//! Download routes - Markdown exports and the original PDF.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use paper_translator_core::ExportKind;
use std::sync::Arc;

use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::state::AppState;

/// Download the translation, or original plus translation, as Markdown.
pub async fn download_export(
    State(state): State<Arc<AppState>>,
    Path((session_id, kind)): Path<(String, String)>,
) -> RouteResult<Response> {
    let kind = ExportKind::from_name(&kind).or_not_found("Unknown export")?;

    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let (original, translated) = session
        .with_session(|s| {
            (
                s.workflow.original_text.clone(),
                s.workflow.translated_text.clone(),
            )
        })
        .await
        .or_not_found("Session not found")?;

    if translated.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Nothing translated yet".to_string()));
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            format!("{}; charset=utf-8", kind.mime_type()),
        )
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.file_name()),
        )
        .body(Body::from(kind.render(&original, &translated)))
        .or_internal_error()
}

/// Serve the session's PDF inline for the browser viewer.
pub async fn view_pdf(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<Response> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let bytes = session
        .with_session(|s| {
            s.workflow
                .uploaded_file
                .as_ref()
                .filter(|_| s.workflow.pdf_uploaded)
                .map(|buffer| buffer.as_bytes().to_vec())
        })
        .await
        .flatten()
        .or_not_found("No PDF in this session")?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, "inline")
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(bytes))
        .or_internal_error()
}
