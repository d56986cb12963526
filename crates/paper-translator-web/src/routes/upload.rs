//! Upload route - PDF file upload handling.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum_extra::extract::Multipart;
use paper_translator_core::Workflow;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::helpers::{
    OptionExt, ResultExt, RouteResult, back_to_session, is_pdf_upload, run_blocking,
};
use crate::state::{AppState, FlashKind};

/// Upload a PDF and extract its text - redirects back to the session page.
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> RouteResult<Redirect> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        if !is_pdf_upload(field.file_name(), field.content_type()) {
            warn!("Rejected non-PDF upload {:?}", filename);
            session
                .flash(FlashKind::Error, "PDF 파일만 업로드할 수 있습니다.")
                .await;
            return Ok(back_to_session(&session_id));
        }

        let data = field.bytes().await.or_bad_request()?;
        let size = data.len();

        let workflow = state.workflow.clone();
        let extracted = run_blocking(move || workflow.extract(data.to_vec())).await?;

        match extracted {
            Ok(upload) => {
                let chars = upload.text.chars().count();
                session
                    .with_session_mut(|s| {
                        Workflow::commit_upload(&mut s.workflow, upload);
                        s.filename = Some(filename.clone());
                        s.flash(FlashKind::Success, "PDF 텍스트 추출 완료!");
                        if chars == 0 {
                            s.flash(
                                FlashKind::Warning,
                                "PDF에서 추출된 텍스트가 없습니다. 번역할 내용이 없습니다.",
                            );
                        }
                    })
                    .await
                    .or_not_found("Session not found")?;
                info!(
                    "Session {}: uploaded {} ({} bytes, {} chars)",
                    session_id, filename, size, chars
                );
            }
            Err(e) => {
                error!("Failed to extract {}: {}", filename, e);
                session
                    .flash(FlashKind::Error, format!("PDF 처리 중 오류가 발생했습니다: {e}"))
                    .await;
            }
        }

        return Ok(back_to_session(&session_id));
    }

    Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string()))
}
