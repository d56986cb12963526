//! Translate route - runs the whole-document translation for a session.

use axum::extract::{Path, State};
use axum::response::Redirect;
use paper_translator_core::Workflow;
use std::sync::Arc;
use tracing::{error, info};

use crate::helpers::{OptionExt, RouteResult, back_to_session, describe_error, run_blocking};
use crate::state::{AppState, FlashKind};

/// Translate the session's extracted text and save it to history.
///
/// The session lock is released while the translation request runs; results
/// are committed only after the record has been saved, and only if the
/// session still shows the document the job was prepared from.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<Redirect> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let job = session
        .with_session_mut(|s| Workflow::prepare_translation(&mut s.workflow))
        .await
        .or_not_found("Session not found")?;

    let job = match job {
        Ok(job) => job,
        Err(e) => {
            session.flash(FlashKind::Error, e.to_string()).await;
            return Ok(back_to_session(&session_id));
        }
    };

    let workflow = state.workflow.clone();
    let saved = match workflow.translate_job(&job).await {
        Ok(translated) => {
            run_blocking(move || workflow.save_translation(&job, translated)).await?
        }
        Err(e) => Err(e),
    };

    let saved = match saved {
        Ok(saved) => saved,
        Err(e) => {
            error!("Session {}: translation failed: {}", session_id, e);
            session.flash(FlashKind::Error, describe_error(&e)).await;
            return Ok(back_to_session(&session_id));
        }
    };

    info!(
        "Session {}: saved translation {} ({:?})",
        session_id, saved.id, saved.title
    );
    session
        .with_session_mut(|s| {
            if !Workflow::commit_translation(&mut s.workflow, &saved) {
                s.flash(
                    FlashKind::Info,
                    format!(
                        "'{}' 번역이 완료되어 번역 기록에 저장되었습니다. 작업 중 다른 문서로 바뀌어 화면에는 표시하지 않았습니다.",
                        saved.title
                    ),
                );
                return;
            }
            if !saved.pdf_stored {
                s.flash(
                    FlashKind::Warning,
                    "PDF 파일이 비어있습니다. 번역은 저장되지만 PDF는 저장되지 않습니다.",
                );
            }
            s.flash(FlashKind::Success, "번역 완료!");
        })
        .await;

    Ok(back_to_session(&session_id))
}
