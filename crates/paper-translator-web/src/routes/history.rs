//! History routes - restore, delete and start over.

use axum::extract::{Path, State};
use axum::response::Redirect;
use paper_translator_core::{DeleteOutcome, RecordId, Workflow};
use std::sync::Arc;
use tracing::{error, info};

use crate::helpers::{OptionExt, RouteResult, back_to_session, run_blocking};
use crate::state::{AppState, FlashKind};

/// Reset the session to an empty one.
pub async fn new_translation(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> RouteResult<Redirect> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    session
        .with_session_mut(|s| {
            Workflow::new_translation(&mut s.workflow);
            s.filename = None;
        })
        .await;

    Ok(back_to_session(&session_id))
}

/// Load a saved translation into the session.
pub async fn restore_translation(
    State(state): State<Arc<AppState>>,
    Path((session_id, id)): Path<(String, RecordId)>,
) -> RouteResult<Redirect> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let store = state.workflow.store().clone();
    let record = match run_blocking(move || store.get(id)).await? {
        Ok(Some(record)) => record,
        Ok(None) => {
            session
                .flash(FlashKind::Error, "번역 기록을 찾을 수 없습니다.")
                .await;
            return Ok(back_to_session(&session_id));
        }
        Err(e) => {
            error!("Failed to load translation {}: {}", id, e);
            session
                .flash(FlashKind::Error, format!("번역 기록을 불러오지 못했습니다: {e}"))
                .await;
            return Ok(back_to_session(&session_id));
        }
    };

    session
        .with_session_mut(|s| {
            let outcome = Workflow::restore(&mut s.workflow, &record);
            s.filename = None;
            if let Some(warning) = outcome.warning {
                s.flash(
                    FlashKind::Warning,
                    format!("저장된 PDF 파일이 손상되었습니다. ({warning})"),
                );
            } else if s.workflow.pdf_uploaded {
                s.flash(FlashKind::Success, "번역 기록에서 PDF를 불러왔습니다!");
            } else {
                s.flash(FlashKind::Info, "이 번역 기록에는 PDF 파일이 저장되지 않았습니다.");
            }
        })
        .await;

    info!("Session {}: restored translation {}", session_id, id);
    Ok(back_to_session(&session_id))
}

/// Two-step delete: the first click asks for confirmation, the second deletes.
///
/// The confirmation flag is read and written under the session lock; the
/// SQLite delete runs on the blocking pool with no lock held.
pub async fn delete_translation(
    State(state): State<Arc<AppState>>,
    Path((session_id, id)): Path<(String, RecordId)>,
) -> RouteResult<Redirect> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    let confirmed = session
        .with_session_mut(|s| Workflow::begin_delete(&mut s.workflow, id))
        .await
        .or_not_found("Session not found")?;
    if !confirmed {
        return Ok(back_to_session(&session_id));
    }

    let store = state.workflow.store().clone();
    let (title, deleted) = run_blocking(move || {
        let title = store.get(id).ok().flatten().map(|record| record.title);
        (title, store.delete(id))
    })
    .await?;
    let title = title.unwrap_or_else(|| id.to_string());

    let result = session
        .with_session_mut(|s| {
            let result = Workflow::finish_delete(&mut s.workflow, id, deleted);
            if matches!(result, Ok(DeleteOutcome::Deleted { cleared_current: true })) {
                s.filename = None;
            }
            result
        })
        .await
        .or_not_found("Session not found")?;

    let (kind, message) = match result {
        Ok(DeleteOutcome::Deleted { .. }) => {
            (FlashKind::Success, format!("'{title}' 번역 기록이 삭제되었습니다."))
        }
        Ok(DeleteOutcome::NotFound | DeleteOutcome::ConfirmPending) => {
            (FlashKind::Error, "번역 기록 삭제에 실패했습니다.".to_string())
        }
        Err(e) => {
            error!("Failed to delete translation {}: {}", id, e);
            (FlashKind::Error, format!("번역 기록 삭제에 실패했습니다: {e}"))
        }
    };

    session.flash(kind, message).await;
    Ok(back_to_session(&session_id))
}

/// Withdraw a pending delete confirmation.
pub async fn cancel_delete(
    State(state): State<Arc<AppState>>,
    Path((session_id, id)): Path<(String, RecordId)>,
) -> RouteResult<Redirect> {
    let session = state
        .get_session(&session_id)
        .await
        .or_not_found("Session not found")?;

    session
        .with_session_mut(|s| Workflow::cancel_delete(&mut s.workflow, id))
        .await;

    Ok(back_to_session(&session_id))
}
