//! Page routes - full HTML page renders.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;
use tracing::{error, info};

use super::ViewQuery;
use crate::helpers::{OptionExt, RouteResult, run_blocking};
use crate::state::{AppState, FlashKind};
use crate::templates::{AppTemplate, OriginalView};

/// Start a fresh session and send the browser to it.
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    let session_id = state.create_session().await;
    info!("Created session {}", session_id);
    Redirect::to(&format!("/s/{session_id}"))
}

/// The two-pane app page. Unknown or expired sessions start over.
pub async fn view_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> RouteResult<Response> {
    let Some(session) = state.get_session(&session_id).await else {
        return Ok(Redirect::to("/").into_response());
    };

    let workflow = state.workflow.clone();
    let records = match run_blocking(move || workflow.history()).await? {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to list translations: {}", e);
            session
                .flash(FlashKind::Error, format!("번역 기록을 불러오지 못했습니다: {e}"))
                .await;
            Vec::new()
        }
    };

    let translator = state.workflow.translator();
    let translator_name = translator.name();
    let translator_available = translator.is_available();
    let view = OriginalView::from_query(query.view.as_deref());

    let template = session
        .with_session_mut(|s| {
            AppTemplate::render_session(
                session_id.clone(),
                s,
                &records,
                view,
                translator_name,
                translator_available,
            )
        })
        .await
        .or_not_found("Session not found")?;

    Ok(template.into_response())
}
