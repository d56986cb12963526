//! Helper types and traits for cleaner route handlers.
//!
//! Provides extension traits for converting `Option` and `Result` types
//! into HTTP-appropriate error responses, reducing boilerplate in routes.

use axum::http::StatusCode;
use axum::response::Redirect;
use paper_translator_core::Error;
use tracing::error;

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Extension trait for converting `Option<T>` to `RouteResult<T>`.
pub trait OptionExt<T> {
    /// Returns the contained value or a 404 Not Found error.
    fn or_not_found(self, msg: &str) -> RouteResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> RouteResult<T> {
        self.ok_or_else(|| (StatusCode::NOT_FOUND, msg.to_string()))
    }
}

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 500 Internal Server Error.
    fn or_internal_error(self) -> RouteResult<T>;

    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }

    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }
}

/// Run blocking work (SQLite, MuPDF) on the blocking thread pool.
///
/// Call this outside any session closure so no lock is held while it runs.
pub async fn run_blocking<F, R>(task: F) -> RouteResult<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        error!("Blocking task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Background task failed".to_string(),
        )
    })
}

/// User-facing flash text for a failed workflow event.
pub fn describe_error(err: &Error) -> String {
    if err.is_translation() {
        format!("번역 중 오류가 발생했습니다: {err}")
    } else if err.is_store() {
        format!("번역 기록 저장소 오류가 발생했습니다: {err}")
    } else {
        format!("오류가 발생했습니다: {err}")
    }
}

/// 303 See Other back to the session page (POST-Redirect-GET).
pub fn back_to_session(session_id: &str) -> Redirect {
    Redirect::to(&format!("/s/{session_id}"))
}

/// Whether an uploaded file looks like a PDF, by name or declared type.
pub fn is_pdf_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_name = file_name.is_some_and(|name| {
        std::path::Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    });
    let by_type = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
    by_name || by_type
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_upload() {
        assert!(is_pdf_upload(Some("paper.PDF"), None));
        assert!(is_pdf_upload(None, Some("application/pdf")));
        assert!(!is_pdf_upload(Some("notes.txt"), Some("text/plain")));
        assert!(!is_pdf_upload(None, None));
    }

    #[test]
    fn test_describe_error_by_family() {
        let msg = describe_error(&Error::TranslationTimeout);
        assert!(msg.starts_with("번역 중 오류가 발생했습니다"));

        let msg = describe_error(&Error::StoreTimestamp("bad".to_string()));
        assert!(msg.starts_with("번역 기록 저장소 오류"));

        let msg = describe_error(&Error::NothingToTranslate);
        assert!(msg.starts_with("오류가 발생했습니다"));
    }

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        assert_eq!(run_blocking(|| 2 + 2).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_run_blocking_reports_panics() {
        let (status, _) = run_blocking(|| -> u8 { panic!("boom") }).await.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_or_not_found() {
        let missing: Option<u8> = None;
        let (status, msg) = missing.or_not_found("Session not found").unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(msg, "Session not found");
    }
}
