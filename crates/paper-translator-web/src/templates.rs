//! Askama templates.
//!
//! - `base.html` - Common layout with CSS/JS
//! - `app.html` - Two-pane page: original PDF or text on the left, the
//!   translation on the right, history in the sidebar
//!
//! Markdown is rendered in the browser from the escaped source text.

use askama::Template;
use askama_web::WebTemplate;
use paper_translator_core::{RecordId, TranslationRecord};

use crate::state::{Flash, Session};

/// Sidebar titles longer than this are cut and get an ellipsis.
const SIDEBAR_TITLE_CHARS: usize = 25;

pub fn display_title(title: &str) -> String {
    if title.chars().count() > SIDEBAR_TITLE_CHARS {
        let cut: String = title.chars().take(SIDEBAR_TITLE_CHARS).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

/// Which rendering of the original is shown in the left pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginalView {
    #[default]
    Pdf,
    Text,
}

impl OriginalView {
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("text") => Self::Text,
            _ => Self::Pdf,
        }
    }
}

pub struct FlashView {
    pub class: &'static str,
    pub message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            class: flash.kind.css_class(),
            message: flash.message,
        }
    }
}

/// One entry of the history sidebar.
pub struct HistoryItem {
    pub id: RecordId,
    pub title: String,
    pub full_title: String,
    pub created_at: String,
    pub is_current: bool,
    pub confirming_delete: bool,
}

/// Main app page.
#[derive(Template, WebTemplate)]
#[template(path = "app.html")]
pub struct AppTemplate {
    pub session_id: String,
    pub filename: Option<String>,
    pub original_text: String,
    pub translated_text: String,
    /// A PDF is available for the viewer
    pub has_pdf: bool,
    /// Show the PDF viewer rather than the extracted text
    pub show_pdf: bool,
    pub can_translate: bool,
    /// Session was loaded from history
    pub is_restored: bool,
    pub translator_name: &'static str,
    pub translator_available: bool,
    pub history: Vec<HistoryItem>,
    pub flash: Vec<FlashView>,
}

impl AppTemplate {
    /// Build the page from a session, consuming its pending flash messages.
    pub fn render_session(
        session_id: String,
        session: &mut Session,
        records: &[TranslationRecord],
        view: OriginalView,
        translator_name: &'static str,
        translator_available: bool,
    ) -> Self {
        let flash = session.take_flash().into_iter().map(FlashView::from).collect();
        let state = &session.workflow;
        let has_pdf = state.pdf_uploaded && state.uploaded_file.is_some();

        let history = records
            .iter()
            .map(|record| HistoryItem {
                id: record.id,
                title: display_title(&record.title),
                full_title: record.title.clone(),
                created_at: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                is_current: state.current_translation_id == Some(record.id),
                confirming_delete: state.is_confirming_delete(record.id),
            })
            .collect();

        Self {
            session_id,
            filename: session.filename.clone(),
            original_text: state.original_text.clone(),
            translated_text: state.translated_text.clone(),
            has_pdf,
            show_pdf: has_pdf && view == OriginalView::Pdf,
            can_translate: state.can_translate(),
            is_restored: state.is_loading_from_db,
            translator_name,
            translator_available,
            history,
            flash,
        }
    }

    pub fn has_translation(&self) -> bool {
        !self.translated_text.is_empty()
    }

    pub fn has_original(&self) -> bool {
        !self.original_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_truncates_long_titles() {
        let title = "Attention Is All You Need: Transformers Revisited";
        assert_eq!(display_title(title), "Attention Is All You Need...");
    }

    #[test]
    fn test_display_title_counts_characters() {
        let title = "가".repeat(25);
        assert_eq!(display_title(&title), title);

        let longer = "가".repeat(26);
        assert_eq!(display_title(&longer), format!("{}...", "가".repeat(25)));
    }

    #[test]
    fn test_original_view_from_query() {
        assert_eq!(OriginalView::from_query(Some("text")), OriginalView::Text);
        assert_eq!(OriginalView::from_query(Some("pdf")), OriginalView::Pdf);
        assert_eq!(OriginalView::from_query(None), OriginalView::Pdf);
    }
}
