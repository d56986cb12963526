//! Paper Translator Core Library
//!
//! Core functionality for translating English research papers into Korean:
//! - PDF text extraction
//! - Translation via the Gemini or OpenAI-compatible APIs
//! - A SQLite history of translation sessions
//! - The session workflow tying these together
//! - Markdown exports

pub mod config;
pub mod error;
pub mod export;
pub mod pdf;
pub mod session;
pub mod store;
pub mod translator;
pub mod util;

pub use config::{AppConfig, Provider, StoreConfig, TranslatorConfig};
pub use error::{Error, Result};
pub use export::ExportKind;
pub use pdf::{MupdfExtractor, PdfBuffer, TextExtractor};
pub use session::{
    DeleteOutcome, RestoreOutcome, SavedTranslation, Workflow, WorkflowPhase, WorkflowState,
};
pub use store::{RecordId, TranslationRecord, TranslationStore, TranslationUpdate};
pub use translator::{Translator, create_translator};

use std::sync::Arc;
use tracing::info;

/// Build a workflow from configuration: MuPDF extraction, the configured
/// translator and the store at the configured path.
pub fn workflow_from_config(config: &AppConfig) -> Result<Workflow> {
    let translator = create_translator(&config.translator)?;
    let store = TranslationStore::open(config.store.path())?;

    info!(
        "Using {} translator ({}), store at {} with {} saved translations",
        translator.name(),
        config.translator.model(),
        store.path().display(),
        store.count()?
    );

    Ok(Workflow::new(
        Arc::new(MupdfExtractor::new()),
        translator,
        store,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.translator.provider, Provider::Gemini);
        assert_eq!(config.translator.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_workflow_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.store.path = Some(dir.path().join("history.db"));
        config.translator.api_key = Some("test-key".into());

        let workflow = workflow_from_config(&config).unwrap();
        assert!(workflow.translator().is_available());
        assert!(workflow.translator().info().requires_api_key);
        assert!(workflow.history().unwrap().is_empty());
    }
}
