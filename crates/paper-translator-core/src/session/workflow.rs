use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::WorkflowState;
use super::title::derive_title;
use crate::error::{Error, Result};
use crate::pdf::{PdfBuffer, TextExtractor};
use crate::store::{RecordId, TranslationRecord, TranslationStore, TranslationUpdate};
use crate::translator::Translator;

/// A PDF whose text has been extracted but not yet applied to a session.
#[derive(Debug, Clone)]
pub struct ExtractedUpload {
    pub buffer: PdfBuffer,
    pub text: String,
}

/// Everything a translate event needs, detached from the session state.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub original_text: String,
    pub pdf_bytes: Vec<u8>,
    /// Session generation the job was prepared under
    pub generation: u64,
}

/// Result of a translation that was saved to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTranslation {
    pub id: RecordId,
    pub title: String,
    pub translated_text: String,
    /// False when the session had no PDF bytes to store
    pub pdf_stored: bool,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Set when the stored PDF could not be loaded; the texts still are
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First request: the user must confirm
    ConfirmPending,
    /// The record was removed. `cleared_current` is set when it was the open one
    Deleted { cleared_current: bool },
    /// The record was already gone
    NotFound,
}

/// Drives one translation session through upload, translate, restore,
/// reset and delete events.
///
/// The workflow itself is stateless and cheap to clone; each event takes the
/// session's [`WorkflowState`] explicitly. Events either complete or leave
/// the state untouched.
#[derive(Clone)]
pub struct Workflow {
    extractor: Arc<dyn TextExtractor>,
    translator: Arc<dyn Translator>,
    store: TranslationStore,
}

impl Workflow {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        translator: Arc<dyn Translator>,
        store: TranslationStore,
    ) -> Self {
        Self {
            extractor,
            translator,
            store,
        }
    }

    pub const fn store(&self) -> &TranslationStore {
        &self.store
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    // ------------------------------------------------------------------
    // Upload
    // ------------------------------------------------------------------

    /// Extract the text of an uploaded PDF. Touches no session state.
    pub fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedUpload> {
        let mut buffer = PdfBuffer::new(bytes);
        let contents = buffer.read_all()?;
        let text = self.extractor.extract(&contents)?;
        debug!(
            "Extracted upload: {} bytes, {} chars of text",
            buffer.len(),
            text.len()
        );
        Ok(ExtractedUpload { buffer, text })
    }

    /// Apply a successful extraction. A new document starts a new session,
    /// so any previous translation is dropped.
    pub fn commit_upload(state: &mut WorkflowState, upload: ExtractedUpload) {
        state.original_text = upload.text;
        state.uploaded_file = Some(upload.buffer);
        state.pdf_uploaded = true;
        state.is_loading_from_db = false;
        state.translated_text.clear();
        state.current_translation_id = None;
        state.advance();
        info!("Uploaded PDF, {} chars extracted", state.original_text.len());
    }

    pub fn upload(&self, state: &mut WorkflowState, bytes: Vec<u8>) -> Result<()> {
        let upload = self.extract(bytes)?;
        Self::commit_upload(state, upload);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Translate
    // ------------------------------------------------------------------

    /// Snapshot what a translation needs. The PDF buffer is read in full and
    /// rewound.
    pub fn prepare_translation(state: &mut WorkflowState) -> Result<TranslationJob> {
        if !state.can_translate() {
            return Err(Error::NothingToTranslate);
        }

        let pdf_bytes = match state.uploaded_file.as_mut() {
            Some(buffer) => buffer.read_all()?,
            None => Vec::new(),
        };

        Ok(TranslationJob {
            original_text: state.original_text.clone(),
            pdf_bytes,
            generation: state.generation(),
        })
    }

    /// Translate the job's text, derive a title and save the record.
    pub async fn run(&self, job: TranslationJob) -> Result<SavedTranslation> {
        let translated_text = self.translate_job(&job).await?;
        self.save_translation(&job, translated_text)
    }

    /// The network half of [`Workflow::run`].
    pub async fn translate_job(&self, job: &TranslationJob) -> Result<String> {
        info!(
            "Translating {} chars with {}",
            job.original_text.len(),
            self.translator.name()
        );
        self.translator.translate(&job.original_text).await
    }

    /// The store half of [`Workflow::run`]. Blocks on SQLite.
    pub fn save_translation(
        &self,
        job: &TranslationJob,
        translated_text: String,
    ) -> Result<SavedTranslation> {
        let title = derive_title(&translated_text, Local::now().naive_local());

        let pdf_stored = !job.pdf_bytes.is_empty();
        if !pdf_stored {
            warn!("No PDF bytes in session, saving translation without the original file");
        }
        let pdf_bytes = pdf_stored.then_some(job.pdf_bytes.as_slice());

        let id = self
            .store
            .save(&title, &job.original_text, &translated_text, pdf_bytes)?;
        info!("Saved translation {} as {:?}", id, title);

        Ok(SavedTranslation {
            id,
            title,
            translated_text,
            pdf_stored,
            generation: job.generation,
        })
    }

    /// Show a saved translation in the session it was prepared from.
    ///
    /// Returns `false` and leaves the state untouched when the session moved
    /// on to other content while the translation ran. The record stays in
    /// the store either way.
    pub fn commit_translation(state: &mut WorkflowState, saved: &SavedTranslation) -> bool {
        if state.generation() != saved.generation {
            warn!(
                "Session changed while translating, translation {} kept in history only",
                saved.id
            );
            return false;
        }

        state.translated_text.clone_from(&saved.translated_text);
        state.current_translation_id = Some(saved.id);
        state.is_loading_from_db = false;
        state.advance();
        true
    }

    pub async fn translate(&self, state: &mut WorkflowState) -> Result<SavedTranslation> {
        let job = Self::prepare_translation(state)?;
        let saved = self.run(job).await?;
        Self::commit_translation(state, &saved);
        Ok(saved)
    }

    // ------------------------------------------------------------------
    // Restore
    // ------------------------------------------------------------------

    /// Load a saved record into the session.
    pub fn restore(state: &mut WorkflowState, record: &TranslationRecord) -> RestoreOutcome {
        state.original_text.clone_from(&record.original_text);
        state.translated_text.clone_from(&record.translated_text);
        state.current_translation_id = Some(record.id);
        state.is_loading_from_db = true;
        state.advance();

        let mut outcome = RestoreOutcome::default();
        state.uploaded_file = None;
        state.pdf_uploaded = false;

        match record.decode_pdf() {
            Ok(Some(bytes)) if !bytes.is_empty() => {
                state.uploaded_file = Some(PdfBuffer::new(bytes));
                state.pdf_uploaded = true;
            }
            Ok(Some(_)) => {
                warn!("Stored PDF for translation {} is empty", record.id);
                outcome.warning = Some("stored PDF is empty".to_string());
            }
            Ok(None) => {
                debug!("Translation {} has no stored PDF", record.id);
            }
            Err(e) => {
                warn!("Could not load stored PDF for translation {}: {}", record.id, e);
                outcome.warning = Some(e.to_string());
            }
        }

        info!("Restored translation {} ({:?})", record.id, record.title);
        outcome
    }

    /// Look up a record and restore it. `None` when the id is unknown.
    pub fn restore_by_id(
        &self,
        state: &mut WorkflowState,
        id: RecordId,
    ) -> Result<Option<RestoreOutcome>> {
        let Some(record) = self.store.get(id)? else {
            warn!("Translation {} not found", id);
            return Ok(None);
        };
        Ok(Some(Self::restore(state, &record)))
    }

    pub fn new_translation(state: &mut WorkflowState) {
        state.reset();
        debug!("Started a new translation");
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Two-step delete: the first request for an id only marks it, the
    /// second removes the record.
    pub fn request_delete(&self, state: &mut WorkflowState, id: RecordId) -> Result<DeleteOutcome> {
        if !Self::begin_delete(state, id) {
            return Ok(DeleteOutcome::ConfirmPending);
        }
        let deleted = self.store.delete(id);
        Self::finish_delete(state, id, deleted)
    }

    /// First half of [`Workflow::request_delete`]. Marks `id` and returns
    /// `false` on the first request; returns `true` once it is confirmed and
    /// the record should be removed from the store.
    pub fn begin_delete(state: &mut WorkflowState, id: RecordId) -> bool {
        if state.is_confirming_delete(id) {
            return true;
        }
        state.confirm_delete.insert(id, true);
        debug!("Delete of translation {} awaiting confirmation", id);
        false
    }

    /// Second half of [`Workflow::request_delete`]: apply the store's answer.
    /// A store error keeps the confirmation so the delete can be retried.
    pub fn finish_delete(
        state: &mut WorkflowState,
        id: RecordId,
        deleted: Result<bool>,
    ) -> Result<DeleteOutcome> {
        let deleted = deleted?;
        state.confirm_delete.remove(&id);

        if !deleted {
            warn!("Translation {} was already deleted", id);
            return Ok(DeleteOutcome::NotFound);
        }

        let cleared_current = state.current_translation_id == Some(id);
        if cleared_current {
            let pending = std::mem::take(&mut state.confirm_delete);
            state.reset();
            state.confirm_delete = pending;
        }

        info!("Deleted translation {}", id);
        Ok(DeleteOutcome::Deleted { cleared_current })
    }

    pub fn cancel_delete(state: &mut WorkflowState, id: RecordId) {
        state.confirm_delete.remove(&id);
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn history(&self) -> Result<Vec<TranslationRecord>> {
        self.store.list_all()
    }

    /// Change a record's title. Blank titles are rejected.
    pub fn rename(&self, id: RecordId, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            warn!("Refusing to rename translation {} to a blank title", id);
            return Ok(false);
        }
        self.store.update(id, &TranslationUpdate::title(title))
    }
}
