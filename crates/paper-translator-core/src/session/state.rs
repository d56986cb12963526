use std::collections::HashMap;

use crate::pdf::PdfBuffer;
use crate::store::RecordId;

/// Coarse view of a [`WorkflowState`], derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    /// Nothing uploaded, nothing restored
    Empty,
    /// A PDF was uploaded and its text extracted
    Extracted,
    /// The extracted text was translated and saved
    Translated,
    /// A saved record was loaded from history
    Restored,
}

/// Per-user state of one translation session. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub original_text: String,
    pub translated_text: String,
    pub uploaded_file: Option<PdfBuffer>,
    pub pdf_uploaded: bool,
    pub current_translation_id: Option<RecordId>,
    pub is_loading_from_db: bool,
    /// Records with a pending delete confirmation
    pub confirm_delete: HashMap<RecordId, bool>,
    /// Bumped whenever the session switches to different content. A commit
    /// prepared under an older generation is dropped.
    generation: u64,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WorkflowPhase {
        if self.is_loading_from_db && self.current_translation_id.is_some() {
            WorkflowPhase::Restored
        } else if self.current_translation_id.is_some() && !self.translated_text.is_empty() {
            WorkflowPhase::Translated
        } else if self.pdf_uploaded {
            WorkflowPhase::Extracted
        } else {
            WorkflowPhase::Empty
        }
    }

    /// Whether a translate event would be accepted.
    pub fn can_translate(&self) -> bool {
        self.pdf_uploaded && !self.original_text.is_empty()
    }

    pub fn is_confirming_delete(&self, id: RecordId) -> bool {
        self.confirm_delete.get(&id).copied().unwrap_or(false)
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) const fn advance(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop everything, pending delete confirmations included.
    pub fn reset(&mut self) {
        let generation = self.generation;
        *self = Self::default();
        self.generation = generation;
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = WorkflowState::new();
        assert_eq!(state.phase(), WorkflowPhase::Empty);
        assert!(!state.can_translate());
        assert!(state.uploaded_file.is_none());
    }

    #[test]
    fn test_phase_follows_fields() {
        let mut state = WorkflowState::new();
        state.pdf_uploaded = true;
        state.original_text = "Hello.".into();
        assert_eq!(state.phase(), WorkflowPhase::Extracted);
        assert!(state.can_translate());

        state.translated_text = "안녕하세요.".into();
        state.current_translation_id = Some(RecordId(1));
        assert_eq!(state.phase(), WorkflowPhase::Translated);

        state.is_loading_from_db = true;
        assert_eq!(state.phase(), WorkflowPhase::Restored);
    }

    #[test]
    fn test_reset_clears_confirmations() {
        let mut state = WorkflowState::new();
        state.confirm_delete.insert(RecordId(3), true);
        state.current_translation_id = Some(RecordId(3));
        assert!(state.is_confirming_delete(RecordId(3)));

        state.reset();
        assert!(state.confirm_delete.is_empty());
        assert!(state.current_translation_id.is_none());
    }

    #[test]
    fn test_reset_moves_to_a_new_generation() {
        let mut state = WorkflowState::new();
        let before = state.generation();

        state.reset();
        assert_ne!(state.generation(), before);
    }
}
