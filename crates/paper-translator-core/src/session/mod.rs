//! Translation session state machine.
//!
//! A session moves between [`WorkflowPhase`]s in response to user events:
//! upload, translate, restore from history, start over and delete. The
//! [`Workflow`] applies those events to a caller-owned [`WorkflowState`].

mod state;
mod title;
mod workflow;

pub use state::{WorkflowPhase, WorkflowState};
pub use title::{derive_title, fallback_title};
pub use workflow::{
    DeleteOutcome, ExtractedUpload, RestoreOutcome, SavedTranslation, TranslationJob, Workflow,
};
