use paper_translator_core::{Workflow, WorkflowState};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Severity of a one-shot message shown after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashKind {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Warning => "flash-warning",
            Self::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// One browser session: the translation workflow state plus UI leftovers.
pub struct Session {
    pub workflow: WorkflowState,
    /// Name of the uploaded file, for display only
    pub filename: Option<String>,
    /// Messages to show on the next page render
    pub flash: Vec<Flash>,
    pub last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            workflow: WorkflowState::new(),
            filename: None,
            flash: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    pub fn flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.flash.push(Flash {
            kind,
            message: message.into(),
        });
    }

    pub fn take_flash(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flash)
    }
}

/// Global application state
pub struct AppState {
    /// Active sessions indexed by UUID
    sessions: RwLock<HashMap<Uuid, Session>>,
    /// Shared workflow: extractor, translator and the history store
    pub workflow: Workflow,
}

impl AppState {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            workflow,
        }
    }

    /// Create an empty session and return its ID (for URL embedding).
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, Session::new());
        id.to_string()
    }

    /// Get a session by ID string and mark it as seen.
    ///
    /// Returns `None` if the ID is not a valid UUID or session doesn't exist.
    pub async fn get_session(&self, id: &str) -> Option<SessionRef<'_>> {
        let uuid = Uuid::parse_str(id).ok()?;
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&uuid)?;
        session.last_seen = Instant::now();
        Some(SessionRef {
            id: uuid,
            state: self,
        })
    }

    /// Drop sessions not seen for longer than `max_idle`. Returns how many
    /// were removed.
    pub async fn cleanup_old_sessions(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();

        sessions.retain(|_, session| now.duration_since(session.last_seen) < max_idle);

        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// A borrowed reference to a session.
///
/// Locks are only taken inside the synchronous closures passed to
/// [`SessionRef::with_session`] and [`SessionRef::with_session_mut`], so no
/// guard is ever held across an `.await`.
pub struct SessionRef<'a> {
    id: Uuid,
    state: &'a AppState,
}

impl SessionRef<'_> {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// Access session data immutably within a closure.
    pub async fn with_session<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Session) -> R,
    {
        let sessions = self.state.sessions.read().await;
        sessions.get(&self.id).map(f)
    }

    /// Access session data mutably within a closure.
    pub async fn with_session_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.state.sessions.write().await;
        sessions.get_mut(&self.id).map(f)
    }

    pub async fn flash(&self, kind: FlashKind, message: impl Into<String>) {
        let message = message.into();
        self.with_session_mut(|s| s.flash(kind, message)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use paper_translator_core::{
        MupdfExtractor, TranslationStore, TranslatorConfig, create_translator,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    fn app_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let store = TranslationStore::open(dir.path().join("t.db")).unwrap();
        let translator = create_translator(&TranslatorConfig::default()).unwrap();
        let workflow = Workflow::new(Arc::new(MupdfExtractor::new()), translator, store);
        (dir, AppState::new(workflow))
    }

    #[tokio::test]
    async fn test_session_lookup() {
        let (_dir, state) = app_state();
        let id = state.create_session().await;

        assert!(state.get_session(&id).await.is_some());
        assert!(state.get_session("not-a-uuid").await.is_none());
        assert!(state.get_session(&Uuid::new_v4().to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let (_dir, state) = app_state();
        let id = state.create_session().await;
        let session = state.get_session(&id).await.unwrap();

        session.flash(FlashKind::Success, "번역 완료!").await;
        let first = session.with_session_mut(Session::take_flash).await.unwrap();
        let second = session.with_session_mut(Session::take_flash).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].message, "번역 완료!");
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_sessions() {
        let (_dir, state) = app_state();
        state.create_session().await;
        state.create_session().await;

        assert_eq!(state.cleanup_old_sessions(Duration::from_secs(3600)).await, 0);
        assert_eq!(state.session_count().await, 2);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(state.cleanup_old_sessions(Duration::from_millis(1)).await, 2);
        assert_eq!(state.session_count().await, 0);
    }
}
