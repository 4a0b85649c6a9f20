//! Per-user session state: the caller-owned object the orchestrator and
//! reviser mutate, plus the in-memory store that hands sessions out.
//!
//! Each session sits behind its own async mutex, so actions on one session
//! run one at a time while different sessions proceed independently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::document::{FeedbackRecord, ProjectContext, ProjectMetadata, SectionContent};
use crate::render::OUTPUT_FILE_NAME;

#[derive(Debug, Clone)]
pub struct DocumentSession {
    pub id: Uuid,
    pub metadata: Option<ProjectMetadata>,
    pub context: Option<ProjectContext>,
    pub sections: SectionContent,
    pub feedback: Vec<FeedbackRecord>,
    /// True once a full run has completed and the document exists on disk.
    pub has_generated: bool,
    pub output_path: PathBuf,
}

impl DocumentSession {
    /// New empty session writing to `<output_dir>/<id>/project_documentation.docx`.
    pub fn new(id: Uuid, output_dir: &Path) -> Self {
        Self {
            id,
            metadata: None,
            context: None,
            sections: SectionContent::new(),
            feedback: Vec::new(),
            has_generated: false,
            output_path: output_dir.join(id.to_string()).join(OUTPUT_FILE_NAME),
        }
    }
}

pub type SharedSession = Arc<Mutex<DocumentSession>>;

#[derive(Clone)]
pub struct SessionStore {
    output_dir: PathBuf,
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(DocumentSession::new(id, &self.output_dir)));
        self.sessions.write().await.insert(id, session.clone());
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Detaches the session from the store. Callers holding a clone keep it
    /// alive until they finish.
    pub async fn remove(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_session() {
        let store = SessionStore::new("out");
        let (id, _) = store.create().await;
        let session = store.get(id).await.expect("session exists");
        let session = session.lock().await;
        assert_eq!(session.id, id);
        assert!(!session.has_generated);
        assert!(session.sections.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_detaches_session() {
        let store = SessionStore::new("out");
        let (id, _) = store.create().await;
        assert!(store.remove(id).await.is_some());
        assert!(store.get(id).await.is_none());
        assert!(store.remove(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let store = SessionStore::new("out");
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[test]
    fn test_each_session_has_its_own_output_path() {
        let a = DocumentSession::new(Uuid::new_v4(), Path::new("out"));
        let b = DocumentSession::new(Uuid::new_v4(), Path::new("out"));
        assert_ne!(a.output_path, b.output_path);
        assert!(a.output_path.ends_with(OUTPUT_FILE_NAME));
        assert!(a.output_path.starts_with("out"));
    }
}
