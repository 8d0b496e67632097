//! Application state for the FormFill API
//!
//! Collaborator adapters are constructed once at startup and shared by
//! reference; sessions live in an in-memory table keyed by uuid. Each
//! session carries its own mutex so independent sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;

use formfill_engine::{
    DocumentRenderer, InferenceClient, RenderedDocument, SessionEngine, StructureInferencer,
    Translator,
};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One live session plus its rendered artifact, if generated
pub struct SessionEntry {
    pub engine: SessionEngine,
    pub artifact: Option<RenderedDocument>,
}

/// Shared application state
pub struct AppState {
    pub inferencer: StructureInferencer,
    pub translator: Arc<dyn Translator>,
    pub renderer: Arc<dyn DocumentRenderer>,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionEntry>>>>,
}

impl AppState {
    pub fn new(
        inference: Arc<dyn InferenceClient>,
        translator: Arc<dyn Translator>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            inferencer: StructureInferencer::new(inference),
            translator,
            renderer,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert_session(&self, engine: SessionEngine) -> Uuid {
        let id = Uuid::new_v4();
        let entry = Arc::new(Mutex::new(SessionEntry {
            engine,
            artifact: None,
        }));
        self.sessions.write().await.insert(id, entry);
        id
    }

    pub async fn session(&self, id: &Uuid) -> Option<Arc<Mutex<SessionEntry>>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn remove_session(&self, id: &Uuid) -> Option<Arc<Mutex<SessionEntry>>> {
        self.sessions.write().await.remove(id)
    }
}
