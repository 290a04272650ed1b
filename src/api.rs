//! HTTP API and embedded chat UI

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::crew::CrewService;
use crate::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live sessions by ID. Each session is behind its own mutex so one
    /// message is processed to completion before the next is accepted.
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
    crew: Arc<dyn CrewService>,
}

impl AppState {
    pub fn new(crew: Arc<dyn CrewService>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            crew,
        }
    }

    /// Create and register a new session, returning a handle to it
    pub async fn create_session(&self, id: String, slug: String) -> Arc<Mutex<Session>> {
        let session = Arc::new(Mutex::new(Session::new(id.clone(), slug, self.crew.clone())));
        self.sessions.write().await.insert(id, session.clone());
        session
    }

    /// Look up a session by ID
    pub async fn session(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(id).cloned()
    }
}
