use crate::llm_client::BackendPair;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Primary/secondary text backends; calls alternate between them.
    pub backends: BackendPair,
    pub sessions: SessionStore,
}
