// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the game manager actor address and the shared document store.
//! Used to share state between HTTP/WebSocket handlers and the actor system.

use std::sync::Arc;

use actix::Addr;

use crate::server::game_session::server::GameManager;
use crate::store::DocumentStore;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the game manager actor (serializes lifecycle and moves).
    pub manager: Addr<GameManager>,
    /// Shared document store, also what WebSocket sessions subscribe to.
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(manager: Addr<GameManager>, store: Arc<dyn DocumentStore>) -> Self {
        AppState { manager, store }
    }
}
