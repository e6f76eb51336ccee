//! Main entry point for the backend server.
//!
//! Initializes the document store and the game manager actor, then launches
//! the HTTP server with the lobby endpoints and per-game WebSocket route.

use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};

use crate::game::service::GameService;
use crate::server::game_session::server::GameManager;
use crate::store::{DocumentStore, MemoryStore};

pub mod config;
mod auth;
mod game;
mod server;
mod store;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::init();

    // The shared document store every component reads and writes through.
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

    // Start the GameManager actor (serializes lifecycle and move handling).
    let manager = GameManager::new(GameService::new(store.clone())).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(manager, store));

    // Start the HTTP server with lobby and game endpoints.
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(config::server::BIND_ADDR)?
    .run()
    .await
}
