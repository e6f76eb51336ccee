//! HTTP and WebSocket routing configuration.
//!
//! Lobby operations (profiles, create, join, lookup) are plain HTTP; each
//! active game connection is handled by a dedicated WebSocket actor.

use actix_web::web;

use crate::server::game_session::session::ws_game;
use crate::server::http::{create_game, create_user, get_game, join_game};

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/users").route(web::post().to(create_user)))
        .service(web::resource("/api/games").route(web::post().to(create_game)))
        .service(web::resource("/api/games/join").route(web::post().to(join_game)))
        .service(web::resource("/api/games/{game_id}").route(web::get().to(get_game)))
        .service(web::resource("/ws/game/{game_id}").to(ws_game));
}
