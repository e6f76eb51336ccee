//! HTTP lobby endpoints.
//!
//! Everything before a game goes live happens here: creating a profile,
//! creating a game, joining by code. Active play runs over the WebSocket
//! endpoint in `game_session::session`.

use actix_web::{web, HttpResponse, http::StatusCode};
use log::error;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::ProfileService;
use crate::game::state::derive_game_code;
use crate::server::game_session::server::{CreateGame, JoinGame};
use crate::server::state::AppState;
use crate::server::ws_error::{game_error_response, http_error_response};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub creator_uid: Uuid,
    pub email: String,
    #[serde(default = "default_level")]
    pub level_number: u32,
}

fn default_level() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub code: String,
    pub player_uid: Uuid,
    pub email: String,
}

pub async fn create_user(
    data: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> HttpResponse {
    let profiles = ProfileService::new(data.store.clone());
    match profiles.create_profile(&body.email, &body.display_name) {
        Ok(profile) => HttpResponse::Created().json(profile),
        Err(err) => {
            error!("[Http] Failed to create profile: {}", err);
            http_error_response(
                "STORE_ERROR",
                "Failed to create profile",
                None,
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

pub async fn create_game(
    data: web::Data<AppState>,
    body: web::Json<CreateGameRequest>,
) -> HttpResponse {
    let msg = CreateGame {
        creator_uid: body.creator_uid,
        email: body.email.clone(),
        level_number: body.level_number,
    };
    match data.manager.send(msg).await {
        Ok(Ok(game_id)) => HttpResponse::Created().json(json!({
            "gameId": game_id,
            "gameCode": derive_game_code(&game_id),
        })),
        Ok(Err(err)) => game_error_response(&err),
        Err(err) => {
            error!("[Http] Game manager unavailable: {}", err);
            http_error_response(
                "INTERNAL",
                "Game manager unavailable",
                None,
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

pub async fn join_game(
    data: web::Data<AppState>,
    body: web::Json<JoinGameRequest>,
) -> HttpResponse {
    let msg = JoinGame {
        code_or_id: body.code.clone(),
        player_uid: body.player_uid,
        email: body.email.clone(),
    };
    match data.manager.send(msg).await {
        Ok(Ok(game_id)) => HttpResponse::Ok().json(json!({ "gameId": game_id })),
        Ok(Err(err)) => game_error_response(&err),
        Err(err) => {
            error!("[Http] Game manager unavailable: {}", err);
            http_error_response(
                "INTERNAL",
                "Game manager unavailable",
                None,
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

/// Current game document, straight from the store.
pub async fn get_game(data: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    let game_id = path.into_inner();
    match data.store.get(&format!("games/{game_id}")) {
        Ok(Some(doc)) => HttpResponse::Ok().json(doc),
        Ok(None) => http_error_response(
            "GAME_NOT_FOUND",
            "game not found",
            Some(&game_id.to_string()),
            StatusCode::NOT_FOUND,
        ),
        Err(err) => {
            error!("[Http] Store read failed: {}", err);
            http_error_response(
                "STORE_ERROR",
                "Store read failed",
                None,
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}
