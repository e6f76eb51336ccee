/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Use these helpers to ensure all error payloads are consistent and carry
/// a machine-readable code alongside the human-readable message.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;

use crate::game::error::GameError;

/// Formats a WebSocket error message as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "GAME_FULL").
/// - `message`: Human-readable error message.
/// - `context`: Optional context (e.g. player_id, game_id).
pub fn ws_error_message(code: &str, message: &str, context: Option<&str>) -> String {
    json!({
        "action": "Error",
        "data": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    })
    .to_string()
}

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    });
    HttpResponse::build(status).json(body)
}

/// Map a game error to the HTTP response its variant calls for.
pub fn game_error_response(err: &GameError) -> HttpResponse {
    let status = match err {
        GameError::LevelNotFound(_) | GameError::GameNotFound => StatusCode::NOT_FOUND,
        GameError::GameAlreadyStarted | GameError::GameFull => StatusCode::CONFLICT,
        GameError::PlayerNotInGame => StatusCode::FORBIDDEN,
        GameError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    http_error_response(err.code(), &err.to_string(), None, status)
}
