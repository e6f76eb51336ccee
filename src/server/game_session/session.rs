/// WebSocket session handler for one connected player.
///
/// The session subscribes to its game's document and pushes every change to
/// the client; intents flow the other way, through the game manager. The
/// session never mutates state itself and keeps no writable copy of it:
/// its only local state is the synchronized view used for creator checks.
use std::borrow::Cow;
use std::sync::Arc;

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse, error, http::StatusCode};
use actix_web_actors::ws;
use log::info;
use serde_json::Value;
use uuid::Uuid;

use crate::game::state::GameState;
use crate::game::types::Direction;
use crate::server::game_session::messages::{ClientAction, ServerWsMessage};
use crate::server::game_session::server::{
    GameManager, IsPlayerInGame, LeaveGame, PlayerMove, RegisterSession, RestartLevel,
    StartGame, UnregisterSession,
};
use crate::server::state::AppState;
use crate::server::ws_error::{http_error_response, ws_error_message};
use crate::store::{DocumentStore, Subscription, SyncedView};

pub struct GameSocketSession {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub email: String,
    manager: Addr<GameManager>,
    store: Arc<dyn DocumentStore>,
    view: Option<SyncedView<GameState>>,
    subscription: Option<Subscription>,
}

/// Store notification for the subscribed game document.
#[derive(Message)]
#[rtype(result = "()")]
struct DocumentChanged(Option<Value>);

impl GameSocketSession {
    pub fn new(
        game_id: Uuid,
        player_id: Uuid,
        email: String,
        manager: Addr<GameManager>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            game_id,
            player_id,
            email,
            manager,
            store,
            view: None,
            subscription: None,
        }
    }

    fn is_creator(&self) -> bool {
        self.view
            .as_ref()
            .and_then(|view| view.get())
            .map(|state| state.creator_uid == self.player_id)
            .unwrap_or(false)
    }

    fn send_move(&mut self, direction: Direction, ctx: &mut ws::WebsocketContext<Self>) {
        let intent = PlayerMove {
            game_id: self.game_id,
            player_id: self.player_id,
            direction,
        };
        // wait() holds the session until the move is acknowledged, so a
        // fast double key press cannot race a stale snapshot.
        self.manager
            .send(intent)
            .into_actor(self)
            .then(|res, _act, ctx| {
                let reply = match res {
                    Ok(Ok(outcome)) => ServerWsMessage::Moved { outcome },
                    Ok(Err(err)) => ServerWsMessage::Error {
                        code: err.code().to_string(),
                        message: err.to_string(),
                    },
                    Err(_) => ServerWsMessage::Error {
                        code: "INTERNAL".to_string(),
                        message: "Game manager unavailable".to_string(),
                    },
                };
                match serde_json::to_string(&reply) {
                    Ok(text) => ctx.text(text),
                    Err(_) => ctx.text(ws_error_message(
                        "INTERNAL",
                        "Failed to serialize outcome",
                        None,
                    )),
                }
                actix::fut::ready(())
            })
            .wait(ctx);
    }
}

impl Actor for GameSocketSession {
    type Context = ws::WebsocketContext<Self>;

    /// Register with the manager and start watching the game document.
    fn started(&mut self, ctx: &mut Self::Context) {
        let path = format!("games/{}", self.game_id);
        let addr = ctx.address();
        self.subscription = Some(self.store.subscribe(
            &path,
            Box::new(move |doc| {
                addr.do_send(DocumentChanged(doc));
            }),
        ));
        self.view = Some(SyncedView::new(self.store.as_ref(), &path));
        self.manager.do_send(RegisterSession {
            game_id: self.game_id,
            player_id: self.player_id,
            addr: ctx.address(),
        });
        info!(
            "[GameSocket] {} ({}) connected to game {}",
            self.player_id, self.email, self.game_id
        );
    }

    /// Dropping the connection also leaves the game.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.manager.do_send(UnregisterSession {
            game_id: self.game_id,
            player_id: self.player_id,
        });
        self.manager.do_send(LeaveGame {
            game_id: self.game_id,
            player_id: self.player_id,
        });
        info!(
            "[GameSocket] {} disconnected from game {}",
            self.player_id, self.game_id
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GameSocketSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientAction>(&text) {
                Ok(ClientAction::Move { direction }) => self.send_move(direction, ctx),
                Ok(ClientAction::Start) => {
                    if !self.is_creator() {
                        ctx.text(ws_error_message(
                            "NOT_CREATOR",
                            "Only the creator can start the game",
                            None,
                        ));
                        return;
                    }
                    self.manager
                        .send(StartGame { game_id: self.game_id })
                        .into_actor(self)
                        .then(|res, _act, ctx| {
                            if let Ok(Err(err)) = res {
                                ctx.text(ws_error_message(err.code(), &err.to_string(), None));
                            }
                            actix::fut::ready(())
                        })
                        .wait(ctx);
                }
                Ok(ClientAction::Restart) => {
                    if !self.is_creator() {
                        ctx.text(ws_error_message(
                            "NOT_CREATOR",
                            "Only the creator can restart the level",
                            None,
                        ));
                        return;
                    }
                    self.manager
                        .send(RestartLevel { game_id: self.game_id })
                        .into_actor(self)
                        .then(|res, _act, ctx| {
                            if let Ok(Err(err)) = res {
                                ctx.text(ws_error_message(err.code(), &err.to_string(), None));
                            }
                            actix::fut::ready(())
                        })
                        .wait(ctx);
                }
                Ok(ClientAction::Leave) => {
                    ctx.close(None);
                    ctx.stop();
                }
                Ok(ClientAction::Ping) => {
                    // Keepalive; nothing to do.
                }
                Err(_) => {
                    ctx.text(ws_error_message(
                        "INVALID_ACTION",
                        "Invalid client message",
                        None,
                    ));
                }
            },
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(_)) => ctx.stop(),
            _ => (),
        }
    }
}

impl Handler<ServerWsMessage> for GameSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(_) => {
                ctx.text(ws_error_message("INTERNAL", "Failed to serialize message", None));
            }
        }
    }
}

impl Handler<DocumentChanged> for GameSocketSession {
    type Result = ();

    fn handle(&mut self, msg: DocumentChanged, ctx: &mut Self::Context) {
        let message = match msg.0 {
            Some(game) => ServerWsMessage::State { game },
            None => ServerWsMessage::GameDeleted,
        };
        match serde_json::to_string(&message) {
            Ok(text) => ctx.text(text),
            Err(_) => {
                ctx.text(ws_error_message("INTERNAL", "Failed to serialize game state", None));
            }
        }
    }
}

/// WebSocket endpoint for an active game.
///
/// Expects query parameters: `player_id` (required, must already be in the
/// game) and `email` (optional, display identity for logs).
pub async fn ws_game(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let game_id = req.match_info().get("game_id").unwrap_or_default();
    let game_id = Uuid::parse_str(game_id).map_err(error::ErrorBadRequest)?;

    let mut player_id: Option<Uuid> = None;
    let mut email = String::new();
    for kv in req.query_string().split('&') {
        let mut split = kv.split('=');
        match (split.next(), split.next()) {
            (Some("player_id"), Some(value)) => {
                player_id = Uuid::parse_str(value).ok();
            }
            (Some("email"), Some(value)) => {
                email = urlencoding::decode(value)
                    .unwrap_or_else(|_| Cow::Borrowed(""))
                    .into_owned();
            }
            _ => {}
        }
    }

    let Some(player_id) = player_id else {
        return Ok(http_error_response(
            "MISSING_PLAYER_ID",
            "Missing or invalid player_id query parameter",
            None,
            StatusCode::BAD_REQUEST,
        ));
    };
    if email.is_empty() {
        email = format!("player-{}", &player_id.to_string()[..6]);
    }

    let is_player = data
        .manager
        .send(IsPlayerInGame { game_id, player_id })
        .await
        .map_err(error::ErrorInternalServerError)?;
    match is_player {
        Ok(true) => {}
        Ok(false) => {
            return Ok(http_error_response(
                "PLAYER_NOT_IN_GAME",
                "Join the game before connecting to it",
                Some(&player_id.to_string()),
                StatusCode::FORBIDDEN,
            ));
        }
        Err(err) => return Ok(crate::server::ws_error::game_error_response(&err)),
    }

    ws::start(
        GameSocketSession::new(
            game_id,
            player_id,
            email,
            data.manager.clone(),
            data.store.clone(),
        ),
        &req,
        stream,
    )
}
