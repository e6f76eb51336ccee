//! Crate tests: move resolution, lifecycle operations, store semantics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::ProfileService;
use crate::config::game::{MAX_PLAYERS, PLAYER_COLORS};
use crate::game::error::GameError;
use crate::game::levels;
use crate::game::service::GameService;
use crate::game::state::{GameState, derive_game_code, now_millis};
use crate::game::systems::movement::{StateWrite, resolve_move, step};
use crate::game::types::{
    Direction, GameObject, GameStatus, MoveOutcome, ObjectKind, ObstacleKind, Player, Position,
};
use crate::store::{DocumentStore, MemoryStore, SyncedView};

fn at(x: usize, y: usize) -> Position {
    Position { x, y }
}

fn blank_game(grid_size: usize, level_number: u32) -> GameState {
    let id = Uuid::new_v4();
    GameState {
        id,
        game_code: derive_game_code(&id),
        creator_uid: Uuid::new_v4(),
        level_number,
        grid_size,
        players: HashMap::new(),
        game_objects: HashMap::new(),
        status: GameStatus::Active,
        created_at: now_millis(),
    }
}

fn add_player(game: &mut GameState, pos: Position) -> Uuid {
    let uid = Uuid::new_v4();
    game.players.insert(
        uid,
        Player::new(uid, format!("{uid}@test"), pos, PLAYER_COLORS[0]),
    );
    uid
}

fn add_object(game: &mut GameState, kind: ObjectKind, pos: Position) -> Uuid {
    let obj = GameObject::new(kind, pos);
    let id = obj.id;
    game.game_objects.insert(id, obj);
    id
}

fn add_rock(game: &mut GameState, pos: Position) -> Uuid {
    add_object(game, ObjectKind::Rock, pos)
}

fn add_obstacle(game: &mut GameState, pos: Position, kind: ObstacleKind, covered: bool) -> Uuid {
    add_object(
        game,
        ObjectKind::Obstacle { kind, original_kind: kind, covered },
        pos,
    )
}

fn player_write(writes: &[StateWrite]) -> Option<Position> {
    writes.iter().find_map(|w| match w {
        StateWrite::PlayerPosition { pos, .. } => Some(*pos),
        _ => None,
    })
}

fn object_write(writes: &[StateWrite], id: Uuid) -> Option<Position> {
    writes.iter().find_map(|w| match w {
        StateWrite::ObjectPosition { object_id, pos } if *object_id == id => Some(*pos),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Move resolution

#[test]
fn step_clamps_to_grid() {
    for &(pos, dir) in &[
        (at(0, 0), Direction::Left),
        (at(0, 0), Direction::Up),
        (at(14, 14), Direction::Right),
        (at(14, 14), Direction::Down),
    ] {
        assert_eq!(step(pos, dir, 15), pos);
    }
    assert_eq!(step(at(7, 7), Direction::Up, 15), at(7, 6));
    assert_eq!(step(at(7, 7), Direction::Down, 15), at(7, 8));
    assert_eq!(step(at(7, 7), Direction::Left, 15), at(6, 7));
    assert_eq!(step(at(7, 7), Direction::Right, 15), at(8, 7));
}

#[test]
fn boundary_move_never_leaves_grid() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(0, 0));

    let res = resolve_move(&game, mover, Direction::Left).unwrap();
    assert_eq!(res.outcome, MoveOutcome::None);
    let pos = player_write(&res.writes).unwrap();
    assert!(pos.x < 15 && pos.y < 15);
    assert_eq!(pos, at(0, 0));
}

#[test]
fn move_into_other_player_is_blocked() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    add_player(&mut game, at(5, 5));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::Blocked);
    assert!(res.writes.is_empty());
}

#[test]
fn push_rock_moves_rock_and_player() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    let rock = add_rock(&mut game, at(5, 5));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::PushedRock);
    assert_eq!(object_write(&res.writes, rock), Some(at(6, 5)));
    assert_eq!(player_write(&res.writes), Some(at(5, 5)));
}

#[test]
fn push_off_grid_aborts_whole_move() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(13, 5));
    add_rock(&mut game, at(14, 5));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::Blocked);
    assert!(res.writes.is_empty());
}

#[test]
fn push_into_occupied_cell_aborts_whole_move() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    add_rock(&mut game, at(5, 5));
    add_rock(&mut game, at(6, 5));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::Blocked);
    assert!(res.writes.is_empty());
}

#[test]
fn push_onto_obstacle_covers_it() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    let rock = add_rock(&mut game, at(5, 5));
    let obstacle = add_obstacle(&mut game, at(6, 5), ObstacleKind::Lava, false);

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::PushedRock);
    assert_eq!(object_write(&res.writes, rock), Some(at(6, 5)));
    assert!(res.writes.contains(&StateWrite::CoverObstacle { object_id: obstacle }));
    assert_eq!(player_write(&res.writes), Some(at(5, 5)));
}

#[test]
fn uncovered_obstacle_rejects_move() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    add_obstacle(&mut game, at(5, 5), ObstacleKind::River, false);

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::HitHazard);
    assert!(res.writes.is_empty());
}

#[test]
fn covered_obstacle_is_inert() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    add_obstacle(&mut game, at(5, 5), ObstacleKind::Wind, true);

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::None);
    assert_eq!(player_write(&res.writes), Some(at(5, 5)));
}

#[test]
fn single_player_on_exit_does_not_complete_level() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(13, 14));
    add_player(&mut game, at(0, 0));
    add_object(&mut game, ObjectKind::Exit, at(14, 14));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::ReachedExit);
    assert_eq!(player_write(&res.writes), Some(at(14, 14)));
}

#[test]
fn last_player_reaching_exit_completes_level() {
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(13, 14));
    add_player(&mut game, at(14, 14));
    add_object(&mut game, ObjectKind::Exit, at(14, 14));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::LevelComplete);
}

#[test]
fn completing_last_level_completes_game() {
    let mut game = blank_game(15, levels::total_levels());
    let mover = add_player(&mut game, at(13, 14));
    add_object(&mut game, ObjectKind::Exit, at(14, 14));

    let res = resolve_move(&game, mover, Direction::Right).unwrap();
    assert_eq!(res.outcome, MoveOutcome::GameComplete);
    assert!(res.writes.contains(&StateWrite::Status(GameStatus::Completed)));
}

#[test]
fn unknown_player_cannot_move() {
    let game = blank_game(15, 1);
    assert!(resolve_move(&game, Uuid::new_v4(), Direction::Up).is_none());
}

// ---------------------------------------------------------------------------
// Lifecycle

fn service() -> (GameService, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    (GameService::new(store.clone()), store)
}

#[test]
fn create_game_materializes_level_one() {
    let (service, _store) = service();
    let creator = Uuid::new_v4();
    let game_id = service.create_game(creator, "creator@test", 1).unwrap();
    let state = service.game_state(game_id).unwrap();

    assert_eq!(state.status, GameStatus::Waiting);
    assert_eq!(state.level_number, 1);
    assert_eq!(state.grid_size, 15);
    assert_eq!(state.game_code, derive_game_code(&game_id));
    assert!(state.created_at > 0);

    let creator_player = &state.players[&creator];
    assert_eq!((creator_player.x, creator_player.y), (0, 0));
    assert_eq!(creator_player.color, PLAYER_COLORS[0]);

    let rocks = state.game_objects.values().filter(|o| o.is_rock()).count();
    let obstacles = state
        .game_objects
        .values()
        .filter(|o| o.is_active_obstacle())
        .count();
    let exits = state.game_objects.values().filter(|o| o.is_exit()).count();
    assert_eq!((rocks, obstacles, exits), (3, 3, 1));
    assert_eq!(state.exit().unwrap().pos(), at(14, 14));
}

#[test]
fn create_game_rejects_unknown_level() {
    let (service, _store) = service();
    let err = service.create_game(Uuid::new_v4(), "a@test", 42).unwrap_err();
    assert_eq!(err, GameError::LevelNotFound(42));
}

#[test]
fn join_by_code_is_case_insensitive() {
    let (service, _store) = service();
    let game_id = service.create_game(Uuid::new_v4(), "a@test", 1).unwrap();
    let code = derive_game_code(&game_id);

    let joiner = Uuid::new_v4();
    let resolved = service
        .join_game(&code.to_lowercase(), joiner, "b@test")
        .unwrap();
    assert_eq!(resolved, game_id);

    let state = service.game_state(game_id).unwrap();
    let player = &state.players[&joiner];
    assert_eq!((player.x, player.y), (1, 0));
    assert_eq!(player.color, PLAYER_COLORS[1]);
}

#[test]
fn join_unknown_code_fails() {
    let (service, _store) = service();
    service.create_game(Uuid::new_v4(), "a@test", 1).unwrap();
    let err = service
        .join_game("ZZZZZZZZ", Uuid::new_v4(), "b@test")
        .unwrap_err();
    assert_eq!(err, GameError::GameNotFound);
}

#[test]
fn join_started_game_fails() {
    let (service, _store) = service();
    let game_id = service.create_game(Uuid::new_v4(), "a@test", 1).unwrap();
    service.start_game(game_id).unwrap();
    let err = service
        .join_game(&game_id.to_string(), Uuid::new_v4(), "b@test")
        .unwrap_err();
    assert_eq!(err, GameError::GameAlreadyStarted);
}

#[test]
fn join_full_game_fails_and_spawns_fall_back() {
    let (service, _store) = service();
    let game_id = service.create_game(Uuid::new_v4(), "a@test", 1).unwrap();

    // Level 1 defines three spawns; later joiners get the fallback row.
    let fourth = Uuid::new_v4();
    for (i, uid) in [Uuid::new_v4(), Uuid::new_v4(), fourth, Uuid::new_v4()]
        .into_iter()
        .enumerate()
    {
        service
            .join_game(&game_id.to_string(), uid, &format!("p{i}@test"))
            .unwrap();
    }
    let state = service.game_state(game_id).unwrap();
    assert_eq!(state.players.len(), 5);
    let fourth_player = &state.players[&fourth];
    assert_eq!((fourth_player.x, fourth_player.y), (3, 0));

    service
        .join_game(&game_id.to_string(), Uuid::new_v4(), "p5@test")
        .unwrap();
    let err = service
        .join_game(&game_id.to_string(), Uuid::new_v4(), "p6@test")
        .unwrap_err();
    assert_eq!(err, GameError::GameFull);

    let state = service.game_state(game_id).unwrap();
    assert_eq!(state.players.len(), MAX_PLAYERS);
}

#[test]
fn leave_game_removes_player() {
    let (service, _store) = service();
    let game_id = service.create_game(Uuid::new_v4(), "a@test", 1).unwrap();
    let joiner = Uuid::new_v4();
    service
        .join_game(&game_id.to_string(), joiner, "b@test")
        .unwrap();

    service.leave_game(game_id, joiner).unwrap();
    let state = service.game_state(game_id).unwrap();
    assert!(!state.players.contains_key(&joiner));
}

#[test]
fn handle_move_commits_push_as_one_update() {
    let (service, store) = service();
    let mut game = blank_game(15, 1);
    let mover = add_player(&mut game, at(4, 5));
    let rock = add_rock(&mut game, at(5, 5));
    let obstacle = add_obstacle(&mut game, at(6, 5), ObstacleKind::Lava, false);
    let game_id = game.id;
    store
        .set(
            &format!("games/{game_id}"),
            serde_json::to_value(&game).unwrap(),
        )
        .unwrap();

    let outcome = service.handle_move(game_id, mover, Direction::Right).unwrap();
    assert_eq!(outcome, MoveOutcome::PushedRock);

    let state = service.game_state(game_id).unwrap();
    assert_eq!(state.players[&mover].pos(), at(5, 5));
    assert_eq!(state.game_objects[&rock].pos(), at(6, 5));
    match state.game_objects[&obstacle].kind {
        ObjectKind::Obstacle { covered, original_kind, .. } => {
            assert!(covered);
            assert_eq!(original_kind, ObstacleKind::Lava);
        }
        _ => panic!("obstacle lost its kind"),
    }
}

#[test]
fn handle_move_from_stranger_fails() {
    let (service, _store) = service();
    let game_id = service.create_game(Uuid::new_v4(), "a@test", 1).unwrap();
    let err = service
        .handle_move(game_id, Uuid::new_v4(), Direction::Up)
        .unwrap_err();
    assert_eq!(err, GameError::PlayerNotInGame);
}

#[test]
fn advance_replaces_game_and_records_level() {
    let (service, store) = service();
    let profile = ProfileService::new(store.clone())
        .create_profile("creator@test", "Creator")
        .unwrap();

    let game_id = service.create_game(profile.uid, &profile.email, 1).unwrap();
    service
        .join_game(&game_id.to_string(), Uuid::new_v4(), "b@test")
        .unwrap();

    let new_id = service
        .advance_or_restart(game_id, profile.uid, &profile.email, 2)
        .unwrap();
    assert_ne!(new_id, game_id);
    assert!(matches!(
        service.game_state(game_id),
        Err(GameError::GameNotFound)
    ));

    let state = service.game_state(new_id).unwrap();
    assert_eq!(state.level_number, 2);
    assert_eq!(state.status, GameStatus::Waiting);
    // Only the creator carries over.
    assert_eq!(state.players.len(), 1);
    assert!(state.players.contains_key(&profile.uid));

    let profiles = ProfileService::new(store.clone());
    assert_eq!(profiles.profile(profile.uid).unwrap().unwrap().last_level, 2);
}

#[test]
fn advance_to_unknown_level_keeps_game() {
    let (service, _store) = service();
    let creator = Uuid::new_v4();
    let game_id = service.create_game(creator, "a@test", 5).unwrap();
    let err = service
        .advance_or_restart(game_id, creator, "a@test", 6)
        .unwrap_err();
    assert_eq!(err, GameError::LevelNotFound(6));
    assert!(service.game_state(game_id).is_ok());
}

// ---------------------------------------------------------------------------
// Catalog

#[test]
fn catalog_is_dense_and_fixed() {
    assert_eq!(levels::total_levels(), 5);
    for number in 1..=5 {
        let level = levels::level(number).unwrap();
        assert_eq!(level.number, number);
        assert_eq!(level.grid_size, 15);
        assert!(!level.player_start_positions.is_empty());
    }
    assert!(levels::level(0).is_none());
    assert!(levels::level(6).is_none());
}

#[test]
fn level_one_layout_is_canonical() {
    let level = levels::level(1).unwrap();
    assert_eq!(level.player_start_positions, &[at(0, 0), at(1, 0), at(2, 0)]);
    assert_eq!(level.rocks, &[at(5, 5), at(5, 6), at(5, 7)]);
    assert_eq!(level.exit, at(14, 14));
    assert!(level
        .obstacles
        .iter()
        .all(|&(_, kind)| kind == ObstacleKind::Lava));
}

#[test]
fn level_three_exit_sits_on_the_middle_row() {
    assert_eq!(levels::level(3).unwrap().exit, at(14, 7));
}

// ---------------------------------------------------------------------------
// Store

#[test]
fn store_set_get_remove_roundtrip() {
    let store = MemoryStore::new();
    assert_eq!(store.get("games/x").unwrap(), None);

    store.set("games/x", json!({"a": 1})).unwrap();
    assert_eq!(store.get("games/x").unwrap(), Some(json!({"a": 1})));
    assert_eq!(store.get("games/x/a").unwrap(), Some(json!(1)));

    store.remove("games/x").unwrap();
    assert_eq!(store.get("games/x").unwrap(), None);
}

#[test]
fn multi_key_update_applies_every_field() {
    let store = MemoryStore::new();
    store
        .set("games/x", json!({"players": {"p": {"x": 0, "y": 0}}, "status": "active"}))
        .unwrap();

    let mut fields = serde_json::Map::new();
    fields.insert("players/p/x".to_string(), json!(5));
    fields.insert("players/p/y".to_string(), json!(6));
    fields.insert("status".to_string(), json!("completed"));
    store.update("games/x", fields).unwrap();

    assert_eq!(
        store.get("games/x").unwrap(),
        Some(json!({"players": {"p": {"x": 5, "y": 6}}, "status": "completed"}))
    );
}

#[test]
fn subscription_sees_every_change_and_stops_on_drop() {
    let store = MemoryStore::new();
    let seen: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let subscription = store.subscribe(
        "games/x",
        Box::new(move |doc| sink.lock().unwrap().push(doc)),
    );

    store.set("games/x", json!({"status": "waiting"})).unwrap();
    let mut fields = serde_json::Map::new();
    fields.insert("status".to_string(), json!("active"));
    store.update("games/x", fields).unwrap();
    store.remove("games/x").unwrap();

    {
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                None, // initial delivery, document absent
                Some(json!({"status": "waiting"})),
                Some(json!({"status": "active"})),
                None, // removed
            ]
        );
    }

    drop(subscription);
    store.set("games/x", json!({"status": "waiting"})).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 4);
}

#[test]
fn child_writes_notify_parent_subscribers() {
    let store = MemoryStore::new();
    let seen: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = store.subscribe(
        "games/x",
        Box::new(move |doc| sink.lock().unwrap().push(doc)),
    );

    store.set("games/x/players/p", json!({"x": 1})).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.last().unwrap(),
        &Some(json!({"players": {"p": {"x": 1}}}))
    );
}

#[test]
fn synced_view_tracks_store_only() {
    let store = MemoryStore::new();
    let view: SyncedView<GameState> = SyncedView::new(&store, "games/x");
    assert!(view.get().is_none());

    let mut game = blank_game(15, 1);
    add_player(&mut game, at(0, 0));
    store
        .set("games/x", serde_json::to_value(&game).unwrap())
        .unwrap();
    assert_eq!(view.get().unwrap().id, game.id);

    store.remove("games/x").unwrap();
    assert!(view.get().is_none());
}

// ---------------------------------------------------------------------------
// Profiles

#[test]
fn profile_roundtrip_and_last_level_keeps_max() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let profiles = ProfileService::new(store);

    let profile = profiles.create_profile("a@test", "Alice").unwrap();
    assert_eq!(profile.last_level, 1);

    profiles.update_last_level(profile.uid, 3).unwrap();
    profiles.update_last_level(profile.uid, 2).unwrap();
    assert_eq!(profiles.profile(profile.uid).unwrap().unwrap().last_level, 3);

    let mut fields = serde_json::Map::new();
    fields.insert("displayName".to_string(), json!("Alicia"));
    profiles.update_profile(profile.uid, fields).unwrap();
    assert_eq!(
        profiles.profile(profile.uid).unwrap().unwrap().display_name,
        "Alicia"
    );
}

#[test]
fn game_code_is_uppercase_prefix() {
    let id = Uuid::new_v4();
    let code = derive_game_code(&id);
    assert_eq!(code.len(), 8);
    assert_eq!(code, id.to_string()[..8].to_uppercase());
}
