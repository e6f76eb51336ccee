//! Move resolution.
//!
//! This module turns a single-cell move intent into an outcome signal and a
//! batch of state writes. It never touches the store: the caller applies
//! the batch as one atomic update, so a push can never half-apply.

use uuid::Uuid;

use crate::game::levels;
use crate::game::state::GameState;
use crate::game::types::{Direction, GameStatus, MoveOutcome, Position};

/// One field-level delta against the shared game document.
#[derive(Debug, Clone, PartialEq)]
pub enum StateWrite {
    PlayerPosition { player_id: Uuid, pos: Position },
    ObjectPosition { object_id: Uuid, pos: Position },
    CoverObstacle { object_id: Uuid },
    Status(GameStatus),
}

/// Result of resolving one intent. `writes` is empty for rejected moves.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResolution {
    pub outcome: MoveOutcome,
    pub writes: Vec<StateWrite>,
}

impl MoveResolution {
    fn rejected(outcome: MoveOutcome) -> Self {
        Self { outcome, writes: Vec::new() }
    }
}

/// Step one cell in `direction`, clamped to the grid. Moving off-grid at a
/// boundary yields the starting cell back, not an error.
pub fn step(pos: Position, direction: Direction, grid_size: usize) -> Position {
    let mut next = pos;
    match direction {
        Direction::Up => {
            if next.y > 0 { next.y -= 1; }
        }
        Direction::Down => {
            if next.y < grid_size - 1 { next.y += 1; }
        }
        Direction::Left => {
            if next.x > 0 { next.x -= 1; }
        }
        Direction::Right => {
            if next.x < grid_size - 1 { next.x += 1; }
        }
    }
    next
}

/// Cell a pushed rock would land on: one more cell along the mover's
/// direction of travel. None if that cell falls outside the grid.
fn push_target(from: Position, candidate: Position, grid_size: usize) -> Option<Position> {
    let dx = candidate.x as isize - from.x as isize;
    let dy = candidate.y as isize - from.y as isize;
    let tx = candidate.x as isize + dx;
    let ty = candidate.y as isize + dy;
    let bound = grid_size as isize;
    if tx < 0 || ty < 0 || tx >= bound || ty >= bound {
        return None;
    }
    Some(Position { x: tx as usize, y: ty as usize })
}

/// Resolve a move intent for one player against a state snapshot.
///
/// Returns `None` when the player is not part of the game. A push that
/// fails any sub-check rejects the entire move: the mover stays put even
/// though the rock's own cell was reachable.
pub fn resolve_move(
    state: &GameState,
    player_id: Uuid,
    direction: Direction,
) -> Option<MoveResolution> {
    let player = state.players.get(&player_id)?;
    let from = player.pos();
    let candidate = step(from, direction, state.grid_size);

    if state.cell_occupied_by_other(candidate, player_id) {
        return Some(MoveResolution::rejected(MoveOutcome::Blocked));
    }

    let resolution = match state.object_at(candidate) {
        None => MoveResolution {
            outcome: MoveOutcome::None,
            writes: vec![StateWrite::PlayerPosition { player_id, pos: candidate }],
        },
        Some(obj) if obj.is_rock() => {
            let rock_id = obj.id;
            let Some(target) = push_target(from, candidate, state.grid_size) else {
                return Some(MoveResolution::rejected(MoveOutcome::Blocked));
            };
            if state.blocking_object_at(target).is_some() {
                return Some(MoveResolution::rejected(MoveOutcome::Blocked));
            }
            let mut writes = vec![StateWrite::ObjectPosition { object_id: rock_id, pos: target }];
            if let Some(obstacle) = state.active_obstacle_at(target) {
                writes.push(StateWrite::CoverObstacle { object_id: obstacle.id });
            }
            writes.push(StateWrite::PlayerPosition { player_id, pos: candidate });
            MoveResolution { outcome: MoveOutcome::PushedRock, writes }
        }
        Some(obj) if obj.is_active_obstacle() => {
            // Hazard cells reject the move; whether to reset the level is
            // the caller's call, state stays consistent either way.
            MoveResolution::rejected(MoveOutcome::HitHazard)
        }
        Some(_exit) => {
            let outcome = if all_players_at_exit(state, player_id, candidate) {
                if state.level_number >= levels::total_levels() {
                    MoveOutcome::GameComplete
                } else {
                    MoveOutcome::LevelComplete
                }
            } else {
                MoveOutcome::ReachedExit
            };
            let mut writes = vec![StateWrite::PlayerPosition { player_id, pos: candidate }];
            if outcome == MoveOutcome::GameComplete {
                writes.push(StateWrite::Status(GameStatus::Completed));
            }
            MoveResolution { outcome, writes }
        }
    };

    Some(resolution)
}

/// Completion check, evaluated with the mover already on `moved_to`: the
/// level is complete only when every current player stands on the exit.
fn all_players_at_exit(state: &GameState, mover: Uuid, moved_to: Position) -> bool {
    let Some(exit_pos) = state.exit().map(|e| e.pos()) else {
        return false;
    };
    state.players.values().all(|p| {
        let pos = if p.id == mover { moved_to } else { p.pos() };
        pos == exit_pos
    })
}
