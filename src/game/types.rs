use serde::{Serialize, Deserialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Hazard tile kinds. Stepping on an uncovered one ends the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    River,
    Lava,
    Wind,
}

/// Per-variant payload of a grid object. An obstacle keeps its original
/// hazard kind when a rock is pushed on top of it; `covered` renders it
/// inert without deleting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Rock,
    Exit,
    Obstacle {
        #[serde(rename = "obstacleType")]
        kind: ObstacleKind,
        #[serde(rename = "originalObstacleType")]
        original_kind: ObstacleKind,
        #[serde(default)]
        covered: bool,
    },
}

/// Any non-player entity placed on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: Uuid,
    pub x: usize,
    pub y: usize,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl GameObject {
    pub fn new(kind: ObjectKind, pos: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: pos.x,
            y: pos.y,
            kind,
        }
    }

    pub fn pos(&self) -> Position {
        Position { x: self.x, y: self.y }
    }

    pub fn is_rock(&self) -> bool {
        self.kind == ObjectKind::Rock
    }

    pub fn is_exit(&self) -> bool {
        self.kind == ObjectKind::Exit
    }

    /// True for an obstacle that still acts as a hazard.
    pub fn is_active_obstacle(&self) -> bool {
        matches!(self.kind, ObjectKind::Obstacle { covered: false, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub email: String,
    pub x: usize,
    pub y: usize,
    pub color: String,
}

impl Player {
    pub fn new(id: Uuid, email: String, pos: Position, color: &str) -> Self {
        Self {
            id,
            email,
            x: pos.x,
            y: pos.y,
            color: color.to_string(),
        }
    }

    pub fn pos(&self) -> Position {
        Position { x: self.x, y: self.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Active,
    Completed,
}

/// User-facing result of one move intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveOutcome {
    None,
    Blocked,
    PushedRock,
    HitHazard,
    ReachedExit,
    LevelComplete,
    GameComplete,
}
