use serde::Serialize;

/// One of the two sides. Red starts at the bottom (rows 5-7) and moves
/// up the board; Black starts at the top (rows 0-2) and moves down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    /// Row direction this side's men travel: Red up (-1), Black down (+1).
    pub fn forward(self) -> i32 {
        match self {
            Self::Red => -1,
            Self::Black => 1,
        }
    }

    /// The row where this side's men promote.
    pub fn back_rank(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Black => 7,
        }
    }
}

/// A single checker. Kings may also move and jump backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub owner: Player,
    pub is_king: bool,
}

impl Piece {
    pub fn man(owner: Player) -> Self {
        Self {
            owner,
            is_king: false,
        }
    }

    pub fn king(owner: Player) -> Self {
        Self {
            owner,
            is_king: true,
        }
    }
}

/// A board coordinate, `row` and `col` each in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A move offered by the generator. Only meaningful against the exact
/// board it was computed from.
///
/// Contract:
/// - `jumped` is `Some` iff `is_jump`, naming the captured square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub is_jump: bool,
    pub jumped: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Idle,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameMode {
    /// Both sides driven by square clicks.
    TwoPlayer,
    /// Black is driven by the external move-selection agent.
    VsAgent,
}

/// Public game state snapshot returned across the wasm boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Contract: 64 cells in row-major order;
    /// 0=empty, 1=red man, 2=red king, 3=black man, 4=black king.
    pub board: Vec<u8>,
    pub turn: Player,
    pub status: GameStatus,
    pub winner: Option<Player>,
    pub red_points: u32,
    pub black_points: u32,
    pub red_wins: u32,
    pub black_wins: u32,
    pub last_move: Option<Move>,
    /// `Some` while a multi-jump chain restricts play to one piece.
    pub must_jump_from: Option<Position>,
    pub selected: Option<Position>,
    pub agent_pending: bool,
}

/// One entry of the append-only move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub mv: Move,
    pub player: Player,
    /// 1-based; increments per applied move, chain segments included.
    pub turn_number: u32,
}

/// Snapshot handed to the external move-selection agent.
///
/// Contract:
/// - `moves` is non-empty and ordered; the agent answers with an index
///   into it (anything else falls back to a uniform random choice).
/// - `generation` must be echoed back; a stale generation is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentTurn {
    pub generation: u64,
    pub board: Vec<u8>,
    pub moves: Vec<Move>,
    pub difficulty: u8,
    pub player: Player,
}
