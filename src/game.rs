use std::time::Duration;

use web_time::Instant;

use crate::ai::{self, MoveSelector};
use crate::board::{Board, POINTS_WIN};
use crate::movegen::legal_moves;
use crate::types::{
    AgentTurn, GameMode, GameState, GameStatus, Move, MoveRecord, Player, Position,
};

/// Result of the win evaluation for the side about to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinCheck {
    pub is_over: bool,
    pub winner: Option<Player>,
    pub win_bonus: u32,
}

impl WinCheck {
    fn over(winner: Player) -> Self {
        Self {
            is_over: true,
            winner: Some(winner),
            win_bonus: POINTS_WIN,
        }
    }

    fn ongoing() -> Self {
        Self {
            is_over: false,
            winner: None,
            win_bonus: 0,
        }
    }
}

/// Decides whether the game is over once `next_player` is about to move.
///
/// A side with no pieces loses outright; a side with pieces but no legal
/// moves is stalemated and loses. Only the mobility of the side about to
/// move matters.
pub fn check_win(board: &Board, next_player: Player) -> WinCheck {
    if board.count(Player::Red) == 0 {
        return WinCheck::over(Player::Black);
    }
    if board.count(Player::Black) == 0 {
        return WinCheck::over(Player::Red);
    }
    if legal_moves(board, next_player, None).is_empty() {
        return WinCheck::over(next_player.opponent());
    }
    WinCheck::ongoing()
}

/// Everything that can drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A move picked from the currently offered legal set.
    MoveChosen(Move),
    /// The external agent answered (or failed: `choice` of `None`).
    AgentMoveReceived { generation: u64, choice: Option<usize> },
    /// New game: fresh board, Red to move, series scores kept.
    Reset,
    /// Back to the menu; terminal state until the next reset.
    MenuRequested,
}

#[derive(Debug, Clone, Copy)]
struct PendingAgent {
    generation: u64,
    issued_at: Instant,
}

/// The turn controller. Owns the canonical board and all game state;
/// every mutation flows through [`Game::handle`] (the click and agent
/// helpers dispatch events into it).
pub struct Game {
    board: Board,
    turn: Player,
    status: GameStatus,
    winner: Option<Player>,
    mode: GameMode,
    difficulty: u8,
    red_points: u32,
    black_points: u32,
    red_wins: u32,
    black_wins: u32,
    last_move: Option<Move>,
    must_jump_from: Option<Position>,
    selected: Option<Position>,
    turn_moves: Vec<Move>,
    history: Vec<MoveRecord>,
    generation: u64,
    pending_agent: Option<PendingAgent>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            turn: Player::Red,
            status: GameStatus::Idle,
            winner: None,
            mode: GameMode::TwoPlayer,
            difficulty: 1,
            red_points: 0,
            black_points: 0,
            red_wins: 0,
            black_wins: 0,
            last_move: None,
            must_jump_from: None,
            selected: None,
            turn_moves: Vec::new(),
            history: Vec::new(),
            generation: 0,
            pending_agent: None,
        }
    }

    /// Leaves the menu and starts a fresh game in the given mode.
    pub fn start(&mut self, mode: GameMode, difficulty: u8) -> Result<(), String> {
        if !(1..=5).contains(&difficulty) {
            return Err(format!("difficulty out of range: {difficulty}"));
        }
        self.mode = mode;
        self.difficulty = difficulty;
        self.begin_round();
        Ok(())
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Legal moves currently offered to the active player.
    pub fn current_moves(&self) -> &[Move] {
        &self.turn_moves
    }

    /// Append-only move history for the history collaborator.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn agent_pending(&self) -> bool {
        self.pending_agent.is_some()
    }

    /// Single transition entry point.
    ///
    /// Errors are diagnostics: the event was rejected and nothing
    /// changed. Stale agent answers are discarded silently with `Ok`.
    pub fn handle(&mut self, event: Event) -> Result<(), String> {
        match event {
            Event::MoveChosen(mv) => {
                if self.status != GameStatus::Playing {
                    return Err("no game in progress".to_string());
                }
                self.settle_stuck_turn();
                if !self.turn_moves.contains(&mv) {
                    return Err("move is not in the current legal set".to_string());
                }
                self.execute_move(mv)
            }
            Event::AgentMoveReceived { generation, choice } => {
                self.settle_stuck_turn();
                self.receive_agent_move(generation, choice)
            }
            Event::Reset => {
                self.begin_round();
                Ok(())
            }
            Event::MenuRequested => {
                self.status = GameStatus::Idle;
                self.selected = None;
                self.turn_moves.clear();
                self.next_generation();
                Ok(())
            }
        }
    }

    /// Resolves a square click against the current selection and the
    /// offered legal moves. Clicks that cannot mean anything right now
    /// (the agent's turn, a piece with no moves, a random empty square)
    /// are absorbed without error.
    pub fn click(&mut self, row: u8, col: u8) -> Result<(), String> {
        if row >= 8 || col >= 8 {
            return Err("row/col out of range".to_string());
        }
        if self.status != GameStatus::Playing {
            return Err("no game in progress".to_string());
        }
        if self.mode == GameMode::VsAgent && self.turn == Player::Black {
            return Ok(());
        }
        if self.pending_agent.is_some() {
            return Ok(());
        }

        let pos = Position::new(row, col);
        let clicked = self.board.get(pos);

        if let Some(piece) = clicked {
            if piece.owner != self.turn {
                return Ok(());
            }
            // Mid-chain only the jumping piece may be picked up.
            if let Some(forced) = self.must_jump_from
                && forced != pos
            {
                return Ok(());
            }
            let has_moves = self.turn_moves.iter().any(|m| m.from == pos);
            self.selected = if has_moves { Some(pos) } else { None };
            return Ok(());
        }

        if let Some(selected) = self.selected {
            let chosen = self
                .turn_moves
                .iter()
                .copied()
                .find(|m| m.from == selected && m.to == pos);
            match chosen {
                Some(mv) => return self.handle(Event::MoveChosen(mv)),
                None => {
                    if self.must_jump_from.is_none() {
                        self.selected = None;
                    }
                }
            }
        }
        Ok(())
    }

    /// Issues the agent request for the current turn, at most once.
    ///
    /// Returns `None` when it is not the agent's turn, a request is
    /// already in flight, or the position offers exactly one move — in
    /// the last case the move is played directly, bypassing the agent.
    pub fn agent_request(&mut self) -> Option<AgentTurn> {
        if !self.agent_to_move() || self.pending_agent.is_some() {
            return None;
        }

        if self.turn_moves.len() == 1 {
            let mv = self.turn_moves[0];
            let _ = self.execute_move(mv);
            return None;
        }

        let generation = self.generation;
        self.pending_agent = Some(PendingAgent {
            generation,
            issued_at: Instant::now(),
        });
        Some(AgentTurn {
            generation,
            board: self.board.to_cells(),
            moves: self.turn_moves.clone(),
            difficulty: self.difficulty,
            player: self.turn,
        })
    }

    /// Synchronous agent turn for in-process selectors: issues no
    /// request, consults the selector directly and plays the answer
    /// (with the usual bypass and random-fallback rules).
    pub fn agent_move_with(&mut self, selector: &dyn MoveSelector) -> Result<(), String> {
        if self.status != GameStatus::Playing {
            return Err("no game in progress".to_string());
        }
        if !self.agent_to_move() {
            return Err("it is not the agent's turn".to_string());
        }
        if self.pending_agent.is_some() {
            return Err("an agent call is already in flight".to_string());
        }

        let index = ai::choose_move(
            selector,
            &self.board,
            &self.turn_moves,
            self.difficulty,
            self.turn,
        );
        let mv = self.turn_moves[index];
        self.execute_move(mv)
    }

    /// True when a pending agent call has outlived `timeout`; the driver
    /// then answers with a failed choice to trigger the random fallback.
    pub fn agent_timed_out(&self, timeout: Duration) -> bool {
        self.pending_agent
            .is_some_and(|pending| pending.issued_at.elapsed() >= timeout)
    }

    /// Current state snapshot for the UI collaborator.
    pub fn to_game_state(&self) -> GameState {
        GameState {
            board: self.board.to_cells(),
            turn: self.turn,
            status: self.status,
            winner: self.winner,
            red_points: self.red_points,
            black_points: self.black_points,
            red_wins: self.red_wins,
            black_wins: self.black_wins,
            last_move: self.last_move,
            must_jump_from: self.must_jump_from,
            selected: self.selected,
            agent_pending: self.pending_agent.is_some(),
        }
    }

    /// Recovers a turn that is stuck with nothing to play.
    ///
    /// An exhausted forced chain (the jumping piece lost its jumps)
    /// ends the turn; a player with no moves at all loses on the spot.
    /// Both re-run the win evaluation rather than handing the board
    /// over blind, so a simultaneous stalemate is never missed.
    fn settle_stuck_turn(&mut self) {
        if self.status != GameStatus::Playing || !self.turn_moves.is_empty() {
            return;
        }

        if self.must_jump_from.is_some() {
            self.must_jump_from = None;
            let next = self.turn.opponent();
            let result = check_win(&self.board, next);
            if result.is_over {
                self.finish(result);
            } else {
                self.turn = next;
                self.turn_moves = legal_moves(&self.board, next, None);
                self.next_generation();
            }
            return;
        }

        let result = check_win(&self.board, self.turn);
        if result.is_over {
            self.finish(result);
        }
    }

    fn agent_to_move(&self) -> bool {
        self.status == GameStatus::Playing
            && self.mode == GameMode::VsAgent
            && self.turn == Player::Black
            && !self.turn_moves.is_empty()
    }

    fn receive_agent_move(&mut self, generation: u64, choice: Option<usize>) -> Result<(), String> {
        // Anything stale is dropped without complaint: the board may have
        // been reset or advanced since the request went out.
        let Some(pending) = self.pending_agent else {
            return Ok(());
        };
        if pending.generation != generation || self.generation != generation {
            return Ok(());
        }
        self.pending_agent = None;

        if self.status != GameStatus::Playing || self.turn_moves.is_empty() {
            debug_assert!(false, "pending agent call outlived the turn");
            return Ok(());
        }

        let index = match choice {
            Some(index) if index < self.turn_moves.len() => index,
            // Failure or malformed answer: substitute uniformly at random.
            _ => ai::random_index(&self.turn_moves).unwrap_or(0),
        };
        let mv = self.turn_moves[index];
        self.execute_move(mv)
    }

    fn execute_move(&mut self, mv: Move) -> Result<(), String> {
        let mover = self.turn;
        match self.board.get(mv.from) {
            Some(piece) if piece.owner == mover => {}
            _ => return Err("stale move: origin square no longer holds the mover's piece".to_string()),
        }

        let outcome = self.board.apply_move(&mv);
        self.board = outcome.board;
        self.add_points(mover, outcome.points_gained);
        self.last_move = Some(mv);
        self.selected = None;
        self.history.push(MoveRecord {
            mv,
            player: mover,
            turn_number: self.history.len() as u32 + 1,
        });

        // A capture that did not promote may continue the chain from the
        // landing square; the turn is not handed over while jumps remain.
        if mv.is_jump && !outcome.did_promote {
            let more = legal_moves(&self.board, mover, Some(mv.to));
            if !more.is_empty() {
                self.must_jump_from = Some(mv.to);
                self.selected = Some(mv.to);
                self.turn_moves = more;
                self.next_generation();
                return Ok(());
            }
        }

        self.must_jump_from = None;
        let next = mover.opponent();
        let result = check_win(&self.board, next);
        if result.is_over {
            self.finish(result);
        } else {
            self.turn = next;
            self.turn_moves = legal_moves(&self.board, next, None);
            debug_assert!(!self.turn_moves.is_empty());
            self.next_generation();
        }
        Ok(())
    }

    fn begin_round(&mut self) {
        self.board = Board::new();
        self.turn = Player::Red;
        self.status = GameStatus::Playing;
        self.winner = None;
        self.red_points = 0;
        self.black_points = 0;
        self.last_move = None;
        self.must_jump_from = None;
        self.selected = None;
        self.history.clear();
        self.turn_moves = legal_moves(&self.board, self.turn, None);
        self.next_generation();
    }

    fn finish(&mut self, result: WinCheck) {
        self.status = GameStatus::GameOver;
        self.winner = result.winner;
        if let Some(winner) = result.winner {
            self.add_points(winner, result.win_bonus);
            match winner {
                Player::Red => self.red_wins += 1,
                Player::Black => self.black_wins += 1,
            }
        }
        self.must_jump_from = None;
        self.selected = None;
        self.turn_moves.clear();
        self.next_generation();
    }

    fn add_points(&mut self, player: Player, points: u32) {
        match player {
            Player::Red => self.red_points += points,
            Player::Black => self.black_points += points,
        }
    }

    /// Invalidates any in-flight agent call; a response carrying an old
    /// generation is ignored on arrival.
    fn next_generation(&mut self) {
        self.generation += 1;
        self.pending_agent = None;
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, turn: Player) {
        self.board = board;
        self.turn = turn;
        self.status = GameStatus::Playing;
        self.must_jump_from = None;
        self.selected = None;
        self.turn_moves = legal_moves(&self.board, self.turn, None);
        self.next_generation();
    }

    #[cfg(test)]
    fn force_chain_for_test(&mut self, from: Position) {
        self.must_jump_from = Some(from);
        self.turn_moves = legal_moves(&self.board, self.turn, Some(from));
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
