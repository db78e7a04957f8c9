//! JS-facing surface: a single global game driven through small
//! wasm-bindgen endpoints, with state crossing as serde snapshots.

use std::sync::Mutex;
use std::time::Duration;

use once_cell::sync::Lazy;
use wasm_bindgen::prelude::*;

use crate::game::{Event, Game};
use crate::types::GameMode;

/// How long the JS driver may sit on an agent request before
/// `agent_timed_out` tells it to answer with a failure.
const AGENT_TIMEOUT: Duration = Duration::from_secs(15);

static GAME: Lazy<Mutex<Game>> = Lazy::new(|| Mutex::new(Game::new()));

fn with_game<T>(f: impl FnOnce(&mut Game) -> Result<T, String>) -> Result<T, JsValue> {
    let mut game = GAME
        .lock()
        .map_err(|_| JsValue::from_str("game state poisoned"))?;
    f(&mut game).map_err(|e| JsValue::from_str(&e))
}

fn state_value(game: &Game) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(&game.to_game_state()).map_err(|e| e.to_string())
}

/// Starts a fresh game. `mode`: 0 = two players, 1 = vs the agent;
/// `difficulty` in `1..=5` (ignored in two-player mode).
#[wasm_bindgen]
pub fn start_game(mode: u8, difficulty: u8) -> Result<JsValue, JsValue> {
    with_game(|game| {
        let mode = match mode {
            0 => GameMode::TwoPlayer,
            1 => GameMode::VsAgent,
            _ => return Err(format!("unknown game mode: {mode}")),
        };
        game.start(mode, difficulty)?;
        state_value(game)
    })
}

/// Resolves a board click and returns the updated state snapshot.
#[wasm_bindgen]
pub fn click_square(row: u8, col: u8) -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.click(row, col)?;
        state_value(game)
    })
}

/// New game in the current mode; series win counts carry over.
#[wasm_bindgen]
pub fn reset_game() -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.handle(Event::Reset)?;
        state_value(game)
    })
}

#[wasm_bindgen]
pub fn to_menu() -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.handle(Event::MenuRequested)?;
        state_value(game)
    })
}

#[wasm_bindgen]
pub fn game_state() -> Result<JsValue, JsValue> {
    with_game(|game| state_value(game))
}

/// Legal moves currently offered to the active player.
#[wasm_bindgen]
pub fn legal_moves() -> Result<JsValue, JsValue> {
    with_game(|game| serde_wasm_bindgen::to_value(game.current_moves()).map_err(|e| e.to_string()))
}

/// The append-only move history.
#[wasm_bindgen]
pub fn move_history() -> Result<JsValue, JsValue> {
    with_game(|game| serde_wasm_bindgen::to_value(game.history()).map_err(|e| e.to_string()))
}

/// Issues the agent request for this turn, or `null` when there is
/// nothing to ask (not the agent's turn, a call already in flight, or a
/// single legal move that was played directly).
#[wasm_bindgen]
pub fn agent_request() -> Result<JsValue, JsValue> {
    with_game(|game| match game.agent_request() {
        Some(turn) => serde_wasm_bindgen::to_value(&turn).map_err(|e| e.to_string()),
        None => Ok(JsValue::NULL),
    })
}

/// The agent's answer: an index into the requested move list. Stale
/// generations are ignored; invalid indices fall back to a random move.
#[wasm_bindgen]
pub fn agent_choice(generation: u64, index: usize) -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.handle(Event::AgentMoveReceived {
            generation,
            choice: Some(index),
        })?;
        state_value(game)
    })
}

/// The agent failed; a uniformly random legal move is substituted.
#[wasm_bindgen]
pub fn agent_failed(generation: u64) -> Result<JsValue, JsValue> {
    with_game(|game| {
        game.handle(Event::AgentMoveReceived {
            generation,
            choice: None,
        })?;
        state_value(game)
    })
}

/// True when the in-flight agent call has exceeded its deadline and the
/// driver should answer with `agent_failed`.
#[wasm_bindgen]
pub fn agent_timed_out() -> bool {
    GAME.lock()
        .map(|game| game.agent_timed_out(AGENT_TIMEOUT))
        .unwrap_or(false)
}
