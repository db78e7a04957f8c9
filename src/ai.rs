//! Move-selection seam for the non-human side.
//!
//! The real agent lives outside the crate (behind the wasm boundary);
//! here is only the trait it plugs into, the uniform-random fallback
//! used when it fails, and the driver that validates its answers.

use rand::Rng;

use crate::board::Board;
use crate::types::{Move, Player};

pub trait MoveSelector: Send + Sync {
    /// Picks one of `legal` by index. `None`, or an out-of-range index,
    /// means the caller substitutes a uniform random choice.
    fn select_move(
        &self,
        board: &Board,
        legal: &[Move],
        difficulty: u8,
        player: Player,
    ) -> Option<usize>;
}

/// Uniform random selector; doubles as the failure fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl MoveSelector for RandomSelector {
    fn select_move(
        &self,
        _board: &Board,
        legal: &[Move],
        _difficulty: u8,
        _player: Player,
    ) -> Option<usize> {
        random_index(legal)
    }
}

/// Uniform random index into `legal`; `None` only when `legal` is empty.
pub fn random_index(legal: &[Move]) -> Option<usize> {
    if legal.is_empty() {
        return None;
    }
    let mut rng = rand::rng();
    Some(rng.random_range(0..legal.len()))
}

/// Resolves a selector's answer to a definite index.
///
/// A single legal move bypasses the selector entirely; any failure or
/// out-of-range answer falls back to a uniform random choice. Caller
/// contract: `legal` must be non-empty.
pub fn choose_move(
    selector: &dyn MoveSelector,
    board: &Board,
    legal: &[Move],
    difficulty: u8,
    player: Player,
) -> usize {
    debug_assert!(!legal.is_empty(), "choose_move requires at least one legal move");

    if legal.len() == 1 {
        return 0;
    }

    match selector.select_move(board, legal, difficulty, player) {
        Some(index) if index < legal.len() => index,
        _ => random_index(legal).unwrap_or(0),
    }
}
