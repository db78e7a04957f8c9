use crate::board::{Board, in_bounds};
use crate::types::{Move, Piece, Player, Position};

const SIDEWAYS: [i32; 2] = [-1, 1];

/// All legal moves for `player`, honoring the mandatory-capture rule.
///
/// With `forced_from` set the generator is mid multi-jump chain: only
/// further jumps by that exact piece are legal, and an empty result means
/// the chain is exhausted (the turn controller ends the turn; simple
/// moves never become legal mid-chain). A missing or opposing piece at
/// `forced_from` also yields the empty list.
pub fn legal_moves(board: &Board, player: Player, forced_from: Option<Position>) -> Vec<Move> {
    if let Some(from) = forced_from {
        return match board.get(from) {
            Some(piece) if piece.owner == player => piece_moves(board, from, piece).jumps,
            _ => Vec::new(),
        };
    }

    let mut all_moves = Vec::new();
    let mut all_jumps = Vec::new();

    for row in 0..8u8 {
        for col in 0..8u8 {
            let from = Position::new(row, col);
            let Some(piece) = board.get(from) else {
                continue;
            };
            if piece.owner != player {
                continue;
            }

            let found = piece_moves(board, from, piece);
            all_moves.extend(found.moves);
            all_jumps.extend(found.jumps);
        }
    }

    // Mandatory capture: any available jump invalidates every simple move.
    if all_jumps.is_empty() { all_moves } else { all_jumps }
}

struct PieceMoves {
    moves: Vec<Move>,
    jumps: Vec<Move>,
}

/// Simple moves and jumps for one piece, discovered separately so the
/// caller can apply the mandatory-capture rule globally.
fn piece_moves(board: &Board, from: Position, piece: Piece) -> PieceMoves {
    let mut moves = Vec::new();
    let mut jumps = Vec::new();

    // Men travel toward the opponent's back rank only; kings both ways.
    let forward_only = [piece.owner.forward()];
    let directions: &[i32] = if piece.is_king { &[-1, 1] } else { &forward_only };

    for &dr in directions {
        for dc in SIDEWAYS {
            let step_row = from.row as i32 + dr;
            let step_col = from.col as i32 + dc;
            if !in_bounds(step_row, step_col) {
                continue;
            }

            let step = Position::new(step_row as u8, step_col as u8);
            match board.get(step) {
                None => moves.push(Move {
                    from,
                    to: step,
                    is_jump: false,
                    jumped: None,
                }),
                Some(blocker) if blocker.owner != piece.owner => {
                    let land_row = step_row + dr;
                    let land_col = step_col + dc;
                    if in_bounds(land_row, land_col) {
                        let land = Position::new(land_row as u8, land_col as u8);
                        if board.get(land).is_none() {
                            jumps.push(Move {
                                from,
                                to: land,
                                is_jump: true,
                                jumped: Some(step),
                            });
                        }
                    }
                }
                Some(_) => {}
            }
        }
    }

    PieceMoves { moves, jumps }
}
