//! A small tapered evaluation: material plus piece-square tables, blended
//! between a middlegame and an endgame weighting by the material left on the
//! board. It is deliberately modest; its job is to give the search something
//! sane to maximize.

use crate::search::params::Score;
use chess::board::Board;
use chess::piece::{Color, PieceType};

pub const MG_VALUES: [Score; PieceType::COUNT] = [82, 337, 365, 477, 1025, 0];
pub const EG_VALUES: [Score; PieceType::COUNT] = [94, 281, 297, 512, 936, 0];

/// Each side's share of these sums to 12 with full material; the blend runs
/// on the combined total, capped at 24.
const PHASE_WEIGHTS: [i32; PieceType::COUNT] = [0, 1, 1, 2, 4, 0];
const MAX_PHASE: i32 = 24;

/// A small bonus for having the move.
const TEMPO: Score = 10;

/// Piece-square tables, written as seen from white's side of the board
/// (rank 8 on top), so the indexing below flips the square for white.
#[rustfmt::skip]
const PSQT: [[Score; 64]; PieceType::COUNT] = [
    // Pawns: push towards promotion, hold the center
    [
          0,   0,   0,   0,   0,   0,   0,   0,
         50,  50,  50,  50,  50,  50,  50,  50,
         10,  10,  20,  30,  30,  20,  10,  10,
          5,   5,  10,  25,  25,  10,   5,   5,
          0,   0,   0,  20,  20,   0,   0,   0,
          5,  -5, -10,   0,   0, -10,  -5,   5,
          5,  10,  10, -20, -20,  10,  10,   5,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // Knights: rim is grim
    [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20,   0,   0,   0,   0, -20, -40,
        -30,   0,  10,  15,  15,  10,   0, -30,
        -30,   5,  15,  20,  20,  15,   5, -30,
        -30,   0,  15,  20,  20,  15,   0, -30,
        -30,   5,  10,  15,  15,  10,   5, -30,
        -40, -20,   0,   5,   5,   0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // Bishops: long diagonals
    [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -10,   0,   5,  10,  10,   5,   0, -10,
        -10,   5,   5,  10,  10,   5,   5, -10,
        -10,   0,  10,  10,  10,  10,   0, -10,
        -10,  10,  10,  10,  10,  10,  10, -10,
        -10,   5,   0,   0,   0,   0,   5, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // Rooks: seventh rank and open-ish center files
    [
          0,   0,   0,   0,   0,   0,   0,   0,
          5,  10,  10,  10,  10,  10,  10,   5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
          0,   0,   0,   5,   5,   0,   0,   0,
    ],
    // Queens: stay flexible, avoid early wandering
    [
        -20, -10, -10,  -5,  -5, -10, -10, -20,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -10,   0,   5,   5,   5,   5,   0, -10,
         -5,   0,   5,   5,   5,   5,   0,  -5,
          0,   0,   5,   5,   5,   5,   0,  -5,
        -10,   5,   5,   5,   5,   5,   0, -10,
        -10,   0,   5,   0,   0,   0,   0, -10,
        -20, -10, -10,  -5,  -5, -10, -10, -20,
    ],
    // Kings: hide in the corner until the endgame
    [
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -20, -30, -30, -40, -40, -30, -30, -20,
        -10, -20, -20, -20, -20, -20, -20, -10,
         20,  20,   0,   0,   0,   0,  20,  20,
         20,  30,  10,   0,   0,  10,  30,  20,
    ],
];

/// The static evaluation, in centipawns, from the side to move's point of
/// view.
pub fn evaluate(board: &Board) -> Score {
    let mut mg = 0;
    let mut eg = 0;
    let mut phase = 0;

    for side in [Color::White, Color::Black] {
        let sign = if side == board.current { 1 } else { -1 };

        for ptype in PieceType::ALL {
            for sq in board.bb(ptype, side) {
                // The tables read top-down, so white flips its squares
                let idx = if side.is_white() {
                    sq as usize ^ 56
                } else {
                    sq as usize
                };

                mg += sign * (MG_VALUES[ptype] + PSQT[ptype][idx]);
                eg += sign * (EG_VALUES[ptype] + PSQT[ptype][idx]);
                phase += PHASE_WEIGHTS[ptype];
            }
        }
    }

    let phase = phase.min(MAX_PHASE);

    TEMPO + (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE
}
