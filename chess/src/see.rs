//! Static exchange evaluation.
//!
//! `see_ge` answers "does this move win at least `threshold` material,
//! assuming both sides keep capturing on the target square with their least
//! valuable attacker?" without touching the search. The picker uses it to
//! split captures into winning and losing ones, and ProbCut uses it with a
//! positive threshold to find captures worth a shallow verification search.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen::lookups::{bishop_attacks, rook_attacks};
use crate::movegen::moves::Move;
use crate::piece::{Color, PieceType};
use crate::square::Square;

/// Material values for exchange purposes only; the evaluation has its own.
pub const SEE_VALUES: [i32; PieceType::COUNT] = [100, 300, 300, 500, 900, 0];

impl Board {
    /// Whether the static exchange on the move's target square comes out at
    /// or above `threshold` (in centipawns, from the mover's point of view).
    pub fn see_ge(&self, mv: Move, threshold: i32) -> bool {
        use PieceType::*;

        // Castling can never lose material: neither the king nor the rook
        // ends up capturable on its new square.
        if mv.is_castle() {
            return 0 >= threshold;
        }

        let src = mv.src();
        let tgt = mv.tgt();

        // Speculative gains per capture in the exchange, resolved by a
        // minimax sweep at the end. 32 pieces bounds the sequence.
        let mut gain = [0i32; 32];
        let mut depth = 0;

        gain[0] = if mv.is_capture() {
            if mv.is_en_passant() {
                SEE_VALUES[Pawn]
            } else {
                SEE_VALUES[self.get_at(tgt).unwrap().piece_type()]
            }
        } else {
            0
        };

        let mut on_square = match mv.promo_type() {
            Some(promo) => {
                gain[0] += SEE_VALUES[promo] - SEE_VALUES[Pawn];
                promo
            }
            None => self.get_at(src).unwrap().piece_type(),
        };

        let mut occ = self.all_occupied() ^ Bitboard::from(src);

        if mv.is_en_passant() {
            occ ^= Bitboard::from(mv.capture_sq());
        }

        let diag = self.diag_sliders(Color::White) | self.diag_sliders(Color::Black);
        let hv = self.hv_sliders(Color::White) | self.hv_sliders(Color::Black);

        let mut attackers = self.attackers(tgt, occ) & occ;
        let mut side = !self.current;

        loop {
            let Some(attacker_sq) = self.least_valuable(attackers & occ, side) else {
                break;
            };

            let attacker = self.get_at(attacker_sq).unwrap().piece_type();

            // The king may only recapture if the opponent has nothing left
            // to take it back with
            if attacker == King
                && !(attackers & occ & self.occupied_by(!side)).is_empty()
            {
                break;
            }

            depth += 1;
            gain[depth] = SEE_VALUES[on_square] - gain[depth - 1];
            on_square = attacker;

            occ ^= Bitboard::from(attacker_sq);

            // Capturing may uncover a slider lined up behind the attacker
            if matches!(attacker, Pawn | Bishop | Queen) {
                attackers |= bishop_attacks(tgt, occ) & diag;
            }
            if matches!(attacker, Rook | Queen) {
                attackers |= rook_attacks(tgt, occ) & hv;
            }

            side = !side;
        }

        // Each side may stop capturing when continuing would lose material
        while depth > 0 {
            gain[depth - 1] = -std::cmp::max(-gain[depth - 1], gain[depth]);
            depth -= 1;
        }

        gain[0] >= threshold
    }

    fn least_valuable(&self, attackers: Bitboard, side: Color) -> Option<Square> {
        let candidates = attackers & self.occupied_by(side);

        PieceType::ALL
            .iter()
            .find_map(|&ptype| (self.bb(ptype, side) & candidates).first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn losing_captures_fail_the_zero_threshold() {
        let board: Board = KIWIPETE.parse().unwrap();

        let mv = board.find_move("e5g6").unwrap();
        assert!(!board.see_ge(mv, 0), "Nxg6 gives up a knight for a pawn");

        let mv = board.find_move("e5d7").unwrap();
        assert!(!board.see_ge(mv, 0), "Nxd7 gives up a knight for a pawn");
    }

    #[test]
    fn even_and_winning_captures_pass() {
        let board: Board = KIWIPETE.parse().unwrap();

        let mv = board.find_move("e2a6").unwrap();
        assert!(board.see_ge(mv, 0), "Bxa6 trades bishops evenly");
        assert!(!board.see_ge(mv, 100), "but it does not win material");

        let mv = board.find_move("g2h3").unwrap();
        assert!(board.see_ge(mv, 0), "gxh3 wins a clean pawn");
        assert!(board.see_ge(mv, 100));
    }

    #[test]
    fn quiet_moves_measure_counterattacks() {
        let board: Board = KIWIPETE.parse().unwrap();

        // Walking the queen to h5 drops it to the g6 pawn
        let mv = board.find_move("f3h5").unwrap();
        assert!(!board.see_ge(mv, 0));

        // A quiet pawn push to a defended square holds
        let mv = board.find_move("a2a3").unwrap();
        assert!(board.see_ge(mv, 0));
    }

    #[test]
    fn promotions_count_the_new_piece() {
        let board: Board = "8/4P3/8/8/8/8/5k2/K7 w - - 0 1".parse().unwrap();
        let mv = board.find_move("e7e8q").unwrap();
        assert!(board.see_ge(mv, 700), "an unopposed promotion nets about a queen");

        // Promotion square covered by a rook: the new queen is lost
        let board: Board = "3r4/4P3/8/8/8/8/5k2/K7 w - - 0 1".parse().unwrap();
        let mv = board.find_move("e7e8q").unwrap();
        assert!(!board.see_ge(mv, 0));
    }

    #[test]
    fn threshold_shifts_the_verdict() {
        let board: Board = "4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1".parse().unwrap();
        let mv = board.find_move("d2d5").unwrap();
        assert!(board.see_ge(mv, 200), "an undefended rook beats +200");
        assert!(board.see_ge(mv, 500));
        assert!(!board.see_ge(mv, 501));
    }
}
