//! Validation of externally supplied moves.
//!
//! Hash moves, killers and counter-moves reach the picker from tables that
//! outlive any single position, so the move in hand may belong to a different
//! board entirely. `is_pseudo_legal` decides whether such a move could have
//! been produced by the generators for *this* position. It deliberately does
//! not prove full legality (the king may still be left hanging); the search
//! establishes that when it visits the move.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen::lookups::{
    bishop_attacks, queen_attacks, rook_attacks, BETWEEN, KING_ATTACKS, KNIGHT_ATTACKS,
    PAWN_ATTACKS, PAWN_DBLPUSHES, PAWN_PUSHES,
};
use crate::movegen::moves::{Move, MoveFlag};
use crate::piece::PieceType;

impl Board {
    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        use PieceType::*;

        if mv == Move::NONE {
            return false;
        }

        let us = self.current;
        let them = !us;
        let src = mv.src();
        let tgt = mv.tgt();
        let blockers = self.all_occupied();

        // The moved piece must exist and be ours
        let Some(piece) = self.get_at(src) else {
            return false;
        };

        if piece.color() != us {
            return false;
        }

        // Castling replicates the generator's conditions wholesale
        if mv.is_castle() {
            return piece.piece_type() == King && self.is_pseudo_legal_castle(mv);
        }

        // Target occupancy must agree with the capture flag
        if mv.is_capture() && !mv.is_en_passant() {
            match self.get_at(tgt) {
                Some(victim) if victim.color() == them => {}
                _ => return false,
            }
        } else if !mv.is_en_passant() && self.get_at(tgt).is_some() {
            return false;
        }

        // Flag bookkeeping that only pawns are allowed to carry
        if (mv.is_promotion() || mv.is_en_passant() || mv.is_double_push())
            && piece.piece_type() != Pawn
        {
            return false;
        }

        // Movement rules per piece type
        let moves_ok = match piece.piece_type() {
            Pawn => self.is_pseudo_legal_pawn(mv),
            Knight => KNIGHT_ATTACKS[src as usize].contains(tgt),
            Bishop => bishop_attacks(src, blockers).contains(tgt),
            Rook => rook_attacks(src, blockers).contains(tgt),
            Queen => queen_attacks(src, blockers).contains(tgt),
            King => KING_ATTACKS[src as usize].contains(tgt),
        };

        if !moves_ok {
            return false;
        }

        // When in check, the move must be one the evasion generator would
        // have produced
        if self.in_check() {
            return self.addresses_check(mv, piece.is_king());
        }

        true
    }

    fn is_pseudo_legal_pawn(&self, mv: Move) -> bool {
        let us = self.current;
        let src = mv.src();
        let tgt = mv.tgt();
        let blockers = self.all_occupied();

        let promo_rank = if us.is_white() { 7 } else { 0 };

        // A pawn arriving on the last rank must promote, and only there
        if (tgt.rank() == promo_rank) != mv.is_promotion() {
            return false;
        }

        if mv.is_en_passant() {
            return self.en_passant == Some(tgt)
                && PAWN_ATTACKS[us][src as usize].contains(tgt);
        }

        if mv.is_double_push() {
            let step = PAWN_PUSHES[us][src as usize];
            return PAWN_DBLPUSHES[us][src as usize].contains(tgt)
                && (step & blockers).is_empty()
                && !blockers.contains(tgt);
        }

        if mv.is_capture() {
            PAWN_ATTACKS[us][src as usize].contains(tgt)
        } else {
            PAWN_PUSHES[us][src as usize].contains(tgt)
        }
    }

    fn is_pseudo_legal_castle(&self, mv: Move) -> bool {
        if self.in_check() {
            return false;
        }

        let mut list = crate::movegen::MoveList::new();
        self.generate_quiets(&mut list);

        list.contains(&mv)
    }

    /// Mirror of the evasion generator's filter: king steps must leave the
    /// checked ray, other moves must block or capture a lone checker.
    fn addresses_check(&self, mv: Move, is_king_move: bool) -> bool {
        let us = self.current;
        let them = !us;
        let blockers = self.all_occupied();
        let king_sq = self.king_sq(us);
        let checkers = self.checkers();

        if is_king_move {
            let without_king = blockers ^ Bitboard::from(king_sq);
            return !self.is_attacked_by(mv.tgt(), them, without_king);
        }

        if checkers.has_many() {
            return false;
        }

        let checker_sq = checkers.first().unwrap();
        let block_mask = BETWEEN[king_sq as usize][checker_sq as usize];

        if mv.is_en_passant() {
            return mv.capture_sq() == checker_sq || block_mask.contains(mv.tgt());
        }

        mv.tgt() == checker_sq || block_mask.contains(mv.tgt())
    }
}
