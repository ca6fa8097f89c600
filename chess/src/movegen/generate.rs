//! The four pseudo-legal move generators: captures, quiets, evasions and
//! quiet checks.
//!
//! Within one generator the order is fixed: knights, bishops, rooks, queens,
//! then pawns, then the king. The picker relies on this order being
//! deterministic to break ties between equally-scored moves.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen::lookups::{
    bishop_attacks, queen_attacks, rook_attacks, BETWEEN, KING_ATTACKS, KNIGHT_ATTACKS,
    PAWN_ATTACKS, PAWN_DBLPUSHES, PAWN_PUSHES,
};
use crate::movegen::moves::{Move, MoveFlag};
use crate::movegen::MoveList;
use crate::piece::{Color, PieceType};
use crate::square::Square;

/// The rank a pawn promotes on, as a rank index.
fn promo_rank(side: Color) -> usize {
    if side.is_white() {
        7
    } else {
        0
    }
}

fn push_promos(list: &mut MoveList, src: Square, tgt: Square, capture: bool) {
    use PieceType::*;

    for ptype in [Queen, Rook, Bishop, Knight] {
        list.push(Move::new(src, tgt, MoveFlag::promo(ptype, capture)));
    }
}

impl Board {
    fn slider_attacks(&self, ptype: PieceType, sq: Square, blockers: Bitboard) -> Bitboard {
        match ptype {
            PieceType::Bishop => bishop_attacks(sq, blockers),
            PieceType::Rook => rook_attacks(sq, blockers),
            _ => queen_attacks(sq, blockers),
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Captures (and promotions)
    //
    ////////////////////////////////////////////////////////////////////////////

    /// All pseudo-legal captures, en-passant included, plus all promotions.
    /// Promotions ride along because the picker scores and tries them with
    /// the captures.
    pub fn generate_captures(&self, list: &mut MoveList) {
        use PieceType::*;

        let us = self.current;
        let theirs = self.occupied_by(!us);
        let blockers = self.all_occupied();

        for sq in self.knights(us) {
            for tgt in KNIGHT_ATTACKS[sq as usize] & theirs {
                list.push(Move::new(sq, tgt, MoveFlag::Capture));
            }
        }

        for ptype in [Bishop, Rook, Queen] {
            for sq in self.bb(ptype, us) {
                for tgt in self.slider_attacks(ptype, sq, blockers) & theirs {
                    list.push(Move::new(sq, tgt, MoveFlag::Capture));
                }
            }
        }

        for sq in self.pawns(us) {
            for tgt in PAWN_ATTACKS[us][sq as usize] & theirs {
                if tgt.rank() == promo_rank(us) {
                    push_promos(list, sq, tgt, true);
                } else {
                    list.push(Move::new(sq, tgt, MoveFlag::Capture));
                }
            }

            // Push promotions count as tacticals
            for tgt in PAWN_PUSHES[us][sq as usize] & !blockers {
                if tgt.rank() == promo_rank(us) {
                    push_promos(list, sq, tgt, false);
                }
            }

            if let Some(ep) = self.en_passant {
                if PAWN_ATTACKS[us][sq as usize].contains(ep) {
                    list.push(Move::new(sq, ep, MoveFlag::EnPassant));
                }
            }
        }

        let king_sq = self.king_sq(us);
        for tgt in KING_ATTACKS[king_sq as usize] & theirs {
            list.push(Move::new(king_sq, tgt, MoveFlag::Capture));
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Quiet moves
    //
    ////////////////////////////////////////////////////////////////////////////

    /// All pseudo-legal non-captures, except promotions.
    pub fn generate_quiets(&self, list: &mut MoveList) {
        use PieceType::*;

        let us = self.current;
        let blockers = self.all_occupied();
        let empty = !blockers;

        for sq in self.knights(us) {
            for tgt in KNIGHT_ATTACKS[sq as usize] & empty {
                list.push(Move::new(sq, tgt, MoveFlag::Quiet));
            }
        }

        for ptype in [Bishop, Rook, Queen] {
            for sq in self.bb(ptype, us) {
                for tgt in self.slider_attacks(ptype, sq, blockers) & empty {
                    list.push(Move::new(sq, tgt, MoveFlag::Quiet));
                }
            }
        }

        for sq in self.pawns(us) {
            let push = PAWN_PUSHES[us][sq as usize] & empty;

            for tgt in push {
                if tgt.rank() != promo_rank(us) {
                    list.push(Move::new(sq, tgt, MoveFlag::Quiet));
                }
            }

            if !push.is_empty() {
                for tgt in PAWN_DBLPUSHES[us][sq as usize] & empty {
                    list.push(Move::new(sq, tgt, MoveFlag::DoublePush));
                }
            }
        }

        let king_sq = self.king_sq(us);
        for tgt in KING_ATTACKS[king_sq as usize] & empty {
            list.push(Move::new(king_sq, tgt, MoveFlag::Quiet));
        }

        self.generate_castles(list);
    }

    /// Castling moves. Generated fully legally: rights intact, path empty,
    /// king not in check and not passing through an attacked square.
    fn generate_castles(&self, list: &mut MoveList) {
        use Square::*;

        let us = self.current;
        let them = !us;
        let blockers = self.all_occupied();

        if self.in_check() {
            return;
        }

        let (king_from, h_rook, a_rook) = if us.is_white() {
            (E1, H1, A1)
        } else {
            (E8, H8, A8)
        };

        if self.castling.kingside(us) {
            let (mid, tgt) = if us.is_white() { (F1, G1) } else { (F8, G8) };

            if (BETWEEN[king_from as usize][h_rook as usize] & blockers).is_empty()
                && !self.is_attacked_by(mid, them, blockers)
                && !self.is_attacked_by(tgt, them, blockers)
            {
                list.push(Move::new(king_from, tgt, MoveFlag::CastleKing));
            }
        }

        if self.castling.queenside(us) {
            let (mid, tgt) = if us.is_white() { (D1, C1) } else { (D8, C8) };

            if (BETWEEN[king_from as usize][a_rook as usize] & blockers).is_empty()
                && !self.is_attacked_by(mid, them, blockers)
                && !self.is_attacked_by(tgt, them, blockers)
            {
                list.push(Move::new(king_from, tgt, MoveFlag::CastleQueen));
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Evasions
    //
    ////////////////////////////////////////////////////////////////////////////

    /// Moves that address a check: king steps to safe squares, and (against
    /// a single checker) blocks and captures of the checker.
    pub fn generate_evasions(&self, list: &mut MoveList) {
        use PieceType::*;

        let us = self.current;
        let them = !us;
        let theirs = self.occupied_by(them);
        let blockers = self.all_occupied();
        let king_sq = self.king_sq(us);
        let checkers = self.checkers();

        // King steps. The king square is removed from the occupancy so that
        // stepping along the checking ray is recognized as still attacked.
        let without_king = blockers ^ Bitboard::from(king_sq);

        for tgt in KING_ATTACKS[king_sq as usize] & !self.occupied_by(us) {
            if self.is_attacked_by(tgt, them, without_king) {
                continue;
            }

            let flag = if theirs.contains(tgt) {
                MoveFlag::Capture
            } else {
                MoveFlag::Quiet
            };
            list.push(Move::new(king_sq, tgt, flag));
        }

        // Against a double check only the king can move
        if checkers.has_many() {
            return;
        }

        let checker_sq = checkers.first().unwrap();
        let block_mask = BETWEEN[king_sq as usize][checker_sq as usize];
        let target_mask = block_mask | checkers;

        for sq in self.knights(us) {
            for tgt in KNIGHT_ATTACKS[sq as usize] & target_mask {
                let flag = if tgt == checker_sq {
                    MoveFlag::Capture
                } else {
                    MoveFlag::Quiet
                };
                list.push(Move::new(sq, tgt, flag));
            }
        }

        for ptype in [Bishop, Rook, Queen] {
            for sq in self.bb(ptype, us) {
                for tgt in self.slider_attacks(ptype, sq, blockers) & target_mask {
                    let flag = if tgt == checker_sq {
                        MoveFlag::Capture
                    } else {
                        MoveFlag::Quiet
                    };
                    list.push(Move::new(sq, tgt, flag));
                }
            }
        }

        for sq in self.pawns(us) {
            // Capture the checker
            if PAWN_ATTACKS[us][sq as usize].contains(checker_sq) {
                if checker_sq.rank() == promo_rank(us) {
                    push_promos(list, sq, checker_sq, true);
                } else {
                    list.push(Move::new(sq, checker_sq, MoveFlag::Capture));
                }
            }

            // En-passant, when the checker is the double-pushed pawn itself
            // (or, rarely, when the en-passant square blocks the check)
            if let Some(ep) = self.en_passant {
                if PAWN_ATTACKS[us][sq as usize].contains(ep) {
                    let victim = Move::new(sq, ep, MoveFlag::EnPassant).capture_sq();

                    if victim == checker_sq || block_mask.contains(ep) {
                        list.push(Move::new(sq, ep, MoveFlag::EnPassant));
                    }
                }
            }

            // Block by pushing
            let push = PAWN_PUSHES[us][sq as usize] & !blockers;

            for tgt in push & block_mask {
                if tgt.rank() == promo_rank(us) {
                    push_promos(list, sq, tgt, false);
                } else {
                    list.push(Move::new(sq, tgt, MoveFlag::Quiet));
                }
            }

            if !push.is_empty() {
                for tgt in PAWN_DBLPUSHES[us][sq as usize] & !blockers & block_mask {
                    list.push(Move::new(sq, tgt, MoveFlag::DoublePush));
                }
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Quiet checks
    //
    ////////////////////////////////////////////////////////////////////////////

    /// Non-capturing moves that give direct check to the enemy king. Used by
    /// the quiescence search at its shallowest depth.
    pub fn generate_quiet_checks(&self, list: &mut MoveList) {
        use PieceType::*;

        let us = self.current;
        let blockers = self.all_occupied();
        let empty = !blockers;
        let their_king = self.king_sq(!us);

        let check_sqs = |ptype: PieceType| -> Bitboard {
            match ptype {
                Knight => KNIGHT_ATTACKS[their_king as usize],
                Bishop => bishop_attacks(their_king, blockers),
                Rook => rook_attacks(their_king, blockers),
                _ => queen_attacks(their_king, blockers),
            }
        };

        for sq in self.knights(us) {
            for tgt in KNIGHT_ATTACKS[sq as usize] & empty & check_sqs(Knight) {
                list.push(Move::new(sq, tgt, MoveFlag::Quiet));
            }
        }

        for ptype in [Bishop, Rook, Queen] {
            for sq in self.bb(ptype, us) {
                let attacks = self.slider_attacks(ptype, sq, blockers);

                for tgt in attacks & empty & check_sqs(ptype) {
                    list.push(Move::new(sq, tgt, MoveFlag::Quiet));
                }
            }
        }

        // A pawn checks from the squares its victim would attack from
        let pawn_checks = PAWN_ATTACKS[!us][their_king as usize];

        for sq in self.pawns(us) {
            let push = PAWN_PUSHES[us][sq as usize] & empty;

            for tgt in push & pawn_checks {
                if tgt.rank() != promo_rank(us) {
                    list.push(Move::new(sq, tgt, MoveFlag::Quiet));
                }
            }

            if !push.is_empty() {
                for tgt in PAWN_DBLPUSHES[us][sq as usize] & empty & pawn_checks {
                    list.push(Move::new(sq, tgt, MoveFlag::DoublePush));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves_of(board: &Board, gen: impl Fn(&Board, &mut MoveList)) -> Vec<String> {
        let mut list = MoveList::new();
        gen(board, &mut list);
        list.iter().map(|mv| mv.to_string()).collect()
    }

    #[test]
    fn startpos_quiets_lead_with_knights() {
        let board = Board::default();
        let quiets = moves_of(&board, Board::generate_quiets);

        assert_eq!(quiets.len(), 20);
        assert_eq!(&quiets[..4], &["b1a3", "b1c3", "g1f3", "g1h3"]);
        assert!(quiets.contains(&"e2e4".to_string()));
    }

    #[test]
    fn startpos_has_no_captures() {
        let board = Board::default();
        assert!(moves_of(&board, Board::generate_captures).is_empty());
    }

    #[test]
    fn captures_include_en_passant_and_promotions() {
        let board: Board =
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8".parse().unwrap();
        let captures = moves_of(&board, Board::generate_captures);

        assert!(captures.contains(&"d7c8q".to_string()));
        assert!(captures.contains(&"d7c8n".to_string()));
        assert!(captures.contains(&"c4f7".to_string()));
        assert!(captures.contains(&"e1f2".to_string()));

        let board: Board =
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
                .parse()
                .unwrap();
        let captures = moves_of(&board, Board::generate_captures);
        assert!(captures.contains(&"e5f6".to_string()));
    }

    #[test]
    fn evasions_against_a_rook_check() {
        // Black rook on e8 checks the king on e1; the knight can block on e3
        let board: Board = "4r2k/8/8/8/8/8/2N5/R3K3 w - - 0 1".parse().unwrap();
        assert!(board.in_check());

        let mut evasions = moves_of(&board, Board::generate_evasions);
        evasions.sort();

        assert_eq!(
            evasions,
            vec!["c2e3", "e1d1", "e1d2", "e1f1", "e1f2"],
            "king steps off the file or the knight blocks"
        );
    }

    #[test]
    fn king_cannot_step_along_the_check_ray() {
        let board: Board = "4k3/8/8/8/8/8/8/4q1K1 w - - 0 1".parse().unwrap();
        let mut evasions = moves_of(&board, Board::generate_evasions);
        evasions.sort();

        // h1 stays attacked once the king vacates g1
        assert_eq!(evasions, vec!["g1g2", "g1h2"]);
    }

    #[test]
    fn double_check_only_king_moves() {
        let board: Board = "4k3/8/8/8/7b/3n4/4P3/4K3 w - - 0 1".parse().unwrap();
        assert!(board.checkers().has_many());

        let evasions = moves_of(&board, Board::generate_evasions);
        assert!(!evasions.is_empty());
        assert!(evasions.iter().all(|mv| mv.starts_with("e1")));
    }

    #[test]
    fn quiet_checks_find_direct_checks() {
        let board: Board = "8/5k2/8/8/8/8/3N4/4K2Q w - - 0 1".parse().unwrap();
        let mut checks = moves_of(&board, Board::generate_quiet_checks);
        checks.sort();

        // Every queen move onto the f-file, the 7th rank or the h5-e8
        // diagonal checks f7; the knight on d2 reaches no checking square
        assert_eq!(checks, vec!["h1b7", "h1d5", "h1f1", "h1f3", "h1h5", "h1h7"]);
    }
}
