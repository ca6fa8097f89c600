//! Pseudo-legal move generation.
//!
//! Moves are generated into a fixed-size buffer in well-defined categories:
//! captures (which include promotions), quiet moves, check evasions, and
//! quiet checking moves. The generators never test whether a move leaves the
//! own king hanging; that is the caller's job, either by playing the move and
//! looking, or by not caring (as the search does until it actually visits
//! the move).

pub mod generate;
pub mod lookups;
pub mod moves;
pub mod play_move;
pub mod pseudo_legal;

use crate::board::Board;
use crate::movegen::moves::Move;
use arrayvec::ArrayVec;

/// Upper bound on the number of pseudo-legal moves in any reachable chess
/// position. The highest count ever found is 218, so 256 gives headroom
/// without making the buffer unwieldy.
pub const MAX_MOVES: usize = 256;

const _: () = assert!(MAX_MOVES >= 218, "MAX_MOVES must cover the proven maximum");

pub type MoveList = ArrayVec<Move, MAX_MOVES>;

impl Board {
    /// Every pseudo-legal move: captures and quiets when not in check, the
    /// evasions otherwise.
    pub fn generate_all(&self, list: &mut MoveList) {
        if self.in_check() {
            self.generate_evasions(list);
        } else {
            self.generate_captures(list);
            self.generate_quiets(list);
        }
    }

    /// Count leaf nodes of the legal move tree, for validating the generator.
    pub fn perft(&self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        let mut list = MoveList::new();
        self.generate_all(&mut list);

        let mut nodes = 0;

        for &mv in list.iter() {
            let next = self.play_move(mv);

            if !next.is_attacked_by(
                next.king_sq(self.current),
                !self.current,
                next.all_occupied(),
            ) {
                nodes += if depth == 1 { 1 } else { next.perft(depth - 1) };
            }
        }

        nodes
    }

    /// Resolve a move in coordinate notation ("e2e4", "a7a8q") against the
    /// current position.
    pub fn find_move(&self, s: &str) -> anyhow::Result<Move> {
        use crate::piece::PieceType;
        use crate::square::Square;
        use anyhow::anyhow;

        if s.len() < 4 || s.len() > 5 {
            return Err(anyhow!("Not a valid move string: {s}"));
        }

        let src: Square = s.get(0..2).ok_or(anyhow!("Not a valid move string: {s}"))?.parse()?;
        let tgt: Square = s.get(2..4).ok_or(anyhow!("Not a valid move string: {s}"))?.parse()?;

        let promo = match s.get(4..).unwrap_or("") {
            "" => None,
            "n" => Some(PieceType::Knight),
            "b" => Some(PieceType::Bishop),
            "r" => Some(PieceType::Rook),
            "q" => Some(PieceType::Queen),
            _ => return Err(anyhow!("Not a valid promotion: {s}")),
        };

        let mut list = MoveList::new();
        self.generate_all(&mut list);

        list.iter()
            .copied()
            .find(|mv| mv.src() == src && mv.tgt() == tgt && mv.promo_type() == promo)
            .ok_or(anyhow!("No matching move in this position: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_startpos() {
        let board = Board::default();
        assert_eq!(board.perft(1), 20);
        assert_eq!(board.perft(2), 400);
        assert_eq!(board.perft(3), 8902);
        assert_eq!(board.perft(4), 197281);
    }

    #[test]
    fn perft_kiwipete() {
        let board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
                .parse()
                .unwrap();
        assert_eq!(board.perft(1), 48);
        assert_eq!(board.perft(2), 2039);
        assert_eq!(board.perft(3), 97862);
    }

    #[test]
    fn perft_en_passant_pins() {
        // Position 3 from the CPW perft suite, heavy on en-passant edge cases
        let board: Board = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1".parse().unwrap();
        assert_eq!(board.perft(1), 14);
        assert_eq!(board.perft(2), 191);
        assert_eq!(board.perft(3), 2812);
        assert_eq!(board.perft(4), 43238);
    }

    #[test]
    fn perft_promotions() {
        // Position 5 from the CPW perft suite
        let board: Board =
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8".parse().unwrap();
        assert_eq!(board.perft(1), 44);
        assert_eq!(board.perft(2), 1486);
        assert_eq!(board.perft(3), 62379);
    }

    #[test]
    fn find_move_resolves_flags() {
        let board = Board::default();
        let mv = board.find_move("e2e4").unwrap();
        assert!(mv.is_double_push());
        assert!(board.find_move("e2e5").is_err());

        let board: Board =
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8".parse().unwrap();
        let mv = board.find_move("d7c8q").unwrap();
        assert!(mv.is_capture() && mv.is_promotion());
    }
}
