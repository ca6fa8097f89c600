//! Applying moves to a board.
//!
//! Copy-make style: playing a move returns a fresh `Board`, leaving the
//! original untouched. The search keeps its boards on the stack, so undo is
//! just letting the copy go out of scope.

use crate::board::Board;
use crate::movegen::moves::{Move, MoveFlag};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

impl Board {
    pub fn play_move(&self, mv: Move) -> Board {
        use Square::*;

        let mut board = *self;
        let us = board.current;
        let src = mv.src();
        let tgt = mv.tgt();

        // Clear en-passant rights; they last exactly one ply
        if let Some(ep) = board.en_passant.take() {
            board.hash.toggle_ep(ep);
        }

        board.halfmoves += 1;

        if mv.is_capture() {
            board.remove_at(mv.capture_sq());
            board.halfmoves = 0;
        }

        let piece = board.remove_at(src).unwrap();

        if piece.piece_type() == PieceType::Pawn {
            board.halfmoves = 0;
        }

        match mv.promo_type() {
            Some(promo) => board.add_at(tgt, Piece::new(promo, us)),
            None => board.add_at(tgt, piece),
        }

        // The rook tags along on castles
        match mv.flag() {
            MoveFlag::CastleKing => {
                let (rook_src, rook_tgt) = if us.is_white() { (H1, F1) } else { (H8, F8) };
                let rook = board.remove_at(rook_src).unwrap();
                board.add_at(rook_tgt, rook);
            }

            MoveFlag::CastleQueen => {
                let (rook_src, rook_tgt) = if us.is_white() { (A1, D1) } else { (A8, D8) };
                let rook = board.remove_at(rook_src).unwrap();
                board.add_at(rook_tgt, rook);
            }

            MoveFlag::DoublePush => {
                let ep = src.forward(us).unwrap();
                board.en_passant = Some(ep);
                board.hash.toggle_ep(ep);
            }

            _ => {}
        }

        // Rights are lost when the king or a rook moves, or a rook is taken
        let rights_before = board.castling.0;
        board.castling.update(src);
        board.castling.update(tgt);

        if board.castling.0 != rights_before {
            board.hash.toggle_castling(rights_before);
            board.hash.toggle_castling(board.castling.0);
        }

        if us == Color::Black {
            board.fullmoves += 1;
        }

        board.current = !us;
        board.hash.toggle_side();

        board
    }

    /// Pass the turn without moving. Used by null-move pruning.
    pub fn play_null_move(&self) -> Board {
        let mut board = *self;

        if let Some(ep) = board.en_passant.take() {
            board.hash.toggle_ep(ep);
        }

        board.current = !board.current;
        board.hash.toggle_side();
        board.halfmoves += 1;

        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::START_FEN;

    #[test]
    fn plays_a_simple_opening() {
        let board = Board::default();
        let board = board.play_move(board.find_move("e2e4").unwrap());
        assert_eq!(board.en_passant, Some(Square::E3));

        let board = board.play_move(board.find_move("c7c5").unwrap());
        let board = board.play_move(board.find_move("g1f3").unwrap());

        assert_eq!(
            board.to_fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn castling_moves_the_rook() {
        let board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
                .parse()
                .unwrap();
        let board = board.play_move(board.find_move("e1g1").unwrap());

        assert_eq!(board.get_at(Square::G1), Some(Piece::WK));
        assert_eq!(board.get_at(Square::F1), Some(Piece::WR));
        assert_eq!(board.get_at(Square::H1), None);
        assert!(!board.castling.kingside(Color::White));
        assert!(!board.castling.queenside(Color::White));
        assert!(board.castling.kingside(Color::Black));
    }

    #[test]
    fn en_passant_removes_the_victim() {
        let board: Board =
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
                .parse()
                .unwrap();
        let board = board.play_move(board.find_move("e5f6").unwrap());

        assert_eq!(board.get_at(Square::F6), Some(Piece::WP));
        assert_eq!(board.get_at(Square::F5), None);
        assert_eq!(board.get_at(Square::E5), None);
    }

    #[test]
    fn hash_is_incremental() {
        // Transposing move orders must reach the same hash
        let a = Board::default();
        let a = a.play_move(a.find_move("g1f3").unwrap());
        let a = a.play_move(a.find_move("g8f6").unwrap());
        let a = a.play_move(a.find_move("b1c3").unwrap());

        let b = Board::default();
        let b = b.play_move(b.find_move("b1c3").unwrap());
        let b = b.play_move(b.find_move("g8f6").unwrap());
        let b = b.play_move(b.find_move("g1f3").unwrap());

        assert_eq!(a.hash, b.hash);

        // And the hash matches a from-scratch FEN parse
        let reparsed: Board = a.to_fen().parse().unwrap();
        assert_eq!(a.hash, reparsed.hash);

        // Null moves toggle the side key
        let board: Board = START_FEN.parse().unwrap();
        assert_ne!(board.hash, board.play_null_move().hash);
    }
}
