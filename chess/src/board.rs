//! The board state: piece placement, side to move, castling rights,
//! en-passant square and move counters.
//!
//! Piece placement is stored twice: as bitboards (one per piece type, one per
//! side), which the move generator wants, and as a plain square-indexed
//! mailbox, which answers "what is standing on e4" without bit fiddling.
//! The two are kept in sync by funneling all mutations through `add_at` and
//! `remove_at`.

use crate::bitboard::Bitboard;
use crate::movegen::lookups::{
    bishop_attacks, rook_attacks, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS,
};
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;
use crate::zobrist::ZHash;
use anyhow::anyhow;
use colored::Colorize;
use itertools::Itertools;
use std::fmt::Display;
use std::str::FromStr;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Board {
    piece_bbs: [Bitboard; PieceType::COUNT],
    side_bbs: [Bitboard; Color::COUNT],
    mailbox: [Option<Piece>; Square::COUNT],

    /// The side to move
    pub current: Color,

    pub castling: CastlingRights,

    /// The square a double-pushed pawn skipped over on the previous move
    pub en_passant: Option<Square>,

    /// Plies since the last capture or pawn move, for the fifty-move rule
    pub halfmoves: u8,

    pub fullmoves: u16,

    /// Zobrist hash, updated incrementally
    pub hash: ZHash,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            piece_bbs: [Bitboard::EMPTY; PieceType::COUNT],
            side_bbs: [Bitboard::EMPTY; Color::COUNT],
            mailbox: [None; Square::COUNT],
            current: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmoves: 0,
            fullmoves: 1,
            hash: ZHash::default(),
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Piece placement
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn get_at(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq]
    }

    pub fn add_at(&mut self, sq: Square, piece: Piece) {
        let bb = Bitboard::from(sq);
        self.piece_bbs[piece.piece_type()] |= bb;
        self.side_bbs[piece.color()] |= bb;
        self.mailbox[sq] = Some(piece);
        self.hash.toggle_piece(piece, sq);
    }

    pub fn remove_at(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.mailbox[sq].take()?;
        let bb = Bitboard::from(sq);
        self.piece_bbs[piece.piece_type()] ^= bb;
        self.side_bbs[piece.color()] ^= bb;
        self.hash.toggle_piece(piece, sq);
        Some(piece)
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Occupancy queries
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn occupied_by(&self, side: Color) -> Bitboard {
        self.side_bbs[side]
    }

    pub fn all_occupied(&self) -> Bitboard {
        self.side_bbs[Color::White] | self.side_bbs[Color::Black]
    }

    pub fn bb(&self, ptype: PieceType, side: Color) -> Bitboard {
        self.piece_bbs[ptype] & self.side_bbs[side]
    }

    pub fn pawns(&self, side: Color) -> Bitboard {
        self.bb(PieceType::Pawn, side)
    }

    pub fn knights(&self, side: Color) -> Bitboard {
        self.bb(PieceType::Knight, side)
    }

    pub fn kings(&self, side: Color) -> Bitboard {
        self.bb(PieceType::King, side)
    }

    pub fn diag_sliders(&self, side: Color) -> Bitboard {
        (self.piece_bbs[PieceType::Bishop] | self.piece_bbs[PieceType::Queen])
            & self.side_bbs[side]
    }

    pub fn hv_sliders(&self, side: Color) -> Bitboard {
        (self.piece_bbs[PieceType::Rook] | self.piece_bbs[PieceType::Queen])
            & self.side_bbs[side]
    }

    pub fn king_sq(&self, side: Color) -> Square {
        self.kings(side).first().unwrap()
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Attack queries
    //
    ////////////////////////////////////////////////////////////////////////////

    /// All pieces (of either side) that attack `sq`, given an explicit
    /// occupancy. Passing a doctored occupancy is how SEE and the evasion
    /// generator look "through" pieces that are about to move away.
    pub fn attackers(&self, sq: Square, blockers: Bitboard) -> Bitboard {
        let knights = self.piece_bbs[PieceType::Knight];
        let kings = self.piece_bbs[PieceType::King];

        KNIGHT_ATTACKS[sq as usize] & knights
            | KING_ATTACKS[sq as usize] & kings
            | PAWN_ATTACKS[Color::Black][sq as usize] & self.pawns(Color::White)
            | PAWN_ATTACKS[Color::White][sq as usize] & self.pawns(Color::Black)
            | bishop_attacks(sq, blockers)
                & (self.diag_sliders(Color::White) | self.diag_sliders(Color::Black))
            | rook_attacks(sq, blockers)
                & (self.hv_sliders(Color::White) | self.hv_sliders(Color::Black))
    }

    pub fn is_attacked_by(&self, sq: Square, side: Color, blockers: Bitboard) -> bool {
        !(self.attackers(sq, blockers) & self.occupied_by(side) & blockers).is_empty()
    }

    /// The enemy pieces currently giving check.
    pub fn checkers(&self) -> Bitboard {
        let king_sq = self.king_sq(self.current);
        self.attackers(king_sq, self.all_occupied()) & self.occupied_by(!self.current)
    }

    pub fn in_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // FEN import/export
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;

            for file in 0..8 {
                match self.get_at(Square::from_index(8 * rank + file)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push_str(&piece.to_string());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push_str(&empty.to_string());
            }

            if rank > 0 {
                fen.push('/');
            }
        }

        let ep = self
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| String::from("-"));

        format!(
            "{fen} {} {} {ep} {} {}",
            self.current, self.castling, self.halfmoves, self.fullmoves
        )
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(fen: &str) -> anyhow::Result<Self> {
        let mut board = Board::empty();
        let mut parts = fen.split_whitespace();

        let placement = parts.next().ok_or(anyhow!("Empty FEN string"))?;
        let ranks = placement.split('/').collect_vec();

        if ranks.len() != 8 {
            return Err(anyhow!("FEN placement should have 8 ranks: {placement}"));
        }

        for (i, rank) in ranks.iter().enumerate() {
            let mut file = 0;

            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece: Piece = c.to_string().parse()?;
                    if file > 7 {
                        return Err(anyhow!("FEN rank overflows the board: {rank}"));
                    }
                    board.add_at(Square::from_index(8 * (7 - i) + file), piece);
                    file += 1;
                }
            }
        }

        board.current = parts.next().unwrap_or("w").parse()?;

        if board.current == Color::Black {
            board.hash.toggle_side();
        }

        board.castling = parts.next().unwrap_or("-").parse()?;
        board.hash.toggle_castling(board.castling.0);

        match parts.next().unwrap_or("-") {
            "-" => {}
            sq => {
                let sq: Square = sq.parse()?;
                board.en_passant = Some(sq);
                board.hash.toggle_ep(sq);
            }
        }

        board.halfmoves = parts.next().unwrap_or("0").parse()?;
        board.fullmoves = parts.next().unwrap_or("1").parse()?;

        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        START_FEN.parse().unwrap()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;

            for file in 0..8 {
                match self.get_at(Square::from_index(8 * rank + file)) {
                    Some(piece) if piece.color().is_white() => {
                        write!(f, " {}", piece.to_string().bright_white())?
                    }
                    Some(piece) => write!(f, " {}", piece.to_string().bright_blue())?,
                    None => write!(f, " .")?,
                }
            }

            writeln!(f)?;
        }

        writeln!(f, "\n   a b c d e f g h")?;
        writeln!(f, "\n  {}", self.to_fen())
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Castling rights
//
////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const WK: u8 = 0b0001;
    pub const WQ: u8 = 0b0010;
    pub const BK: u8 = 0b0100;
    pub const BQ: u8 = 0b1000;

    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    pub fn kingside(self, side: Color) -> bool {
        let mask = if side.is_white() { Self::WK } else { Self::BK };
        self.0 & mask != 0
    }

    pub fn queenside(self, side: Color) -> bool {
        let mask = if side.is_white() { Self::WQ } else { Self::BQ };
        self.0 & mask != 0
    }

    /// Drop the rights that are lost when a piece moves from, or a capture
    /// lands on, the given square.
    pub fn update(&mut self, sq: Square) {
        use Square::*;

        self.0 &= match sq {
            E1 => !(Self::WK | Self::WQ),
            H1 => !Self::WK,
            A1 => !Self::WQ,
            E8 => !(Self::BK | Self::BQ),
            H8 => !Self::BK,
            A8 => !Self::BQ,
            _ => 0b1111,
        };
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }

        if self.0 & Self::WK != 0 { write!(f, "K")?; }
        if self.0 & Self::WQ != 0 { write!(f, "Q")?; }
        if self.0 & Self::BK != 0 { write!(f, "k")?; }
        if self.0 & Self::BQ != 0 { write!(f, "q")?; }

        Ok(())
    }
}

impl FromStr for CastlingRights {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut rights = Self::NONE;

        if s == "-" {
            return Ok(rights);
        }

        for c in s.chars() {
            match c {
                'K' => rights.0 |= Self::WK,
                'Q' => rights.0 |= Self::WQ,
                'k' => rights.0 |= Self::BK,
                'q' => rights.0 |= Self::BQ,
                _ => return Err(anyhow!("Not a valid castling rights string: {s}")),
            }
        }

        Ok(rights)
    }
}
