//! Colors, piece types, and the twelve concrete pieces.

use anyhow::anyhow;
use std::fmt::Display;
use std::ops::{Index, IndexMut, Not};
use std::str::FromStr;
use Color::*;
use PieceType::*;

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const COUNT: usize = 2;

    pub fn is_white(self) -> bool {
        self == White
    }
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            White => Black,
            Black => White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            White => write!(f, "w"),
            Black => write!(f, "b"),
        }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "w" => Ok(White),
            "b" => Ok(Black),
            _ => Err(anyhow!("Not a valid color: {s}")),
        }
    }
}

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [Pawn, Knight, Bishop, Rook, Queen, King];

    /// The lowercase letter used for this piece type in move notation.
    pub fn label(self) -> char {
        match self {
            Pawn => 'p',
            Knight => 'n',
            Bishop => 'b',
            Rook => 'r',
            Queen => 'q',
            King => 'k',
        }
    }
}

/// A concrete piece: a piece type belonging to one of the two sides.
///
/// The discriminant is laid out as `6 * color + piece_type`, so both
/// components can be recovered with cheap arithmetic.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Piece {
    WP, WN, WB, WR, WQ, WK,
    BP, BN, BB, BR, BQ, BK,
}

impl Piece {
    pub const COUNT: usize = 12;

    #[rustfmt::skip]
    pub const ALL: [Self; Self::COUNT] = [
        Piece::WP, Piece::WN, Piece::WB, Piece::WR, Piece::WQ, Piece::WK,
        Piece::BP, Piece::BN, Piece::BB, Piece::BR, Piece::BQ, Piece::BK,
    ];

    pub const fn new(ptype: PieceType, color: Color) -> Self {
        Self::ALL[color as usize * 6 + ptype as usize]
    }

    pub const fn color(self) -> Color {
        if (self as usize) < 6 {
            White
        } else {
            Black
        }
    }

    pub const fn piece_type(self) -> PieceType {
        PieceType::ALL[self as usize % 6]
    }

    pub fn is_pawn(self) -> bool {
        self.piece_type() == Pawn
    }

    pub fn is_king(self) -> bool {
        self.piece_type() == King
    }

    /// Rooks, bishops and queens move along rays and can be blocked.
    pub fn is_slider(self) -> bool {
        matches!(self.piece_type(), Bishop | Rook | Queen)
    }

    pub fn is_diag_slider(self) -> bool {
        matches!(self.piece_type(), Bishop | Queen)
    }

    pub fn is_hv_slider(self) -> bool {
        matches!(self.piece_type(), Rook | Queen)
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.piece_type().label();

        if self.color().is_white() {
            write!(f, "{}", label.to_ascii_uppercase())
        } else {
            write!(f, "{label}")
        }
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        use Piece::*;

        match s {
            "P" => Ok(WP), "N" => Ok(WN), "B" => Ok(WB),
            "R" => Ok(WR), "Q" => Ok(WQ), "K" => Ok(WK),
            "p" => Ok(BP), "n" => Ok(BN), "b" => Ok(BB),
            "r" => Ok(BR), "q" => Ok(BQ), "k" => Ok(BK),
            _ => Err(anyhow!("Not a valid piece: {s}")),
        }
    }
}

impl<T> Index<Color> for [T; Color::COUNT] {
    type Output = T;

    fn index(&self, color: Color) -> &Self::Output {
        // SAFETY: the discriminant is always in bounds
        unsafe { self.get_unchecked(color as usize) }
    }
}

impl<T> IndexMut<Color> for [T; Color::COUNT] {
    fn index_mut(&mut self, color: Color) -> &mut Self::Output {
        // SAFETY: the discriminant is always in bounds
        unsafe { self.get_unchecked_mut(color as usize) }
    }
}

impl<T> Index<PieceType> for [T; PieceType::COUNT] {
    type Output = T;

    fn index(&self, ptype: PieceType) -> &Self::Output {
        // SAFETY: the discriminant is always in bounds
        unsafe { self.get_unchecked(ptype as usize) }
    }
}

impl<T> IndexMut<PieceType> for [T; PieceType::COUNT] {
    fn index_mut(&mut self, ptype: PieceType) -> &mut Self::Output {
        // SAFETY: the discriminant is always in bounds
        unsafe { self.get_unchecked_mut(ptype as usize) }
    }
}

impl<T> Index<Piece> for [T; Piece::COUNT] {
    type Output = T;

    fn index(&self, piece: Piece) -> &Self::Output {
        // SAFETY: the discriminant is always in bounds
        unsafe { self.get_unchecked(piece as usize) }
    }
}

impl<T> IndexMut<Piece> for [T; Piece::COUNT] {
    fn index_mut(&mut self, piece: Piece) -> &mut Self::Output {
        // SAFETY: the discriminant is always in bounds
        unsafe { self.get_unchecked_mut(piece as usize) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_roundtrip() {
        for piece in Piece::ALL {
            assert_eq!(Piece::new(piece.piece_type(), piece.color()), piece);
            assert_eq!(piece.to_string().parse::<Piece>().unwrap(), piece);
        }
    }

    #[test]
    fn colors_and_types() {
        assert_eq!(Piece::BN.color(), Black);
        assert_eq!(Piece::BN.piece_type(), Knight);
        assert!(Piece::WQ.is_slider() && Piece::WQ.is_diag_slider());
        assert!(!Piece::WN.is_slider());
    }
}
