//! Castling rights type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

const CASTLE_WHITE_K: u8 = 1 << 0;
const CASTLE_WHITE_Q: u8 = 1 << 1;
const CASTLE_BLACK_K: u8 = 1 << 2;
const CASTLE_BLACK_Q: u8 = 1 << 3;

const ALL_CASTLING_RIGHTS: u8 = CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// The side of the board a king castles toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// Square the rook starts on for this side.
    #[must_use]
    pub fn rook_home(self, color: Color) -> Square {
        let file = match self {
            CastleSide::King => 7,
            CastleSide::Queen => 0,
        };
        Square::ALL[color.back_rank() * 8 + file]
    }

    /// File direction the king travels (+1 toward h, -1 toward a).
    #[must_use]
    pub(crate) const fn direction(self) -> isize {
        match self {
            CastleSide::King => 1,
            CastleSide::Queen => -1,
        }
    }
}

/// Castling rights: four independent flags, only ever revoked during play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// No castling rights
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    /// All castling rights (both sides can castle kingside and queenside)
    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(ALL_CASTLING_RIGHTS)
    }

    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::bit_for(color, side) != 0
    }

    /// Grant a right. Only used while decoding a position.
    #[inline]
    pub(crate) fn set(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::bit_for(color, side);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::bit_for(color, side);
    }

    #[inline]
    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::King);
        self.revoke(color, CastleSide::Queen);
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// FEN castling field in the fixed `KQkq` order, or `-`.
    #[must_use]
    pub fn to_fen(self) -> String {
        let mut field = String::with_capacity(4);
        for (color, side, c) in FEN_ORDER {
            if self.has(color, side) {
                field.push(c);
            }
        }
        if field.is_empty() {
            field.push('-');
        }
        field
    }

    /// Right named by a FEN castling letter.
    #[must_use]
    pub(crate) fn from_fen_char(c: char) -> Option<(Color, CastleSide)> {
        FEN_ORDER
            .iter()
            .find(|(_, _, letter)| *letter == c)
            .map(|(color, side, _)| (*color, *side))
    }

    #[inline]
    const fn bit_for(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => CASTLE_WHITE_K,
            (Color::White, CastleSide::Queen) => CASTLE_WHITE_Q,
            (Color::Black, CastleSide::King) => CASTLE_BLACK_K,
            (Color::Black, CastleSide::Queen) => CASTLE_BLACK_Q,
        }
    }
}

const FEN_ORDER: [(Color, CastleSide, char); 4] = [
    (Color::White, CastleSide::King, 'K'),
    (Color::White, CastleSide::Queen, 'Q'),
    (Color::Black, CastleSide::King, 'k'),
    (Color::Black, CastleSide::Queen, 'q'),
];
