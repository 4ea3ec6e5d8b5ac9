//! Move descriptor.

use std::fmt;

use super::bitboard::Bitboard;
use super::castling::CastleSide;
use super::piece::Piece;
use super::square::Square;

/// A candidate or legal move together with the preconditions it needs.
///
/// Candidate moves are pure geometry. The capture square and the promotion
/// piece are refined on a copy while the move is validated and applied; the
/// memoized candidate tables are never touched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    from: Square,
    to: Square,
    capture: Option<Square>,
    must_be_empty: Bitboard,
    must_be_safe: Bitboard,
    capture_only: bool,
    castling: Option<CastleSide>,
    en_passant_target: Option<Square>,
    promotion: Option<Piece>,
}

impl Move {
    const fn base(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            capture: Some(to),
            must_be_empty: Bitboard::EMPTY,
            must_be_safe: Bitboard::EMPTY,
            capture_only: false,
            castling: None,
            en_passant_target: None,
            promotion: None,
        }
    }

    /// A jump (knight, king step) that may capture on `to`.
    #[must_use]
    pub const fn step(from: Square, to: Square) -> Self {
        Move::base(from, to)
    }

    /// A ray move that may capture on `to` and needs `between` vacant.
    #[must_use]
    pub const fn slide(from: Square, to: Square, between: Bitboard) -> Self {
        Move {
            must_be_empty: between,
            ..Move::base(from, to)
        }
    }

    /// A non-capturing pawn advance. `en_passant_target` is set for the double step.
    #[must_use]
    pub const fn pawn_push(
        from: Square,
        to: Square,
        must_be_empty: Bitboard,
        en_passant_target: Option<Square>,
    ) -> Self {
        Move {
            capture: None,
            must_be_empty,
            en_passant_target,
            ..Move::base(from, to)
        }
    }

    /// A diagonal pawn move, legal only when something is captured.
    #[must_use]
    pub const fn pawn_capture(from: Square, to: Square) -> Self {
        Move {
            capture_only: true,
            ..Move::base(from, to)
        }
    }

    /// The king's half of a castling move.
    #[must_use]
    pub const fn castle(
        from: Square,
        to: Square,
        side: CastleSide,
        must_be_empty: Bitboard,
        must_be_safe: Bitboard,
    ) -> Self {
        Move {
            capture: None,
            must_be_empty,
            must_be_safe,
            castling: Some(side),
            ..Move::base(from, to)
        }
    }

    /// A plain relocation that never captures (the rook's half of castling).
    #[must_use]
    pub const fn relocation(from: Square, to: Square) -> Self {
        Move {
            capture: None,
            ..Move::base(from, to)
        }
    }

    #[inline]
    #[must_use]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[inline]
    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Square whose occupant is removed by this move, if any.
    ///
    /// Differs from `to` for en passant.
    #[inline]
    #[must_use]
    pub const fn capture(&self) -> Option<Square> {
        self.capture
    }

    #[inline]
    #[must_use]
    pub const fn must_be_empty(&self) -> Bitboard {
        self.must_be_empty
    }

    #[inline]
    #[must_use]
    pub const fn must_be_safe(&self) -> Bitboard {
        self.must_be_safe
    }

    #[inline]
    #[must_use]
    pub const fn is_capture_only(&self) -> bool {
        self.capture_only
    }

    #[inline]
    #[must_use]
    pub const fn castling(&self) -> Option<CastleSide> {
        self.castling
    }

    /// En passant target this move creates (pawn double step only).
    #[inline]
    #[must_use]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// Piece a pawn turned into, known only after the move is applied.
    #[inline]
    #[must_use]
    pub const fn promotion(&self) -> Option<Piece> {
        self.promotion
    }

    #[inline]
    pub(crate) fn set_capture(&mut self, capture: Option<Square>) {
        self.capture = capture;
    }

    #[inline]
    pub(crate) fn set_promotion(&mut self, piece: Piece) {
        assert!(piece != Piece::Pawn, "cannot promote to a pawn");
        self.promotion = Some(piece);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.castling {
            Some(CastleSide::King) => write!(f, "O-O"),
            Some(CastleSide::Queen) => write!(f, "O-O-O"),
            None => {
                let sep = if self.capture.is_some() { 'x' } else { '-' };
                write!(f, "{}{}{}", self.from, sep, self.to)?;
                if let Some(piece) = self.promotion {
                    write!(f, "={}", piece.to_char().to_ascii_uppercase())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_equality_is_by_value() {
        let a = Move::step(sq("g1"), sq("f3"));
        let b = Move::step(sq("g1"), sq("f3"));
        assert_eq!(a, b);
        assert_ne!(a, Move::relocation(sq("g1"), sq("f3")));
    }

    #[test]
    fn test_pawn_push_never_captures() {
        let mv = Move::pawn_push(
            sq("e2"),
            sq("e4"),
            [sq("e3"), sq("e4")].into_iter().collect(),
            Some(sq("e3")),
        );
        assert_eq!(mv.capture(), None);
        assert_eq!(mv.en_passant_target(), Some(sq("e3")));
        assert!(!mv.is_capture_only());
    }

    #[test]
    fn test_display() {
        assert_eq!(Move::step(sq("g1"), sq("f3")).to_string(), "g1xf3");
        assert_eq!(Move::relocation(sq("h1"), sq("f1")).to_string(), "h1-f1");
        let castle = Move::castle(
            sq("e1"),
            sq("g1"),
            CastleSide::King,
            Bitboard::EMPTY,
            Bitboard::EMPTY,
        );
        assert_eq!(castle.to_string(), "O-O");
    }

    #[test]
    #[should_panic(expected = "cannot promote to a pawn")]
    fn test_promotion_to_pawn_panics() {
        let mut mv = Move::pawn_push(sq("a7"), sq("a8"), Bitboard::EMPTY, None);
        mv.set_promotion(Piece::Pawn);
    }
}
