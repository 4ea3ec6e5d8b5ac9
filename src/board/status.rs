//! Game status enumeration.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Color;

/// Where a game stands after the last ply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GameStatus {
    WhiteToMove,
    BlackToMove,
    WhiteChecked,
    BlackChecked,
    WhiteCheckmated,
    BlackCheckmated,
    WhiteStalemated,
    BlackStalemated,
    WhiteResigned,
    BlackResigned,
    HalfmoveClockExpired,
    ThreefoldRepetition,
    InsufficientMaterial,
    DrawByAgreement,
    /// Declared for callers; time controls are not enforced here.
    WhiteClockExpired,
    /// Declared for callers; time controls are not enforced here.
    BlackClockExpired,
}

impl GameStatus {
    /// True once the game is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(
            self,
            GameStatus::WhiteToMove
                | GameStatus::BlackToMove
                | GameStatus::WhiteChecked
                | GameStatus::BlackChecked
        )
    }

    #[must_use]
    pub(crate) const fn to_move(color: Color, checked: bool) -> Self {
        match (color, checked) {
            (Color::White, false) => GameStatus::WhiteToMove,
            (Color::White, true) => GameStatus::WhiteChecked,
            (Color::Black, false) => GameStatus::BlackToMove,
            (Color::Black, true) => GameStatus::BlackChecked,
        }
    }

    /// Status for `color` having no legal move.
    #[must_use]
    pub(crate) const fn no_moves(color: Color, checked: bool) -> Self {
        match (color, checked) {
            (Color::White, true) => GameStatus::WhiteCheckmated,
            (Color::White, false) => GameStatus::WhiteStalemated,
            (Color::Black, true) => GameStatus::BlackCheckmated,
            (Color::Black, false) => GameStatus::BlackStalemated,
        }
    }

    #[must_use]
    pub const fn resigned(color: Color) -> Self {
        match color {
            Color::White => GameStatus::WhiteResigned,
            Color::Black => GameStatus::BlackResigned,
        }
    }

    /// True for any drawn outcome.
    #[must_use]
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::WhiteStalemated
                | GameStatus::BlackStalemated
                | GameStatus::HalfmoveClockExpired
                | GameStatus::ThreefoldRepetition
                | GameStatus::InsufficientMaterial
                | GameStatus::DrawByAgreement
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameStatus::WhiteToMove => "white to move",
            GameStatus::BlackToMove => "black to move",
            GameStatus::WhiteChecked => "white is in check",
            GameStatus::BlackChecked => "black is in check",
            GameStatus::WhiteCheckmated => "white is checkmated",
            GameStatus::BlackCheckmated => "black is checkmated",
            GameStatus::WhiteStalemated => "white is stalemated",
            GameStatus::BlackStalemated => "black is stalemated",
            GameStatus::WhiteResigned => "white resigned",
            GameStatus::BlackResigned => "black resigned",
            GameStatus::HalfmoveClockExpired => "draw by the fifty-move rule",
            GameStatus::ThreefoldRepetition => "draw by threefold repetition",
            GameStatus::InsufficientMaterial => "draw by insufficient material",
            GameStatus::DrawByAgreement => "draw by agreement",
            GameStatus::WhiteClockExpired => "white ran out of time",
            GameStatus::BlackClockExpired => "black ran out of time",
        };
        f.write_str(text)
    }
}
