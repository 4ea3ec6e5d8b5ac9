//! Game event records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::{Color, GameStatus, Move};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EventKind {
    MoveMade,
    GameEnded,
    WhiteOfferedDraw,
    BlackOfferedDraw,
    DrawOfferDeclined,
    DrawOfferWithdrawn,
}

impl EventKind {
    #[must_use]
    pub const fn offered_draw(color: Color) -> Self {
        match color {
            Color::White => EventKind::WhiteOfferedDraw,
            Color::Black => EventKind::BlackOfferedDraw,
        }
    }
}

/// One relocation of a `MOVE_MADE` event, as square names.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoveRecord {
    pub from: String,
    pub to: String,
}

impl From<&Move> for MoveRecord {
    fn from(mv: &Move) -> Self {
        MoveRecord {
            from: mv.from().name(),
            to: mv.to().name(),
        }
    }
}

/// An event before it is given a sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEventDraft {
    pub kind: EventKind,
    pub status: GameStatus,
    pub moves: Vec<MoveRecord>,
}

impl GameEventDraft {
    #[must_use]
    pub fn new(kind: EventKind, status: GameStatus) -> Self {
        GameEventDraft {
            kind,
            status,
            moves: Vec::new(),
        }
    }

    /// `MOVE_MADE` carrying every applied move, king first for castling.
    #[must_use]
    pub fn move_made(status: GameStatus, applied: &[Move]) -> Self {
        GameEventDraft {
            kind: EventKind::MoveMade,
            status,
            moves: applied.iter().map(MoveRecord::from).collect(),
        }
    }
}

/// An entry of a game's event log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameEvent {
    /// Position in the log, counting from 0 with no gaps.
    pub sequence: u64,
    pub kind: EventKind,
    /// Game status right after the event.
    pub status: GameStatus,
    /// Empty unless `kind` is `MoveMade`.
    pub moves: Vec<MoveRecord>,
}

impl GameEvent {
    pub(crate) fn from_draft(sequence: u64, draft: GameEventDraft) -> Self {
        GameEvent {
            sequence,
            kind: draft.kind,
            status: draft.status,
            moves: draft.moves,
        }
    }
}
