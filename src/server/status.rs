//! Result codes returned to service callers.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a service request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ServiceStatus {
    Ok,
    /// No live session for the given token.
    InvalidOrExpiredSessionToken,
    /// The session has no game with the given id.
    InvalidGameId,
    /// A square name could not be parsed.
    InvalidMove,
    NotYourTurn,
    /// Well-formed, but not a legal move in the current position.
    IllegalMove,
    /// The game has already ended.
    GameOver,
}

impl ServiceStatus {
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, ServiceStatus::Ok)
    }

    /// `Ok(())` for `ServiceStatus::Ok`, the status itself otherwise.
    pub fn into_result(self) -> Result<(), ServiceStatus> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ServiceStatus::Ok => "ok",
            ServiceStatus::InvalidOrExpiredSessionToken => "invalid or expired session token",
            ServiceStatus::InvalidGameId => "invalid game id",
            ServiceStatus::InvalidMove => "invalid move",
            ServiceStatus::NotYourTurn => "not your turn",
            ServiceStatus::IllegalMove => "illegal move",
            ServiceStatus::GameOver => "game is over",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ServiceStatus {}
