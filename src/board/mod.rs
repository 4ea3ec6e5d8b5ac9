//! Chess board representation and game rules.
//!
//! A `Position` keeps a full index of legal moves for both colors and a game
//! status, and rebuilds both after every move. Candidate moves come from
//! per-piece tables that are filled once, on first use.
//!
//! # Example
//! ```
//! use chess_hub::board::{GameStatus, Position, Square};
//!
//! let mut pos = Position::new();
//! let e2: Square = "e2".parse().unwrap();
//! let e4: Square = "e4".parse().unwrap();
//! assert_eq!(pos.legal_destinations(e2).len(), 2);
//! assert_eq!(pos.make_move(e2, e4).len(), 1);
//! assert_eq!(pos.status(), GameStatus::BlackToMove);
//! ```

mod candidates;
mod error;
mod fen;
mod legality;
mod make_move;
mod placement;
mod state;
mod status;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, SquareError};
pub use legality::attack_reach;
pub use placement::Placement;
pub use state::Position;
pub use status::GameStatus;
pub use types::{
    Bitboard, BitboardIter, CastleSide, CastlingRights, Color, ColoredPiece, Move, Piece, Square,
};
