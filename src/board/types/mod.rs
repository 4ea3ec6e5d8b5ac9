//! Core chess types.
//!
//! This module contains the value types the rest of the board builds on:
//! - `Piece`, `Color` and `ColoredPiece` - piece types, colors, and their product
//! - `Square` - one of the 64 board coordinates
//! - `Bitboard` - a set of squares
//! - `Move` - a move together with its preconditions
//! - `CastlingRights` and `CastleSide` - castling state

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::{CastleSide, CastlingRights};
pub use moves::Move;
pub use piece::{Color, ColoredPiece, Piece};
pub use square::Square;
