//! Chess rules engine and server-side game sessions.
//!
//! `board` holds the rules: positions, legal moves, game status and FEN.
//! `server` wraps positions in shared game sessions with event logs,
//! matchmaking and a session registry.

pub mod board;
pub mod server;
pub mod sync;

pub use board::{Color, GameStatus, Move, Piece, Position, Square};
pub use server::{ChessService, GameSession, ServiceStatus};
