//! Server-side game coordination: per-game event logs with long-poll
//! delivery, matchmaking, and the session table.
//!
//! Locking: each `GameSession` has its own lock; the `Matchmaker` has one
//! more. The matchmaking lock is never taken while a game lock is held.

mod event;
mod game;
mod matchmaker;
mod options;
mod poller;
mod registry;
mod service;
mod status;

pub use event::{EventKind, GameEvent, GameEventDraft, MoveRecord};
pub use game::{EventsCallback, GameSession};
pub use matchmaker::{Matchmaker, SeekCallback, SeekOutcome, SeekResponse};
pub use options::ServiceOptions;
pub use poller::EventPoller;
pub use registry::{GameId, SessionRegistry, SessionToken, UserSession};
pub use service::ChessService;
pub use status::ServiceStatus;
