//! Request-level entry points: token and game-id resolution in front of the
//! game and matchmaking operations.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use super::event::GameEvent;
use super::game::GameSession;
use super::matchmaker::{Matchmaker, SeekResponse};
use super::options::ServiceOptions;
use super::poller::EventPoller;
use super::registry::{GameId, SessionRegistry, SessionToken};
use super::status::ServiceStatus;
use crate::board::Color;

/// The chess service. Share it across request threads behind an `Arc`.
pub struct ChessService {
    options: ServiceOptions,
    registry: SessionRegistry,
    matchmaker: Matchmaker,
}

impl Default for ChessService {
    fn default() -> Self {
        ChessService::new()
    }
}

impl ChessService {
    #[must_use]
    pub fn new() -> Self {
        ChessService::with_options(ServiceOptions::default())
    }

    #[must_use]
    pub fn with_options(options: ServiceOptions) -> Self {
        ChessService {
            matchmaker: Matchmaker::from_options(&options),
            registry: SessionRegistry::new(),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn matchmaker(&self) -> &Matchmaker {
        &self.matchmaker
    }

    pub fn login(&self, username: &str) -> SessionToken {
        let session = self.registry.login(username);
        info!("{username} logged in");
        session.token()
    }

    /// Ask for an opponent. `callback` runs once a game has been created,
    /// possibly during this call if another seek was waiting.
    pub fn seek<F>(&self, token: &SessionToken, callback: F) -> ServiceStatus
    where
        F: FnOnce(SeekResponse) + Send + 'static,
    {
        let Some(session) = self.registry.get(token) else {
            return reject("seek", ServiceStatus::InvalidOrExpiredSessionToken);
        };
        self.matchmaker.seek(&session, callback);
        ServiceStatus::Ok
    }

    /// The game and the caller's color in it.
    pub fn game(
        &self,
        token: &SessionToken,
        game_id: &GameId,
    ) -> Result<(Arc<GameSession>, Color), ServiceStatus> {
        let session = self
            .registry
            .get(token)
            .ok_or(ServiceStatus::InvalidOrExpiredSessionToken)?;
        session.game(game_id).ok_or(ServiceStatus::InvalidGameId)
    }

    pub fn make_move(
        &self,
        token: &SessionToken,
        game_id: &GameId,
        from: &str,
        to: &str,
    ) -> ServiceStatus {
        match self.game(token, game_id) {
            Ok((game, color)) => match game.make_move(color, from, to) {
                ServiceStatus::Ok => ServiceStatus::Ok,
                status => reject("move", status),
            },
            Err(status) => reject("move", status),
        }
    }

    /// Long-poll for events numbered `min_seq` or later.
    pub fn get_events<F>(
        &self,
        token: &SessionToken,
        game_id: &GameId,
        min_seq: u64,
        callback: F,
    ) -> ServiceStatus
    where
        F: FnOnce(Vec<GameEvent>) + Send + 'static,
    {
        match self.game(token, game_id) {
            Ok((game, _)) => {
                game.get_events(min_seq, callback);
                ServiceStatus::Ok
            }
            Err(status) => reject("get events", status),
        }
    }

    /// Blocking long-poll; an empty list means the wait timed out.
    pub fn wait_events(
        &self,
        token: &SessionToken,
        game_id: &GameId,
        min_seq: u64,
        timeout: Duration,
    ) -> Result<Vec<GameEvent>, ServiceStatus> {
        let (game, _) = self.game(token, game_id)?;
        Ok(game.wait_events(min_seq, timeout))
    }

    /// Follow a game from `from_seq` on a background thread, long-polling
    /// with the configured poll timeout.
    pub fn follow_game<H>(
        &self,
        token: &SessionToken,
        game_id: &GameId,
        from_seq: u64,
        handler: H,
    ) -> Result<EventPoller, ServiceStatus>
    where
        H: FnMut(&GameEvent) + Send + 'static,
    {
        match self.game(token, game_id) {
            Ok((game, _)) => Ok(EventPoller::start(
                game,
                from_seq,
                self.options.poll_timeout(),
                handler,
            )),
            Err(status) => Err(reject("follow game", status)),
        }
    }

    pub fn resign(&self, token: &SessionToken, game_id: &GameId) -> ServiceStatus {
        self.game_action("resign", token, game_id, GameSession::resign)
    }

    pub fn offer_draw(&self, token: &SessionToken, game_id: &GameId) -> ServiceStatus {
        self.game_action("offer draw", token, game_id, GameSession::add_draw_offer)
    }

    /// Decline the opponent's offer, or withdraw one's own.
    pub fn decline_draw_offer(&self, token: &SessionToken, game_id: &GameId) -> ServiceStatus {
        self.game_action("decline draw", token, game_id, GameSession::clear_draw_offer)
    }

    /// FEN of the game's current position.
    pub fn position(&self, token: &SessionToken, game_id: &GameId) -> Result<String, ServiceStatus> {
        let (game, _) = self.game(token, game_id)?;
        Ok(game.fen())
    }

    fn game_action(
        &self,
        name: &str,
        token: &SessionToken,
        game_id: &GameId,
        action: fn(&GameSession, Color) -> ServiceStatus,
    ) -> ServiceStatus {
        let status = match self.game(token, game_id) {
            Ok((game, color)) => action(&*game, color),
            Err(status) => status,
        };
        if status.is_ok() {
            status
        } else {
            reject(name, status)
        }
    }
}

fn reject(request: &str, status: ServiceStatus) -> ServiceStatus {
    warn!("{request} rejected: {status}");
    status
}
