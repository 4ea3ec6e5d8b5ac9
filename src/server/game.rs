//! A game between two players: position, event log, long-poll waiters and
//! the draw/resign protocol, all behind one lock.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;

use super::event::{EventKind, GameEvent, GameEventDraft};
use super::registry::GameId;
use super::status::ServiceStatus;
use crate::board::{Color, GameStatus, Piece, Position, Square};

/// Receives events for a long-poll. Called at most once.
pub type EventsCallback = Box<dyn FnOnce(Vec<GameEvent>) + Send>;

struct GameState {
    position: Position,
    events: Vec<GameEvent>,
    /// Minimum sequence number -> callbacks waiting for it.
    waiters: BTreeMap<u64, Vec<EventsCallback>>,
    draw_offer: Option<Color>,
}

impl GameState {
    fn add_event(&mut self, id: GameId, draft: GameEventDraft) -> GameEvent {
        let sequence = self.events.len() as u64;
        let event = GameEvent::from_draft(sequence, draft);
        self.events.push(event.clone());

        let later = self.waiters.split_off(&(sequence + 1));
        let ready = std::mem::replace(&mut self.waiters, later);
        let count: usize = ready.values().map(Vec::len).sum();
        debug!(
            "game {id}: event {sequence} {:?}, waking {count} waiter(s)",
            event.kind
        );
        for callback in ready.into_values().flatten() {
            callback(vec![event.clone()]);
        }
        event
    }

    fn end_game(&mut self, id: GameId) {
        let status = self.position.status();
        info!("game {id} ended: {status}");
        self.add_event(id, GameEventDraft::new(EventKind::GameEnded, status));
    }
}

/// One game and its event log.
///
/// Every operation takes the game's lock for its whole duration. Event
/// callbacks run while that lock is held and must not call back into the
/// same game.
pub struct GameSession {
    id: GameId,
    white: String,
    black: String,
    state: Mutex<GameState>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("white", &self.white)
            .field("black", &self.black)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// A new game from the standard starting position.
    #[must_use]
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        GameSession::with_position(white, black, Position::new())
    }

    #[must_use]
    pub fn with_position(
        white: impl Into<String>,
        black: impl Into<String>,
        position: Position,
    ) -> Self {
        GameSession {
            id: GameId::new(),
            white: white.into(),
            black: black.into(),
            state: Mutex::new(GameState {
                position,
                events: Vec::new(),
                waiters: BTreeMap::new(),
                draw_offer: None,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    #[must_use]
    pub fn white(&self) -> &str {
        &self.white
    }

    #[must_use]
    pub fn black(&self) -> &str {
        &self.black
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.state.lock().position.status()
    }

    /// FEN of the current position.
    #[must_use]
    pub fn fen(&self) -> String {
        self.state.lock().position.to_fen()
    }

    /// Run `f` against the current position under the game lock.
    pub fn with_position_ref<R>(&self, f: impl FnOnce(&Position) -> R) -> R {
        f(&self.state.lock().position)
    }

    #[must_use]
    pub fn draw_offer(&self) -> Option<Color> {
        self.state.lock().draw_offer
    }

    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.state.lock().events.len() as u64
    }

    pub fn set_promotion_piece(&self, color: Color, piece: Piece) {
        self.state.lock().position.set_promotion_piece(color, piece);
    }

    /// Append an event and wake every waiter whose minimum sequence number
    /// it reaches.
    pub fn add_event(&self, draft: GameEventDraft) -> GameEvent {
        self.state.lock().add_event(self.id, draft)
    }

    /// Deliver all events numbered `min_seq` or later. If there are none yet,
    /// `callback` is parked and runs once, with the first such event, from
    /// whichever call appends it.
    pub fn get_events<F>(&self, min_seq: u64, callback: F)
    where
        F: FnOnce(Vec<GameEvent>) + Send + 'static,
    {
        let mut state = self.state.lock();
        match usize::try_from(min_seq) {
            Ok(start) if start < state.events.len() => callback(state.events[start..].to_vec()),
            _ => {
                debug!("game {}: parking waiter for event {min_seq}", self.id);
                state
                    .waiters
                    .entry(min_seq)
                    .or_default()
                    .push(Box::new(callback));
            }
        }
    }

    /// Blocking form of `get_events`: waits up to `timeout` and returns an
    /// empty list if nothing arrived.
    pub fn wait_events(&self, min_seq: u64, timeout: Duration) -> Vec<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.get_events(min_seq, move |events| {
            // The receiver is gone if the wait already timed out.
            let _ = tx.send(events);
        });
        rx.recv_timeout(timeout).unwrap_or_default()
    }

    /// Play a move for `color`, given as square names.
    pub fn make_move(&self, color: Color, from: &str, to: &str) -> ServiceStatus {
        let (Ok(from), Ok(to)) = (from.parse::<Square>(), to.parse::<Square>()) else {
            return ServiceStatus::InvalidMove;
        };

        let mut state = self.state.lock();
        if state.position.status().is_terminal() {
            return ServiceStatus::GameOver;
        }
        if state.position.active_color() != color {
            return ServiceStatus::NotYourTurn;
        }
        let applied = state.position.make_move(from, to);
        if applied.is_empty() {
            return ServiceStatus::IllegalMove;
        }

        state.draw_offer = None;
        let status = state.position.status();
        state.add_event(self.id, GameEventDraft::move_made(status, &applied));
        if status.is_terminal() {
            state.end_game(self.id);
        }
        ServiceStatus::Ok
    }

    pub fn resign(&self, color: Color) -> ServiceStatus {
        let mut state = self.state.lock();
        if state.position.status().is_terminal() {
            return ServiceStatus::GameOver;
        }
        state.position.resign(color);
        state.draw_offer = None;
        state.end_game(self.id);
        ServiceStatus::Ok
    }

    /// Offer a draw, or accept the opponent's outstanding offer.
    pub fn add_draw_offer(&self, color: Color) -> ServiceStatus {
        let mut state = self.state.lock();
        if state.position.status().is_terminal() {
            return ServiceStatus::GameOver;
        }
        let outstanding = state.draw_offer;
        match outstanding {
            None => {
                state.draw_offer = Some(color);
                let status = state.position.status();
                state.add_event(
                    self.id,
                    GameEventDraft::new(EventKind::offered_draw(color), status),
                );
            }
            Some(offerer) if offerer == color => {}
            Some(_) => {
                state.draw_offer = None;
                state.position.agree_draw();
                state.end_game(self.id);
            }
        }
        ServiceStatus::Ok
    }

    /// Withdraw one's own offer or decline the opponent's. No-op if there is
    /// no outstanding offer.
    pub fn clear_draw_offer(&self, color: Color) -> ServiceStatus {
        let mut state = self.state.lock();
        let Some(offerer) = state.draw_offer.take() else {
            return ServiceStatus::Ok;
        };
        let kind = if offerer == color {
            EventKind::DrawOfferWithdrawn
        } else {
            EventKind::DrawOfferDeclined
        };
        let status = state.position.status();
        state.add_event(self.id, GameEventDraft::new(kind, status));
        ServiceStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    fn collector() -> (Arc<StdMutex<Vec<Vec<GameEvent>>>>, impl FnOnce(Vec<GameEvent>) + Send) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |events| sink.lock().unwrap().push(events))
    }

    fn kinds(game: &GameSession) -> Vec<EventKind> {
        game.wait_events(0, Duration::ZERO)
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_sequence_numbers_are_contiguous() {
        let game = GameSession::new("w", "b");
        for expected in 0..3 {
            let event = game.add_event(GameEventDraft::new(
                EventKind::DrawOfferDeclined,
                GameStatus::WhiteToMove,
            ));
            assert_eq!(event.sequence, expected);
        }
        assert_eq!(game.event_count(), 3);
    }

    #[test]
    fn test_existing_events_delivered_immediately() {
        let game = GameSession::new("w", "b");
        assert_eq!(game.make_move(Color::White, "e2", "e4"), ServiceStatus::Ok);
        assert_eq!(game.make_move(Color::Black, "e7", "e5"), ServiceStatus::Ok);
        let (seen, callback) = collector();
        game.get_events(1, callback);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 1);
        assert_eq!(seen[0][0].sequence, 1);
        assert_eq!(seen[0][0].moves[0].from, "e7");
    }

    #[test]
    fn test_parked_waiter_fires_exactly_once() {
        let game = GameSession::new("w", "b");
        let (seen, callback) = collector();
        game.get_events(1, callback);
        game.make_move(Color::White, "e2", "e4");
        assert!(seen.lock().unwrap().is_empty());
        game.make_move(Color::Black, "e7", "e5");
        game.make_move(Color::White, "g1", "f3");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 1);
        assert_eq!(seen[0][0].sequence, 1);
    }

    #[test]
    fn test_wait_events_times_out_empty() {
        let game = GameSession::new("w", "b");
        assert!(game.wait_events(0, Duration::from_millis(10)).is_empty());
    }

    #[test]
    fn test_wait_events_wakes_on_append() {
        let game = Arc::new(GameSession::new("w", "b"));
        let mover = Arc::clone(&game);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            mover.make_move(Color::White, "d2", "d4")
        });
        let events = game.wait_events(0, Duration::from_secs(5));
        assert_eq!(handle.join().unwrap(), ServiceStatus::Ok);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::MoveMade);
    }

    #[test]
    fn test_move_request_statuses() {
        let game = GameSession::new("w", "b");
        assert_eq!(game.make_move(Color::White, "e9", "e4"), ServiceStatus::InvalidMove);
        assert_eq!(game.make_move(Color::Black, "e7", "e5"), ServiceStatus::NotYourTurn);
        assert_eq!(game.make_move(Color::White, "e2", "e5"), ServiceStatus::IllegalMove);
        assert_eq!(game.event_count(), 0);
    }

    #[test]
    fn test_checkmate_emits_game_ended() {
        let game = GameSession::new("w", "b");
        for (color, from, to) in [
            (Color::White, "f2", "f3"),
            (Color::Black, "e7", "e5"),
            (Color::White, "g2", "g4"),
            (Color::Black, "d8", "h4"),
        ] {
            assert_eq!(game.make_move(color, from, to), ServiceStatus::Ok);
        }
        let events = game.wait_events(3, Duration::ZERO);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::MoveMade);
        assert_eq!(events[0].status, GameStatus::WhiteCheckmated);
        assert_eq!(events[1].kind, EventKind::GameEnded);
        assert_eq!(game.make_move(Color::White, "a2", "a3"), ServiceStatus::GameOver);
    }

    #[test]
    fn test_castling_event_has_two_moves() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let game = GameSession::with_position("w", "b", pos);
        assert_eq!(game.make_move(Color::White, "e1", "g1"), ServiceStatus::Ok);
        let event = &game.wait_events(0, Duration::ZERO)[0];
        assert_eq!(event.moves.len(), 2);
        assert_eq!(event.moves[1].from, "h1");
        assert_eq!(event.moves[1].to, "f1");
    }

    #[test]
    fn test_resign() {
        let game = GameSession::new("w", "b");
        assert_eq!(game.resign(Color::White), ServiceStatus::Ok);
        assert_eq!(game.status(), GameStatus::WhiteResigned);
        assert_eq!(kinds(&game), vec![EventKind::GameEnded]);
        assert_eq!(game.resign(Color::Black), ServiceStatus::GameOver);
    }

    #[test]
    fn test_offer_then_counter_offer_is_agreement() {
        let game = GameSession::new("w", "b");
        game.add_draw_offer(Color::White);
        game.add_draw_offer(Color::White);
        assert_eq!(game.draw_offer(), Some(Color::White));
        game.add_draw_offer(Color::Black);
        assert_eq!(game.status(), GameStatus::DrawByAgreement);
        assert_eq!(game.draw_offer(), None);
        assert_eq!(
            kinds(&game),
            vec![EventKind::WhiteOfferedDraw, EventKind::GameEnded]
        );
    }

    #[test]
    fn test_move_silently_clears_offer() {
        let game = GameSession::new("w", "b");
        game.add_draw_offer(Color::Black);
        game.make_move(Color::White, "e2", "e4");
        assert_eq!(game.draw_offer(), None);
        game.add_draw_offer(Color::White);
        assert_eq!(game.status(), GameStatus::BlackToMove);
        assert_eq!(
            kinds(&game),
            vec![
                EventKind::BlackOfferedDraw,
                EventKind::MoveMade,
                EventKind::WhiteOfferedDraw
            ]
        );
    }

    #[test]
    fn test_withdraw_and_decline() {
        let game = GameSession::new("w", "b");
        assert_eq!(game.clear_draw_offer(Color::White), ServiceStatus::Ok);
        assert_eq!(game.event_count(), 0);
        game.add_draw_offer(Color::White);
        game.clear_draw_offer(Color::White);
        game.add_draw_offer(Color::White);
        game.clear_draw_offer(Color::Black);
        assert_eq!(
            kinds(&game),
            vec![
                EventKind::WhiteOfferedDraw,
                EventKind::DrawOfferWithdrawn,
                EventKind::WhiteOfferedDraw,
                EventKind::DrawOfferDeclined
            ]
        );
        assert_eq!(game.draw_offer(), None);
    }

    #[test]
    fn test_configured_promotion() {
        let pos = Position::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1");
        let game = GameSession::with_position("w", "b", pos);
        game.set_promotion_piece(Color::White, Piece::Rook);
        game.make_move(Color::White, "a7", "a8");
        assert!(game.fen().starts_with("R6k/"));
    }
}
