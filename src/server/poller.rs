//! Background listener that follows a game's event log.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use super::event::{EventKind, GameEvent};
use super::game::GameSession;
use crate::sync::StopFlag;

/// Follows a game from a given sequence number, handing each event to a
/// handler in order on its own thread.
///
/// Ends by itself after delivering `GAME_ENDED`, or when stopped. Only one
/// long-poll is outstanding at a time; a timed-out poll stays registered
/// and is reused by the next wait.
pub struct EventPoller {
    stop: StopFlag,
    handle: Option<JoinHandle<u64>>,
}

impl EventPoller {
    /// Start listening at `from_seq`. `timeout` bounds how long a stop
    /// request can go unnoticed.
    pub fn start<H>(game: Arc<GameSession>, from_seq: u64, timeout: Duration, handler: H) -> Self
    where
        H: FnMut(&GameEvent) + Send + 'static,
    {
        let stop = StopFlag::new();
        let flag = stop.clone();
        let handle = thread::spawn(move || run(&game, from_seq, timeout, &flag, handler));
        EventPoller {
            stop,
            handle: Some(handle),
        }
    }

    /// A handle that stops this poller when raised.
    #[must_use]
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Ask the poller to stop and wait for it. Returns the next sequence
    /// number it would have asked for.
    pub fn stop(mut self) -> u64 {
        self.stop.stop();
        self.join_inner()
    }

    /// Wait for the poller to end on its own (after `GAME_ENDED`).
    pub fn join(mut self) -> u64 {
        self.join_inner()
    }

    fn join_inner(&mut self) -> u64 {
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(next)) => next,
            Some(Err(panic)) => std::panic::resume_unwind(panic),
            None => 0,
        }
    }
}

impl Drop for EventPoller {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop.stop();
            let _ = self.handle.take().map(JoinHandle::join);
        }
    }
}

fn run<H>(game: &GameSession, from_seq: u64, timeout: Duration, stop: &StopFlag, mut handler: H) -> u64
where
    H: FnMut(&GameEvent),
{
    let (tx, rx) = mpsc::channel::<Vec<GameEvent>>();
    let mut next = from_seq;
    let mut waiting = false;
    while !stop.is_stopped() {
        if !waiting {
            let tx = tx.clone();
            game.get_events(next, move |events| {
                let _ = tx.send(events);
            });
            waiting = true;
        }
        let events = match rx.recv_timeout(timeout) {
            Ok(events) => events,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        waiting = false;
        for event in events {
            next = event.sequence + 1;
            handler(&event);
            if event.kind == EventKind::GameEnded {
                debug!("poller for game {} saw the game end", game.id());
                return next;
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;
    use std::sync::Mutex;

    fn recording_poller(game: &Arc<GameSession>, from: u64) -> (EventPoller, Arc<Mutex<Vec<u64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let poller = EventPoller::start(
            Arc::clone(game),
            from,
            Duration::from_millis(10),
            move |e| sink.lock().unwrap().push(e.sequence),
        );
        (poller, seen)
    }

    #[test]
    fn test_poller_ends_after_game_ended() {
        let game = Arc::new(GameSession::new("w", "b"));
        let (poller, seen) = recording_poller(&game, 0);
        game.make_move(Color::White, "e2", "e4");
        game.resign(Color::Black);
        assert_eq!(poller.join(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_poller_stops_on_request() {
        let game = Arc::new(GameSession::new("w", "b"));
        let (poller, seen) = recording_poller(&game, 0);
        game.make_move(Color::White, "e2", "e4");
        // Let the poller pick up the move before stopping it.
        for _ in 0..500 {
            if !seen.lock().unwrap().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(poller.stop(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_poller_catches_up_from_offset() {
        let game = Arc::new(GameSession::new("w", "b"));
        game.make_move(Color::White, "e2", "e4");
        game.make_move(Color::Black, "e7", "e5");
        let (poller, seen) = recording_poller(&game, 1);
        game.add_draw_offer(Color::White);
        game.add_draw_offer(Color::Black);
        assert_eq!(poller.join(), 4);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_stop_flag_from_outside() {
        let game = Arc::new(GameSession::new("w", "b"));
        let (poller, _) = recording_poller(&game, 0);
        poller.stop_flag().stop();
        assert_eq!(poller.join(), 0);
    }
}
