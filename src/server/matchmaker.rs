//! Pairs two seek requests into a new game.

use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::game::GameSession;
use super::options::ServiceOptions;
use super::registry::{GameId, UserSession};
use crate::board::{Color, Piece};

/// What both seekers learn once they are paired.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeekResponse {
    pub game_id: GameId,
    pub white: String,
    pub black: String,
}

/// Receives the pairing result. Called at most once.
pub type SeekCallback = Box<dyn FnOnce(SeekResponse) + Send>;

/// Result of a single `seek` call as seen by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Parked until someone else seeks.
    Waiting,
    /// Paired with the parked seek; both callbacks have run.
    Paired(SeekResponse),
}

struct PendingSeek {
    session: Arc<UserSession>,
    callback: SeekCallback,
}

struct MatchState {
    pending: Option<PendingSeek>,
    rng: StdRng,
    games_created: u64,
}

/// Holds at most one waiting seek.
///
/// The matchmaking lock is never taken while a game lock is held, and it is
/// released before seek callbacks run.
pub struct Matchmaker {
    state: Mutex<MatchState>,
    promotion: Piece,
}

impl Default for Matchmaker {
    fn default() -> Self {
        Matchmaker::new()
    }
}

impl Matchmaker {
    #[must_use]
    pub fn new() -> Self {
        Matchmaker::with_rng(StdRng::from_entropy(), Piece::Queen)
    }

    /// Deterministic coin flips, for tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Matchmaker::with_rng(StdRng::seed_from_u64(seed), Piece::Queen)
    }

    #[must_use]
    pub fn from_options(options: &ServiceOptions) -> Self {
        let rng = match options.matchmaking_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Matchmaker::with_rng(rng, options.default_promotion)
    }

    fn with_rng(rng: StdRng, promotion: Piece) -> Self {
        Matchmaker {
            state: Mutex::new(MatchState {
                pending: None,
                rng,
                games_created: 0,
            }),
            promotion,
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    #[must_use]
    pub fn games_created(&self) -> u64 {
        self.state.lock().games_created
    }

    /// Park this seek, or pair it with the one already parked.
    ///
    /// On pairing, colors are assigned by a fair coin flip, the game is
    /// registered with both sessions, and both callbacks receive the same
    /// response. A repeated seek from the parked session replaces its
    /// callback.
    pub fn seek<F>(&self, session: &Arc<UserSession>, callback: F) -> SeekOutcome
    where
        F: FnOnce(SeekResponse) + Send + 'static,
    {
        let current = PendingSeek {
            session: Arc::clone(session),
            callback: Box::new(callback),
        };

        let (first, second, response) = {
            let mut state = self.state.lock();
            let parked = match state.pending.take() {
                Some(parked) if parked.session.token() != session.token() => parked,
                previous => {
                    if previous.is_some() {
                        debug!("{} sought again; replacing the pending seek", session.username());
                    } else {
                        debug!("{} is waiting for an opponent", session.username());
                    }
                    state.pending = Some(current);
                    return SeekOutcome::Waiting;
                }
            };

            let (white, black) = if state.rng.gen_bool(0.5) {
                (current, parked)
            } else {
                (parked, current)
            };
            let game = Arc::new(GameSession::new(
                white.session.username(),
                black.session.username(),
            ));
            for color in Color::BOTH {
                game.set_promotion_piece(color, self.promotion);
            }
            white.session.add_game(Arc::clone(&game), Color::White);
            black.session.add_game(Arc::clone(&game), Color::Black);
            state.games_created += 1;

            let response = SeekResponse {
                game_id: game.id(),
                white: game.white().to_string(),
                black: game.black().to_string(),
            };
            info!(
                "game {} created: {} (white) vs {} (black)",
                response.game_id, response.white, response.black
            );
            (white.callback, black.callback, response)
        };

        first(response.clone());
        second(response.clone());
        SeekOutcome::Paired(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::registry::SessionRegistry;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> (Arc<StdMutex<Vec<SeekResponse>>>, impl FnOnce(SeekResponse) + Send) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |r| sink.lock().unwrap().push(r))
    }

    #[test]
    fn test_solitary_seek_waits() {
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let matchmaker = Matchmaker::with_seed(1);
        let (seen, callback) = recorder();
        assert_eq!(matchmaker.seek(&alice, callback), SeekOutcome::Waiting);
        assert!(matchmaker.has_pending());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pairing_notifies_both_with_same_response() {
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let bob = registry.login("bob");
        let matchmaker = Matchmaker::with_seed(7);
        let (seen_a, cb_a) = recorder();
        let (seen_b, cb_b) = recorder();
        matchmaker.seek(&alice, cb_a);
        let SeekOutcome::Paired(response) = matchmaker.seek(&bob, cb_b) else {
            panic!("second seek should pair");
        };
        assert!(!matchmaker.has_pending());
        assert_eq!(seen_a.lock().unwrap().as_slice(), &[response.clone()]);
        assert_eq!(seen_b.lock().unwrap().as_slice(), &[response.clone()]);

        let mut players = vec![response.white.clone(), response.black.clone()];
        players.sort();
        assert_eq!(players, vec!["alice", "bob"]);

        let (_, alice_color) = alice.game(&response.game_id).unwrap();
        let (_, bob_color) = bob.game(&response.game_id).unwrap();
        assert_ne!(alice_color, bob_color);
        let expected = if response.white == "alice" { Color::White } else { Color::Black };
        assert_eq!(alice_color, expected);
    }

    #[test]
    fn test_repeat_seek_replaces_callback() {
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let bob = registry.login("bob");
        let matchmaker = Matchmaker::with_seed(3);
        let (stale, cb_old) = recorder();
        let (fresh, cb_new) = recorder();
        matchmaker.seek(&alice, cb_old);
        assert_eq!(matchmaker.seek(&alice, cb_new), SeekOutcome::Waiting);
        matchmaker.seek(&bob, |_| {});
        assert!(stale.lock().unwrap().is_empty());
        assert_eq!(fresh.lock().unwrap().len(), 1);
        assert_eq!(matchmaker.games_created(), 1);
    }

    #[test]
    fn test_coin_flip_gives_both_colors() {
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let bob = registry.login("bob");
        let matchmaker = Matchmaker::with_seed(11);
        let mut alice_white = 0;
        for _ in 0..64 {
            matchmaker.seek(&alice, |_| {});
            if let SeekOutcome::Paired(r) = matchmaker.seek(&bob, |_| {}) {
                if r.white == "alice" {
                    alice_white += 1;
                }
            }
        }
        assert_eq!(matchmaker.games_created(), 64);
        assert!(alice_white > 0 && alice_white < 64);
    }

    #[test]
    fn test_options_set_promotion() {
        let options = ServiceOptions {
            default_promotion: Piece::Knight,
            matchmaking_seed: Some(5),
            ..ServiceOptions::default()
        };
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let bob = registry.login("bob");
        let matchmaker = Matchmaker::from_options(&options);
        matchmaker.seek(&alice, |_| {});
        let SeekOutcome::Paired(response) = matchmaker.seek(&bob, |_| {}) else {
            panic!("second seek should pair");
        };
        let (game, _) = alice.game(&response.game_id).unwrap();
        let promotion = game.with_position_ref(|p| p.promotion_piece(Color::White));
        assert_eq!(promotion, Piece::Knight);
    }
}
