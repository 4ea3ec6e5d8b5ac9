//! Session tokens, game ids, and the token -> user table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::game::GameSession;
use crate::board::Color;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(Uuid);

        impl $name {
            /// A fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Opaque identifier of a game.
    GameId
);

uuid_id!(
    /// Opaque token handed out at login.
    SessionToken
);

/// A logged-in user and the games they play, with their color in each.
#[derive(Debug)]
pub struct UserSession {
    token: SessionToken,
    username: String,
    games: RwLock<HashMap<GameId, (Arc<GameSession>, Color)>>,
}

impl UserSession {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        UserSession {
            token: SessionToken::new(),
            username: username.into(),
            games: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn token(&self) -> SessionToken {
        self.token
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Record that this user plays `color` in `game`.
    pub fn add_game(&self, game: Arc<GameSession>, color: Color) {
        self.games.write().insert(game.id(), (game, color));
    }

    /// The game with `id` and this user's color in it.
    #[must_use]
    pub fn game(&self, id: &GameId) -> Option<(Arc<GameSession>, Color)> {
        self.games
            .read()
            .get(id)
            .map(|(game, color)| (Arc::clone(game), *color))
    }

    #[must_use]
    pub fn game_ids(&self) -> Vec<GameId> {
        self.games.read().keys().copied().collect()
    }
}

/// Token -> session table. Sessions never expire here.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionToken, Arc<UserSession>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session. Logging in twice with the same name yields two
    /// independent sessions.
    pub fn login(&self, username: impl Into<String>) -> Arc<UserSession> {
        let session = Arc::new(UserSession::new(username));
        self.sessions
            .write()
            .insert(session.token(), Arc::clone(&session));
        session
    }

    #[must_use]
    pub fn get(&self, token: &SessionToken) -> Option<Arc<UserSession>> {
        self.sessions.read().get(token).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trips_through_text() {
        let id = GameId::new();
        let parsed: GameId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<SessionToken>().is_err());
    }

    #[test]
    fn test_login_and_lookup() {
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let again = registry.login("alice");
        assert_ne!(alice.token(), again.token());
        assert_eq!(registry.len(), 2);
        let found = registry.get(&alice.token()).unwrap();
        assert_eq!(found.username(), "alice");
        assert!(registry.get(&SessionToken::new()).is_none());
    }

    #[test]
    fn test_games_are_per_session() {
        let registry = SessionRegistry::new();
        let alice = registry.login("alice");
        let bob = registry.login("bob");
        let game = Arc::new(GameSession::new("alice", "bob"));
        alice.add_game(Arc::clone(&game), Color::White);
        bob.add_game(Arc::clone(&game), Color::Black);

        let (found, color) = bob.game(&game.id()).unwrap();
        assert_eq!(found.id(), game.id());
        assert_eq!(color, Color::Black);
        assert_eq!(alice.game_ids(), vec![game.id()]);
        assert!(registry.login("carol").game(&game.id()).is_none());
    }
}
