use std::time::Duration;

use crate::board::Piece;

/// Tunables for `ChessService` and the listeners attached to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Piece pawns promote to in newly created games.
    pub default_promotion: Piece,
    /// How long an `EventPoller` waits per long-poll before checking its stop flag.
    pub poll_timeout_ms: u64,
    /// Seed for the matchmaking coin flip. `None` seeds from entropy.
    pub matchmaking_seed: Option<u64>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            default_promotion: Piece::Queen,
            poll_timeout_ms: 250,
            matchmaking_seed: None,
        }
    }
}

impl ServiceOptions {
    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Set one option by name. Names are case-insensitive; unknown names and
    /// malformed values leave the options unchanged. Returns true if
    /// something changed.
    pub fn apply_option(&mut self, name: &str, value: Option<&str>) -> bool {
        let normalized = name.trim().to_ascii_lowercase();
        let value = value.map(str::trim);
        match normalized.as_str() {
            "default promotion" => {
                let piece = value
                    .filter(|v| v.chars().count() == 1)
                    .and_then(|v| v.chars().next())
                    .and_then(Piece::from_char)
                    .filter(|p| !matches!(p, Piece::Pawn | Piece::King));
                if let Some(piece) = piece {
                    self.default_promotion = piece;
                    return true;
                }
            }
            "poll timeout" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.poll_timeout_ms = v.max(1);
                    return true;
                }
            }
            "matchmaking seed" => match value {
                Some("none") | None => {
                    self.matchmaking_seed = None;
                    return true;
                }
                Some(v) => {
                    if let Ok(seed) = v.parse::<u64>() {
                        self.matchmaking_seed = Some(seed);
                        return true;
                    }
                }
            },
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ServiceOptions::default();
        assert_eq!(options.default_promotion, Piece::Queen);
        assert_eq!(options.poll_timeout(), Duration::from_millis(250));
        assert_eq!(options.matchmaking_seed, None);
    }

    #[test]
    fn test_apply_option_is_case_insensitive() {
        let mut options = ServiceOptions::default();
        assert!(options.apply_option("Default Promotion", Some("N")));
        assert_eq!(options.default_promotion, Piece::Knight);
        assert!(options.apply_option("POLL TIMEOUT", Some("40")));
        assert_eq!(options.poll_timeout_ms, 40);
        assert!(options.apply_option("matchmaking seed", Some("7")));
        assert_eq!(options.matchmaking_seed, Some(7));
        assert!(options.apply_option("matchmaking seed", Some("none")));
        assert_eq!(options.matchmaking_seed, None);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let mut options = ServiceOptions::default();
        assert!(!options.apply_option("default promotion", Some("k")));
        assert!(!options.apply_option("default promotion", Some("pawn")));
        assert!(!options.apply_option("poll timeout", Some("soon")));
        assert!(!options.apply_option("hash", Some("64")));
        assert_eq!(options, ServiceOptions::default());
    }
}
