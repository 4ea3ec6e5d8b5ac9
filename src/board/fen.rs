use std::str::FromStr;

use super::error::{FenError, SquareError};
use super::{CastlingRights, Color, ColoredPiece, Move, Placement, Position, Square};

impl Position {
    /// Parse a position from FEN notation.
    ///
    /// All six fields are required. Nothing is built unless the whole string
    /// is valid.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(FenError::WrongFieldCount { found: parts.len() });
        }

        let placement = parse_placement(parts[0])?;

        let active = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut castling = CastlingRights::none();
        if parts[2] != "-" {
            for c in parts[2].chars() {
                let (color, side) = CastlingRights::from_fen_char(c)
                    .filter(|&(color, side)| !castling.has(color, side))
                    .ok_or(FenError::InvalidCastling { char: c })?;
                castling.set(color, side);
            }
        }

        let en_passant = if parts[3] == "-" {
            None
        } else {
            let square: Square = parts[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?;
            if square.rank() != 2 && square.rank() != 5 {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            Some(square)
        };

        let halfmove_clock: u32 = parts[4].parse().map_err(|_| FenError::InvalidHalfmoveClock {
            found: parts[4].to_string(),
        })?;
        let fullmove_number = parts[5]
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| FenError::InvalidFullmoveNumber {
                found: parts[5].to_string(),
            })?;

        Ok(Position::from_parts(
            placement,
            active,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        ))
    }

    /// Parse a position from FEN notation.
    ///
    /// # Panics
    /// Panics if the FEN string is invalid. Use `try_from_fen` for fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("Invalid FEN string")
    }

    /// Convert the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {}",
            self.repetition_key(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// The first four FEN fields: placement, side to move, castling, en passant.
    /// Positions that agree on these count as repetitions of each other.
    #[must_use]
    pub fn repetition_key(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match self.placement.at(Square::ALL[rank * 8 + file]) {
                    Some(piece) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {}",
            rows.join("/"),
            self.active.to_char(),
            self.castling.to_fen(),
            ep
        )
    }

    /// Play a move written as two square names, e.g. `"e2e4"`.
    ///
    /// Returns the applied moves as `make_move` does; malformed notation is an
    /// error, an illegal move is an empty list.
    ///
    /// # Example
    /// ```
    /// use chess_hub::board::Position;
    ///
    /// let mut pos = Position::new();
    /// assert_eq!(pos.make_move_notation("e2e4").unwrap().len(), 1);
    /// assert!(pos.make_move_notation("e2e4").unwrap().is_empty());
    /// ```
    pub fn make_move_notation(&mut self, notation: &str) -> Result<Vec<Move>, SquareError> {
        let invalid = || SquareError::InvalidNotation {
            notation: notation.to_string(),
        };
        if notation.len() != 4 || !notation.is_ascii() {
            return Err(invalid());
        }
        let from: Square = notation[..2].parse().map_err(|_| invalid())?;
        let to: Square = notation[2..].parse().map_err(|_| invalid())?;
        Ok(self.make_move(from, to))
    }
}

fn parse_placement(field: &str) -> Result<Placement, FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }

    let mut placement = Placement::empty();
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx;
        let mut file = 0;
        for c in rank_str.chars() {
            if let Some(run) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += run as usize;
                continue;
            }
            let piece = ColoredPiece::from_fen_char(c).ok_or(FenError::InvalidPiece { char: c })?;
            if file >= 8 {
                return Err(FenError::RankWidth {
                    rank: rank + 1,
                    files: file + 1,
                });
            }
            placement.add(Square::ALL[rank * 8 + file], piece);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::RankWidth {
                rank: rank + 1,
                files: file,
            });
        }
    }
    Ok(placement)
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from_fen(s)
    }
}
