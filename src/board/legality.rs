//! Legal-move index construction and attack detection.
//!
//! Filtering runs in three passes per candidate: occupancy and rights against
//! the current placement, then the `must_be_safe` squares against the
//! opponent's raw attack reach, then a simulated application on a scratch
//! copy of the placement to see whether the mover's own king is left attacked.

use super::make_move::{apply_to_placement, castle_rook_move};
use super::state::LegalIndex;
use super::{Bitboard, Color, ColoredPiece, Move, Piece, Placement, Position};

/// Squares `color` attacks in `placement`.
///
/// Built from unfiltered candidates: sliders are cut off by the first
/// occupied square, pawns attack both diagonals whether or not anything
/// stands there, and pawn pushes and castling never attack.
#[must_use]
pub fn attack_reach(placement: &Placement, color: Color) -> Bitboard {
    let mut reach = Bitboard::EMPTY;
    for (from, piece) in placement.iter() {
        if piece.color != color {
            continue;
        }
        for candidate in piece.moves(from) {
            if candidate.castling().is_some() {
                continue;
            }
            if piece.piece == Piece::Pawn && !candidate.is_capture_only() {
                continue;
            }
            if placement.any_occupied(candidate.must_be_empty()) {
                continue;
            }
            reach.insert(candidate.to());
        }
    }
    reach
}

impl Position {
    /// True if the king of `color` stands on a square the opponent attacks.
    /// A missing king is never attacked.
    #[must_use]
    pub fn is_king_attacked(&self, color: Color) -> bool {
        match self.kings[color.index()] {
            Some(king) => attack_reach(&self.placement, color.opponent()).contains(king),
            None => false,
        }
    }

    /// True if playing `mv` would leave the mover's king attacked.
    ///
    /// Works on a clone of the placement; `self` is never touched. `mv` must
    /// come from the candidate tables.
    #[must_use]
    pub(crate) fn would_expose_king(&self, mv: &Move) -> bool {
        let Some(mover) = self.placement.at(mv.from()) else {
            return false;
        };
        let color = mover.color;
        let king = if mover.piece == Piece::King {
            Some(mv.to())
        } else {
            self.kings[color.index()]
        };
        let Some(king) = king else {
            return false;
        };

        let mut scratch = self.placement.clone();
        apply_to_placement(&mut scratch, mv);
        if let Some(rook) = castle_rook_move(mv) {
            apply_to_placement(&mut scratch, &rook);
        }
        attack_reach(&scratch, color.opponent()).contains(king)
    }

    pub(crate) fn compute_legal_index(&self, color: Color) -> LegalIndex {
        let opponent_reach = attack_reach(&self.placement, color.opponent());
        let mut index = LegalIndex::new();
        for (from, piece) in self.placement.iter() {
            if piece.color != color {
                continue;
            }
            for candidate in piece.moves(from) {
                let Some(mv) = self.admit(piece, candidate) else {
                    continue;
                };
                if mv.must_be_safe().intersects(opponent_reach) {
                    continue;
                }
                if self.would_expose_king(&mv) {
                    continue;
                }
                index.entry(from).or_default().insert(mv.to(), mv);
            }
        }
        index
    }

    /// Occupancy, capture and castling-right checks for one candidate.
    /// Returns the candidate with its capture square refined for en passant.
    fn admit(&self, piece: ColoredPiece, candidate: &Move) -> Option<Move> {
        if self.placement.any_occupied(candidate.must_be_empty()) {
            return None;
        }
        let target = self.placement.at(candidate.to());
        if target.is_some_and(|t| t.color == piece.color) {
            return None;
        }

        let mut mv = *candidate;
        if mv.is_capture_only() && target.is_none() {
            let victim = self.en_passant_victim(piece.color, &mv)?;
            mv.set_capture(Some(victim));
        }

        if let Some(side) = mv.castling() {
            let rook = ColoredPiece::new(piece.color, Piece::Rook);
            if !self.castling.has(piece.color, side)
                || self.placement.at(side.rook_home(piece.color)) != Some(rook)
            {
                return None;
            }
        }
        Some(mv)
    }

    /// Square of the pawn an en passant capture along `mv` would take.
    fn en_passant_victim(&self, color: Color, mv: &Move) -> Option<super::Square> {
        if color != self.active || self.en_passant != Some(mv.to()) {
            return None;
        }
        let victim = super::Square::new(mv.to().file(), mv.from().rank())?;
        let enemy_pawn = ColoredPiece::new(color.opponent(), Piece::Pawn);
        (self.placement.at(victim) == Some(enemy_pawn)).then_some(victim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_start_position_reach() {
        let placement = Placement::standard();
        let white = attack_reach(&placement, Color::White);
        // Every third-rank square is covered by a pawn or a knight.
        for file in 0..8 {
            assert!(white.contains(Square::new(file, 2).unwrap()));
        }
        assert!(!white.contains(sq("e4")));
        assert!(!white.contains(sq("d8")));
    }

    #[test]
    fn test_slider_reach_stops_at_blocker() {
        let pos = Position::from_fen("4k3/8/8/8/r3P3/8/8/4K3 w - - 0 1");
        let black = attack_reach(pos.placement(), Color::Black);
        assert!(black.contains(sq("d4")));
        assert!(black.contains(sq("e4")));
        assert!(!black.contains(sq("f4")));
    }

    #[test]
    fn test_pinned_piece_cannot_leave_line() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(pos.legal_destinations(sq("e2")).is_empty());
    }

    #[test]
    fn test_simulation_leaves_position_untouched() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        let before = pos.to_fen();
        let knight_jump = Move::step(sq("e2"), sq("c3"));
        assert!(pos.would_expose_king(&knight_jump));
        assert_eq!(pos.to_fen(), before);
        assert_eq!(pos.placement().at(sq("e2")).map(|p| p.piece), Some(Piece::Knight));
    }

    #[test]
    fn test_missing_king_is_never_attacked() {
        let pos = Position::from_fen("8/8/8/8/8/8/r7/8 w - - 0 1");
        assert!(!pos.is_king_attacked(Color::White));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        let dests = pos.legal_destinations(sq("e1"));
        assert!(dests.contains(&sq("d2")));
        assert!(!dests.contains(&sq("e2")));
        assert!(!dests.contains(&sq("d1")));
        assert!(dests.contains(&sq("f1")));
        assert!(!dests.contains(&sq("f2")));
    }
}
