//! Move application.

use super::{CastleSide, Color, ColoredPiece, Move, Piece, Placement, Position, Square};

/// Rook half of a castling move: from its home square to the square the
/// king passed over.
pub(crate) fn castle_rook_move(king_move: &Move) -> Option<Move> {
    let side = king_move.castling()?;
    let rank = king_move.from().rank();
    let rook_from = Square::new(rook_file(side), rank)?;
    let rook_to = king_move.to().offset(-side.direction(), 0)?;
    Some(Move::relocation(rook_from, rook_to))
}

const fn rook_file(side: CastleSide) -> usize {
    match side {
        CastleSide::King => 7,
        CastleSide::Queen => 0,
    }
}

/// Capture (if the capture square is occupied) and relocate. Returns the
/// moved piece and the captured one.
pub(crate) fn apply_to_placement(
    placement: &mut Placement,
    mv: &Move,
) -> (ColoredPiece, Option<ColoredPiece>) {
    let captured = mv
        .capture()
        .filter(|&square| placement.is_occupied(square))
        .map(|square| placement.remove(square));
    let moved = placement.relocate(mv.from(), mv.to());
    (moved, captured)
}

impl Position {
    /// Play `from` -> `to` for the side to move.
    ///
    /// Returns the moves actually applied: two for castling (king, then rook),
    /// one otherwise. An empty list means the move was not legal, or the game
    /// is already over; the position is then unchanged.
    pub fn make_move(&mut self, from: Square, to: Square) -> Vec<Move> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        let Some(mut mv) = self.legal[self.active.index()]
            .get(&from)
            .and_then(|moves| moves.get(&to))
            .copied()
        else {
            return Vec::new();
        };

        if mv.capture().is_some_and(|square| !self.placement.is_occupied(square)) {
            mv.set_capture(None);
        }

        let mut applied = vec![mv];
        if let Some(rook) = castle_rook_move(&mv) {
            applied.push(rook);
        }

        let mover = self.active;
        let mut irreversible = false;
        for mv in &mut applied {
            irreversible |= self.apply(mover, mv);
        }

        self.en_passant = applied[0].en_passant_target();
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        if irreversible {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        self.active = mover.opponent();
        self.refresh();
        applied
    }

    /// Apply one move to the placement and bookkeeping. Returns true for a
    /// pawn move or a capture.
    fn apply(&mut self, color: Color, mv: &mut Move) -> bool {
        let (moved, captured) = apply_to_placement(&mut self.placement, mv);

        match moved.piece {
            Piece::Pawn if mv.to().rank() == color.opponent().back_rank() => {
                let promoted = self.promotion[color.index()];
                self.placement.remove(mv.to());
                self.placement.add(mv.to(), ColoredPiece::new(color, promoted));
                mv.set_promotion(promoted);
            }
            Piece::King => {
                self.kings[color.index()] = Some(mv.to());
                self.castling.revoke_all(color);
            }
            Piece::Rook => {
                for side in CastleSide::BOTH {
                    if mv.from() == side.rook_home(color) {
                        self.castling.revoke(color, side);
                    }
                }
            }
            _ => {}
        }

        if let Some(square) = mv.capture().filter(|_| captured.is_some()) {
            for owner in Color::BOTH {
                for side in CastleSide::BOTH {
                    if square == side.rook_home(owner) {
                        self.castling.revoke(owner, side);
                    }
                }
            }
        }

        moved.piece == Piece::Pawn || captured.is_some()
    }
}
