//! Piece placement: square -> piece and piece -> squares, kept in step.

use super::{Bitboard, Color, ColoredPiece, Piece, Square};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    squares: [Option<ColoredPiece>; 64],
    by_piece: [Bitboard; 12],
    occupied: Bitboard,
}

impl Default for Placement {
    fn default() -> Self {
        Placement::empty()
    }
}

impl Placement {
    #[must_use]
    pub fn empty() -> Self {
        Placement {
            squares: [None; 64],
            by_piece: [Bitboard::EMPTY; 12],
            occupied: Bitboard::EMPTY,
        }
    }

    /// The standard starting arrangement.
    #[must_use]
    pub fn standard() -> Self {
        let mut placement = Placement::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.iter().enumerate() {
            placement.add(sq(file, 0), ColoredPiece::new(Color::White, *piece));
            placement.add(sq(file, 1), ColoredPiece::new(Color::White, Piece::Pawn));
            placement.add(sq(file, 6), ColoredPiece::new(Color::Black, Piece::Pawn));
            placement.add(sq(file, 7), ColoredPiece::new(Color::Black, *piece));
        }
        placement
    }

    #[inline]
    #[must_use]
    pub fn at(&self, square: Square) -> Option<ColoredPiece> {
        self.squares[square.index()]
    }

    #[inline]
    #[must_use]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.occupied.contains(square)
    }

    /// True if any square of `squares` holds a piece.
    #[inline]
    #[must_use]
    pub fn any_occupied(&self, squares: Bitboard) -> bool {
        self.occupied.intersects(squares)
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// Squares holding the given piece.
    #[inline]
    #[must_use]
    pub fn squares_of(&self, piece: ColoredPiece) -> Bitboard {
        self.by_piece[piece.index()]
    }

    /// Put `piece` on an empty square.
    ///
    /// # Panics
    /// Panics if the square is already occupied.
    pub fn add(&mut self, square: Square, piece: ColoredPiece) {
        assert!(
            !self.is_occupied(square),
            "cannot add {piece} to occupied square {square}"
        );
        self.squares[square.index()] = Some(piece);
        self.by_piece[piece.index()].insert(square);
        self.occupied.insert(square);
    }

    /// Take the piece off `square` and return it.
    ///
    /// # Panics
    /// Panics if the square is empty.
    pub fn remove(&mut self, square: Square) -> ColoredPiece {
        let Some(piece) = self.squares[square.index()].take() else {
            panic!("cannot remove a piece from empty square {square}");
        };
        self.by_piece[piece.index()].remove(square);
        self.occupied.remove(square);
        piece
    }

    /// Move whatever stands on `from` to the empty square `to`.
    pub fn relocate(&mut self, from: Square, to: Square) -> ColoredPiece {
        let piece = self.remove(from);
        self.add(to, piece);
        piece
    }

    /// Occupied squares with their pieces, in square index order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, ColoredPiece)> + '_ {
        self.occupied
            .iter()
            .filter_map(move |square| self.at(square).map(|piece| (square, piece)))
    }
}

fn sq(file: usize, rank: usize) -> Square {
    Square::ALL[rank * 8 + file]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_standard_has_32_pieces() {
        let placement = Placement::standard();
        assert_eq!(placement.occupied().popcount(), 32);
        assert_eq!(
            placement.at(square("e1")),
            Some(ColoredPiece::new(Color::White, Piece::King))
        );
        assert_eq!(
            placement.at(square("d8")),
            Some(ColoredPiece::new(Color::Black, Piece::Queen))
        );
        let black_pawns = placement.squares_of(ColoredPiece::new(Color::Black, Piece::Pawn));
        assert_eq!(black_pawns.popcount(), 8);
    }

    #[test]
    fn test_both_directions_stay_in_step() {
        let mut placement = Placement::empty();
        let knight = ColoredPiece::new(Color::White, Piece::Knight);
        placement.add(square("g1"), knight);
        placement.relocate(square("g1"), square("f3"));
        assert_eq!(placement.at(square("g1")), None);
        assert_eq!(placement.at(square("f3")), Some(knight));
        assert!(placement.squares_of(knight).contains(square("f3")));
        assert!(!placement.squares_of(knight).contains(square("g1")));
        assert_eq!(placement.iter().count(), 1);
    }

    #[test]
    #[should_panic(expected = "occupied square")]
    fn test_add_to_occupied_panics() {
        let mut placement = Placement::standard();
        placement.add(square("e1"), ColoredPiece::new(Color::Black, Piece::Queen));
    }

    #[test]
    #[should_panic(expected = "empty square")]
    fn test_remove_from_empty_panics() {
        let mut placement = Placement::empty();
        placement.remove(square("e4"));
    }
}
