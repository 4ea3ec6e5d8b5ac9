//! Geometry-only candidate moves for each piece, memoized per piece on first use.
//!
//! A candidate ignores what is on the board except through its preconditions:
//! a ray move lists the squares it passes over as `must_be_empty`, so blocking
//! is decided later by a single set test instead of re-walking the ray.

use once_cell::sync::OnceCell;

use super::{Bitboard, CastleSide, Color, ColoredPiece, Move, Piece, Square};

type CandidateTable = Vec<Vec<Move>>;

const UNBUILT: OnceCell<CandidateTable> = OnceCell::new();

static TABLES: [OnceCell<CandidateTable>; 12] = [UNBUILT; 12];

const ROOK_DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const KNIGHT_JUMPS: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_STEPS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl ColoredPiece {
    /// Candidate moves of this piece standing on `from`.
    #[must_use]
    pub fn moves(self, from: Square) -> &'static [Move] {
        let table = TABLES[self.index()].get_or_init(|| {
            Square::ALL
                .iter()
                .map(|&square| generate(self, square))
                .collect()
        });
        &table[from.index()]
    }
}

/// Square the king of `color` starts on.
pub(crate) fn king_home(color: Color) -> Square {
    Square::ALL[color.back_rank() * 8 + 4]
}

fn generate(piece: ColoredPiece, from: Square) -> Vec<Move> {
    let mut moves = Vec::new();
    match piece.piece {
        Piece::Pawn => pawn_moves(piece.color, from, &mut moves),
        Piece::Knight => jumps(from, &KNIGHT_JUMPS, &mut moves),
        Piece::Rook => rays(from, &ROOK_DIRECTIONS, &mut moves),
        Piece::Bishop => rays(from, &BISHOP_DIRECTIONS, &mut moves),
        Piece::Queen => {
            rays(from, &ROOK_DIRECTIONS, &mut moves);
            rays(from, &BISHOP_DIRECTIONS, &mut moves);
        }
        Piece::King => {
            jumps(from, &KING_STEPS, &mut moves);
            if from == king_home(piece.color) {
                for side in CastleSide::BOTH {
                    moves.push(castle(piece.color, from, side));
                }
            }
        }
    }
    moves
}

fn jumps(from: Square, offsets: &[(isize, isize)], moves: &mut Vec<Move>) {
    moves.extend(
        offsets
            .iter()
            .filter_map(|&(df, dr)| from.offset(df, dr))
            .map(|to| Move::step(from, to)),
    );
}

fn rays(from: Square, directions: &[(isize, isize)], moves: &mut Vec<Move>) {
    for &(df, dr) in directions {
        let mut between = Bitboard::EMPTY;
        let mut next = from.offset(df, dr);
        while let Some(to) = next {
            moves.push(Move::slide(from, to, between));
            between.insert(to);
            next = to.offset(df, dr);
        }
    }
}

fn pawn_moves(color: Color, from: Square, moves: &mut Vec<Move>) {
    if from.rank() == 0 || from.rank() == 7 {
        return;
    }
    let dir = color.pawn_direction();
    let Some(one) = from.offset(0, dir) else {
        return;
    };
    moves.push(Move::pawn_push(
        from,
        one,
        Bitboard::from_square(one),
        None,
    ));
    if from.rank() == color.pawn_start_rank() {
        if let Some(two) = one.offset(0, dir) {
            moves.push(Move::pawn_push(
                from,
                two,
                Bitboard::from_squares([one, two]),
                Some(one),
            ));
        }
    }
    for df in [-1, 1] {
        if let Some(to) = from.offset(df, dir) {
            moves.push(Move::pawn_capture(from, to));
        }
    }
}

fn castle(color: Color, from: Square, side: CastleSide) -> Move {
    let rook = side.rook_home(color);
    let step = side.direction();
    let mut must_be_empty = Bitboard::EMPTY;
    let mut next = from.offset(step, 0);
    while let Some(square) = next {
        if square == rook {
            break;
        }
        must_be_empty.insert(square);
        next = square.offset(step, 0);
    }
    let transit = Square::ALL[(from.index() as isize + step) as usize];
    let to = Square::ALL[(from.index() as isize + 2 * step) as usize];
    Move::castle(
        from,
        to,
        side,
        must_be_empty,
        Bitboard::from_squares([from, transit]),
    )
}
