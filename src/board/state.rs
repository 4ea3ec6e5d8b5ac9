use std::collections::{BTreeMap, HashMap};

use super::{
    Bitboard, CastlingRights, Color, ColoredPiece, GameStatus, Move, Piece, Placement, Square,
};

/// Legal moves of one color: from-square -> to-square -> move.
pub(crate) type LegalIndex = BTreeMap<Square, BTreeMap<Square, Move>>;

/// How many times each position (FEN without the clocks) has been reached.
#[derive(Clone, Debug, Default)]
pub(crate) struct RepetitionTable {
    counts: HashMap<String, u32>,
}

impl RepetitionTable {
    pub(crate) fn get(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, key: String) -> u32 {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }
}

/// A chess position and the game state machine around it.
///
/// The legal-move index and the status are rebuilt from scratch after every
/// successful move; nothing else mutates a position. Callers sharing a
/// position across threads must serialize access themselves.
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) placement: Placement,
    pub(crate) active: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) kings: [Option<Square>; 2],
    pub(crate) promotion: [Piece; 2],
    pub(crate) legal: [LegalIndex; 2],
    pub(crate) repetitions: RepetitionTable,
    pub(crate) status: GameStatus,
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Position::from_parts(
            Placement::standard(),
            Color::White,
            CastlingRights::all(),
            None,
            0,
            1,
        )
    }

    /// Assemble a position and compute its legal moves and status.
    pub(crate) fn from_parts(
        placement: Placement,
        active: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        let mut kings = [None; 2];
        for color in Color::BOTH {
            kings[color.index()] = placement
                .squares_of(ColoredPiece::new(color, Piece::King))
                .iter()
                .next();
        }
        let mut position = Position {
            placement,
            active,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            kings,
            promotion: [Piece::Queen; 2],
            legal: [LegalIndex::new(), LegalIndex::new()],
            repetitions: RepetitionTable::default(),
            status: GameStatus::to_move(active, false),
        };
        position.refresh();
        position
    }

    /// Rebuild the legal-move index, then the status.
    pub(crate) fn refresh(&mut self) {
        self.legal = [
            self.compute_legal_index(Color::White),
            self.compute_legal_index(Color::Black),
        ];
        self.status = self.compute_status();
    }

    #[must_use]
    pub fn active_color(&self) -> Color {
        self.active
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<ColoredPiece> {
        self.placement.at(square)
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    /// Piece pawns of `color` turn into on the last rank. Queen unless changed.
    #[must_use]
    pub fn promotion_piece(&self, color: Color) -> Piece {
        self.promotion[color.index()]
    }

    /// # Panics
    /// Panics when asked to promote to a pawn or a king.
    pub fn set_promotion_piece(&mut self, color: Color, piece: Piece) {
        assert!(
            !matches!(piece, Piece::Pawn | Piece::King),
            "invalid promotion piece {piece:?}"
        );
        self.promotion[color.index()] = piece;
    }

    /// Destinations the piece on `from` may legally move to.
    #[must_use]
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self.placement.at(from) else {
            return Vec::new();
        };
        self.legal[piece.color.index()]
            .get(&from)
            .map(|moves| moves.keys().copied().collect())
            .unwrap_or_default()
    }

    /// All legal moves for `color`, ordered by origin then destination.
    pub fn legal_moves(&self, color: Color) -> impl Iterator<Item = &Move> + '_ {
        self.legal[color.index()].values().flat_map(|moves| moves.values())
    }

    #[must_use]
    pub fn legal_move_count(&self, color: Color) -> usize {
        self.legal[color.index()].values().map(BTreeMap::len).sum()
    }

    /// True if the side to move has its king attacked.
    #[must_use]
    pub fn in_check(&self) -> bool {
        self.is_king_attacked(self.active)
    }

    /// End the game by resignation of `color`. No effect once the game is over.
    pub fn resign(&mut self, color: Color) {
        if !self.status.is_terminal() {
            self.status = GameStatus::resigned(color);
        }
    }

    /// End the game as a draw by agreement. No effect once the game is over.
    pub fn agree_draw(&mut self) {
        if !self.status.is_terminal() {
            self.status = GameStatus::DrawByAgreement;
        }
    }

    /// Number of times the current position has been reached.
    #[must_use]
    pub fn repetition_count(&self) -> u32 {
        self.repetitions.get(&self.repetition_key())
    }

    /// Status checks in priority order. Records the current position for
    /// repetition counting on every call.
    fn compute_status(&mut self) -> GameStatus {
        if self.halfmove_clock >= 100 {
            return GameStatus::HalfmoveClockExpired;
        }
        let key = self.repetition_key();
        let seen = self.repetitions.increment(key);
        if seen >= 3 {
            return GameStatus::ThreefoldRepetition;
        }
        if self.is_insufficient_material() {
            return GameStatus::InsufficientMaterial;
        }
        let checked = self.is_king_attacked(self.active);
        if self.legal[self.active.index()].is_empty() {
            GameStatus::no_moves(self.active, checked)
        } else {
            GameStatus::to_move(self.active, checked)
        }
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// bishops only, all on squares of one color.
    pub(crate) fn is_insufficient_material(&self) -> bool {
        let count = |piece: Piece| -> Bitboard {
            Color::BOTH
                .iter()
                .map(|&color| self.placement.squares_of(ColoredPiece::new(color, piece)))
                .fold(Bitboard::EMPTY, |acc, bb| acc | bb)
        };

        let heavy = count(Piece::Pawn) | count(Piece::Rook) | count(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }

        let knights = count(Piece::Knight);
        let bishops = count(Piece::Bishop);
        if knights.popcount() + bishops.popcount() <= 1 {
            return true;
        }

        knights.is_empty()
            && (!bishops.intersects(Bitboard::LIGHT_SQUARES)
                || !bishops.intersects(Bitboard::DARK_SQUARES))
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
