//! Board scenario tests.
//!
//! Tests are organized into separate files by category:
//! - `castling.rs` - Castling rights, blocking and attacked squares
//! - `draw.rs` - Draw detection (50-move, repetition, insufficient material)
//! - `edge_cases.rs` - Mates, en passant, promotion and other special positions
//! - `proptest.rs` - Property-based tests over random playouts


use crate::board::{Position, Square};

pub(super) fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

/// Play each `e2e4`-style move, asserting it is legal.
pub(super) fn play(pos: &mut Position, moves: &[&str]) {
    for notation in moves {
        let applied = pos.make_move_notation(notation).unwrap();
        assert!(!applied.is_empty(), "move {notation} should be legal");
    }
}
