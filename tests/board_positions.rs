use serde::Deserialize;

use chess_hub::board::Position;

#[derive(Deserialize)]
struct PositionSet {
    positions: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    name: String,
    fen: Option<String>,
    moves: String,
    status: String,
    legal_moves: Option<usize>,
}

#[test]
fn position_suite() {
    let data = include_str!("data/positions.json");
    let set: PositionSet = serde_json::from_str(data).expect("invalid positions.json");

    for case in &set.positions {
        let mut position = match &case.fen {
            Some(fen) => Position::from_fen(fen),
            None => Position::new(),
        };
        for notation in case.moves.split_whitespace() {
            let applied = position.make_move_notation(notation).unwrap();
            assert!(!applied.is_empty(), "{}: {notation} rejected", case.name);
        }

        assert_eq!(
            format!("{:?}", position.status()),
            case.status,
            "status mismatch for {}",
            case.name
        );
        if let Some(expected) = case.legal_moves {
            let side = position.active_color();
            assert_eq!(
                position.legal_move_count(side),
                expected,
                "move count mismatch for {}",
                case.name
            );
        }

        let fen = position.to_fen();
        assert_eq!(Position::from_fen(&fen).to_fen(), fen, "{}", case.name);
    }
}
