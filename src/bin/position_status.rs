use std::env;
use std::process::ExitCode;

use chess_hub::board::Position;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--help") {
        eprintln!("usage: position_status [--fen \"<fen>\"] <move1> <move2> ...");
        return ExitCode::SUCCESS;
    }

    let mut moves = args.iter().map(String::as_str).peekable();
    let mut position = if moves.peek() == Some(&"--fen") {
        moves.next();
        let Some(fen) = moves.next() else {
            eprintln!("--fen needs a value");
            return ExitCode::FAILURE;
        };
        match Position::try_from_fen(fen) {
            Ok(position) => position,
            Err(err) => {
                eprintln!("bad fen: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        Position::new()
    };

    for notation in moves {
        match position.make_move_notation(notation) {
            Ok(applied) if !applied.is_empty() => {}
            Ok(_) => {
                eprintln!("illegal move: {notation}");
                return ExitCode::FAILURE;
            }
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let side = position.active_color();
    println!("fen: {}", position.to_fen());
    println!("side_to_move: {side}");
    println!("status: {}", position.status());
    println!("legal_moves: {}", position.legal_move_count(side));
    for mv in position.legal_moves(side) {
        println!("{}{}", mv.from(), mv.to());
    }
    ExitCode::SUCCESS
}
