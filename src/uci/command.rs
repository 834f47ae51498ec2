//! UCI command parsing.

use std::time::Duration;

use crate::board::Position;
use crate::search::SearchLimits;

use super::UciError;

/// A parsed host-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    NewGame,
    /// Raw tokens after `position`; applied against a board separately.
    Position(Vec<String>),
    /// Raw tokens after `go`.
    Go(Vec<String>),
    Stop,
    PonderHit,
    SetOption {
        name: String,
        value: String,
    },
    Quit,
    Unknown(String),
}

/// Split one input line into a command. Unknown input is preserved for
/// logging rather than dropped.
#[must_use]
pub fn parse_command(line: &str) -> UciCommand {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return UciCommand::Unknown(String::new());
    };
    match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::NewGame,
        "position" => UciCommand::Position(tokens.map(str::to_string).collect()),
        "go" => UciCommand::Go(tokens.map(str::to_string).collect()),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "setoption" => parse_setoption(&tokens.map(str::to_string).collect::<Vec<_>>()),
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(line.to_string()),
    }
}

fn parse_setoption(tokens: &[String]) -> UciCommand {
    // setoption name <id...> [value <x...>]
    let mut name = Vec::new();
    let mut value = Vec::new();
    let mut target: Option<&mut Vec<String>> = None;
    for token in tokens {
        match token.as_str() {
            "name" => target = Some(&mut name),
            "value" => target = Some(&mut value),
            other => {
                if let Some(bucket) = target.as_mut() {
                    bucket.push(other.to_string());
                }
            }
        }
    }
    UciCommand::SetOption {
        name: name.join(" "),
        value: value.join(" "),
    }
}

/// Apply a `position` command body: `startpos | fen <6 fields>`,
/// optionally followed by `moves <uci-move>*`.
pub fn apply_position(pos: &mut Position, tokens: &[String]) -> Result<(), UciError> {
    let mut idx = 0;
    match tokens.first().map(String::as_str) {
        Some("startpos") => {
            *pos = Position::new();
            idx = 1;
        }
        Some("fen") => {
            let end = tokens
                .iter()
                .position(|t| t == "moves")
                .unwrap_or(tokens.len());
            let fen = tokens[1..end].join(" ");
            *pos = Position::from_fen(&fen).map_err(UciError::InvalidFen)?;
            idx = end;
        }
        _ => return Err(UciError::MissingParts),
    }

    if tokens.get(idx).map(String::as_str) == Some("moves") {
        for move_text in &tokens[idx + 1..] {
            let m = pos
                .from_uci(move_text)
                .map_err(|error| UciError::InvalidMove {
                    move_text: move_text.clone(),
                    error,
                })?;
            pos.do_move(m);
        }
    }
    Ok(())
}

/// Translate `go` arguments into search limits. Unknown tokens are
/// skipped so newer GUIs do not break the engine.
#[must_use]
pub fn parse_go(pos: &mut Position, tokens: &[String]) -> SearchLimits {
    let mut limits = SearchLimits::default();
    let mut idx = 0;
    while idx < tokens.len() {
        let token = tokens[idx].as_str();
        idx += 1;
        let mut next_ms = |idx: &mut usize| -> Option<Duration> {
            let parsed = tokens.get(*idx).and_then(|t| t.parse::<u64>().ok());
            if parsed.is_some() {
                *idx += 1;
            }
            parsed.map(Duration::from_millis)
        };
        match token {
            "infinite" => limits.infinite = true,
            "ponder" => limits.ponder = true,
            "wtime" => limits.white_time = next_ms(&mut idx),
            "btime" => limits.black_time = next_ms(&mut idx),
            "winc" => limits.white_inc = next_ms(&mut idx).unwrap_or_default(),
            "binc" => limits.black_inc = next_ms(&mut idx).unwrap_or_default(),
            "movetime" => limits.move_time = next_ms(&mut idx),
            "movestogo" => {
                limits.moves_to_go = tokens.get(idx).and_then(|t| t.parse().ok());
                idx += 1;
            }
            "depth" => {
                limits.depth = tokens.get(idx).and_then(|t| t.parse().ok());
                idx += 1;
            }
            "nodes" => {
                limits.nodes = tokens.get(idx).and_then(|t| t.parse().ok());
                idx += 1;
            }
            "mate" => {
                limits.mate = tokens.get(idx).and_then(|t| t.parse().ok());
                idx += 1;
            }
            "searchmoves" => {
                while idx < tokens.len() {
                    match pos.from_uci(&tokens[idx]) {
                        Ok(m) => {
                            limits.search_moves.push(m);
                            idx += 1;
                        }
                        Err(_) => break,
                    }
                }
            }
            _ => {}
        }
    }
    limits
}
