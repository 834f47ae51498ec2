//! Universal Chess Interface front end.
//!
//! A blocking stdin loop translating the line protocol into engine
//! calls. Progress and the final best move are printed by the search
//! worker through callbacks, so the loop never blocks a running search.

pub mod command;
pub mod report;

use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use crate::board::{FenError, MoveParseError, Position};
use crate::config::Settings;
use crate::search::Search;

use command::{apply_position, parse_command, parse_go, UciCommand};

const ENGINE_NAME: &str = concat!("Rampart ", env!("CARGO_PKG_VERSION"));
const ENGINE_AUTHOR: &str = "the Rampart authors";

/// Error type for UCI command handling.
#[derive(Debug, Clone)]
pub enum UciError {
    InvalidFen(FenError),
    InvalidMove {
        move_text: String,
        error: MoveParseError,
    },
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            UciError::InvalidMove { move_text, error } => {
                write!(f, "invalid move '{move_text}': {error}")
            }
            UciError::MissingParts => write!(f, "missing parts in position command"),
        }
    }
}

impl std::error::Error for UciError {}

/// Engine state behind the protocol: the current position, the search,
/// and the option set.
pub struct UciEngine {
    pos: Position,
    search: Search,
    settings: Settings,
}

impl UciEngine {
    #[must_use]
    pub fn new() -> Self {
        let settings = Settings::default();
        let mut search = Search::with_settings(settings.clone());
        search.set_info_callback(Arc::new(|r| println!("{}", report::format_info(r))));
        search.set_done_callback(Arc::new(|r| println!("{}", report::format_bestmove(r))));
        UciEngine {
            pos: Position::new(),
            search,
            settings,
        }
    }

    /// Handle one input line; responses that are not produced by the
    /// search callbacks come back as lines to print. Returns `false`
    /// when the engine should exit.
    pub fn handle_line(&mut self, line: &str) -> (Vec<String>, bool) {
        let mut out = Vec::new();
        match parse_command(line) {
            UciCommand::Uci => {
                out.push(format!("id name {ENGINE_NAME}"));
                out.push(format!("id author {ENGINE_AUTHOR}"));
                out.extend(option_lines(&self.settings));
                out.push("uciok".to_string());
            }
            UciCommand::IsReady => out.push("readyok".to_string()),
            UciCommand::NewGame => {
                self.search.new_game();
                self.pos = Position::new();
            }
            UciCommand::Position(tokens) => {
                if let Err(e) = apply_position(&mut self.pos, &tokens) {
                    log::warn!("position command rejected: {e}");
                    out.push(format!("info string error: {e}"));
                }
            }
            UciCommand::Go(tokens) => {
                let limits = parse_go(&mut self.pos, &tokens);
                if let Err(e) = self.search.start(&self.pos, limits) {
                    log::warn!("go rejected: {e}");
                    out.push(format!("info string error: {e}"));
                }
            }
            UciCommand::Stop => self.search.stop(),
            UciCommand::PonderHit => self.search.ponder_hit(),
            UciCommand::SetOption { name, value } => {
                if let Err(e) = self.set_option(&name, &value) {
                    out.push(format!("info string error: {e}"));
                }
            }
            UciCommand::Quit => {
                if self.search.is_searching() {
                    self.search.stop();
                }
                return (out, false);
            }
            UciCommand::Unknown(text) => {
                if !text.is_empty() {
                    log::debug!("ignoring unknown command: {text}");
                }
            }
        }
        (out, true)
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), String> {
        let mut settings = self.settings.clone();
        let flag = || -> Result<bool, String> {
            match value.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Ok(true),
                "false" | "off" | "0" => Ok(false),
                _ => Err(format!("expected a boolean for '{name}', got '{value}'")),
            }
        };
        match name.to_ascii_lowercase().as_str() {
            "hash" => {
                settings.hash_mb = value
                    .parse()
                    .map_err(|_| format!("expected megabytes for Hash, got '{value}'"))?;
            }
            "ponder" => settings.ponder = flag()?,
            "ownbook" => settings.book_enabled = flag()?,
            "bookpath" => settings.book_path = value.to_string(),
            "usenullmove" => settings.use_null_move = flag()?,
            "userazoring" => settings.use_razoring = flag()?,
            "usereversefutility" => settings.use_reverse_futility = flag()?,
            "usefutility" => settings.use_futility = flag()?,
            "uselmr" => settings.use_lmr = flag()?,
            "uselmp" => settings.use_lmp = flag()?,
            "useiid" => settings.use_iid = flag()?,
            "useaspiration" => settings.use_aspiration = flag()?,
            "usesee" => settings.use_see_filter = flag()?,
            "evalmobility" => settings.eval_mobility = flag()?,
            "evaltempo" => {
                settings.eval_tempo = value
                    .parse()
                    .map_err(|_| format!("expected centipawns for EvalTempo, got '{value}'"))?;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
        self.settings = settings.clone();
        self.search.set_settings(settings);
        Ok(())
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        UciEngine::new()
    }
}

fn option_lines(settings: &Settings) -> Vec<String> {
    vec![
        format!(
            "option name Hash type spin default {} min 1 max 4096",
            settings.hash_mb
        ),
        format!("option name Ponder type check default {}", settings.ponder),
        format!(
            "option name OwnBook type check default {}",
            settings.book_enabled
        ),
        "option name BookPath type string default <empty>".to_string(),
        format!(
            "option name UseNullMove type check default {}",
            settings.use_null_move
        ),
        format!(
            "option name UseRazoring type check default {}",
            settings.use_razoring
        ),
        format!(
            "option name UseReverseFutility type check default {}",
            settings.use_reverse_futility
        ),
        format!(
            "option name UseFutility type check default {}",
            settings.use_futility
        ),
        format!("option name UseLMR type check default {}", settings.use_lmr),
        format!("option name UseLMP type check default {}", settings.use_lmp),
        format!("option name UseIID type check default {}", settings.use_iid),
        format!(
            "option name UseAspiration type check default {}",
            settings.use_aspiration
        ),
        format!(
            "option name UseSEE type check default {}",
            settings.use_see_filter
        ),
        format!(
            "option name EvalMobility type check default {}",
            settings.eval_mobility
        ),
        format!(
            "option name EvalTempo type spin default {} min 0 max 100",
            settings.eval_tempo
        ),
    ]
}

/// Blocking stdin loop; returns when the host sends `quit` or closes
/// the pipe.
pub fn run_uci_loop() {
    let mut engine = UciEngine::new();
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let (responses, keep_going) = engine.handle_line(&line);
        for response in responses {
            println!("{response}");
        }
        if !keep_going {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uci_handshake() {
        let mut engine = UciEngine::new();
        let (out, keep_going) = engine.handle_line("uci");
        assert!(keep_going);
        assert!(out.first().unwrap().starts_with("id name Rampart"));
        assert_eq!(out.last().unwrap(), "uciok");
        assert!(out.iter().any(|l| l.starts_with("option name Hash")));

        let (out, _) = engine.handle_line("isready");
        assert_eq!(out, vec!["readyok".to_string()]);
    }

    #[test]
    fn test_position_and_error_reporting() {
        let mut engine = UciEngine::new();
        let (out, _) = engine.handle_line("position startpos moves e2e4 e7e5");
        assert!(out.is_empty());
        assert_eq!(engine.pos.fullmove_number(), 2);

        let (out, _) = engine.handle_line("position startpos moves e2e5");
        assert!(out[0].contains("error"));
    }

    #[test]
    fn test_setoption_updates_settings() {
        let mut engine = UciEngine::new();
        engine.handle_line("setoption name Hash value 8");
        assert_eq!(engine.settings.hash_mb, 8);
        engine.handle_line("setoption name UseNullMove value false");
        assert!(!engine.settings.use_null_move);

        let (out, _) = engine.handle_line("setoption name Bogus value 1");
        assert!(out[0].contains("unknown option"));
    }

    #[test]
    fn test_go_depth_and_stop_produce_result() {
        let mut engine = UciEngine::new();
        engine.handle_line("position startpos");
        let (out, _) = engine.handle_line("go depth 3");
        assert!(out.is_empty());
        engine.search.wait_until_done();
        let result = engine.search.last_result().unwrap();
        assert!(result.best_move.is_valid());
    }

    #[test]
    fn test_quit_requests_exit() {
        let mut engine = UciEngine::new();
        let (_, keep_going) = engine.handle_line("quit");
        assert!(!keep_going);
    }
}
