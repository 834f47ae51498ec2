//! Engine-to-host report formatting.

use crate::search::{SearchReport, SearchResult};

/// One `info` line per completed iteration.
#[must_use]
pub fn format_info(report: &SearchReport) -> String {
    let score = match report.mate_in {
        Some(mate) => format!("mate {mate}"),
        None => format!("cp {}", report.value),
    };
    let mut line = format!(
        "info depth {} seldepth {} score {score} nodes {} nps {} hashfull {} time {}",
        report.depth,
        report.seldepth,
        report.nodes,
        report.nps,
        report.hashfull,
        report.time.as_millis()
    );
    if !report.pv.is_empty() {
        line.push_str(&format!(" pv {}", report.pv));
    }
    line
}

/// The final `bestmove` line.
#[must_use]
pub fn format_bestmove(result: &SearchResult) -> String {
    if !result.best_move.is_valid() {
        return "bestmove 0000".to_string();
    }
    if result.ponder_move.is_valid() {
        format!("bestmove {} ponder {}", result.best_move, result.ponder_move)
    } else {
        format!("bestmove {}", result.best_move)
    }
}
