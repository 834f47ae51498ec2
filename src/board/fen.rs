//! Forsyth-Edwards Notation parsing and formatting.

use std::str::FromStr;

use super::error::FenError;
use super::position::Position;
use super::types::{
    CastlingRights, Color, PieceType, Square, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE,
    WHITE_QUEENSIDE,
};

/// The standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parse a position from the six FEN fields. The halfmove clock and
    /// fullmove number may be omitted and default to `0` and `1`.
    ///
    /// The error names the field that failed.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        let mut pos = Position::empty();

        parse_placement(&mut pos, fields[0])?;

        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        pos.castling = parse_castling(fields[2])?;

        pos.en_passant = if fields[3] == "-" {
            None
        } else {
            let sq = Square::from_str(fields[3]).map_err(|_| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            // The target must sit on the rank behind a double-pushed pawn.
            let expected_rank = match pos.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if sq.rank() != expected_rank {
                return Err(FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                });
            }
            Some(sq)
        };

        pos.halfmove_clock = match fields.get(4) {
            None => 0,
            Some(text) => text.parse().map_err(|_| FenError::InvalidHalfmoveClock {
                found: (*text).to_string(),
            })?,
        };

        pos.fullmove_number = match fields.get(5) {
            None => 1,
            Some(text) => {
                let n: u32 = text.parse().map_err(|_| FenError::InvalidFullmoveNumber {
                    found: (*text).to_string(),
                })?;
                n.max(1)
            }
        };

        pos.zobrist = pos.compute_zobrist();
        pos.pawn_zobrist = pos.compute_pawn_zobrist();
        pos.in_check = pos.compute_check();
        pos.last_was_legal = true;
        Ok(pos)
    }

    /// Format the position as FEN, round-trip-equal to the input up to
    /// canonicalisation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_on(Square::new(rank, file)) {
                    Some((color, pt)) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(pt.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{placement} {} {} {ep} {} {}",
            self.side_to_move, self.castling, self.halfmove_clock, self.fullmove_number
        )
    }
}

fn parse_placement(pos: &mut Position, field: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPlacement {
            reason: format!("expected 8 ranks, found {}", ranks.len()),
        });
    }

    for (row, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - row;
        let mut file = 0usize;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else {
                let pt = PieceType::from_char(c).ok_or_else(|| FenError::InvalidPlacement {
                    reason: format!("unknown piece character '{c}'"),
                })?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                if file >= 8 {
                    return Err(FenError::InvalidPlacement {
                        reason: format!("rank {} overflows 8 files", rank + 1),
                    });
                }
                pos.set_piece(Square::new(rank, file), color, pt);
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPlacement {
                reason: format!("rank {} covers {file} files", rank + 1),
            });
        }
    }

    for color in Color::BOTH {
        if pos.pieces(color, PieceType::King).popcount() != 1 {
            return Err(FenError::InvalidPlacement {
                reason: format!("{color} must have exactly one king"),
            });
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::NONE;
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        match c {
            'K' => rights.add(WHITE_KINGSIDE),
            'Q' => rights.add(WHITE_QUEENSIDE),
            'k' => rights.add(BLACK_KINGSIDE),
            'q' => rights.add(BLACK_QUEENSIDE),
            _ => {
                return Err(FenError::InvalidCastling {
                    found: field.to_string(),
                })
            }
        }
    }
    Ok(rights)
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}
