//! Move text: UCI long algebraic and Standard Algebraic Notation.
//!
//! Both parsers accept a candidate only if it names exactly one legal
//! move in the given position.

use super::error::{MoveParseError, SanError};
use super::movegen::{generate_legal, has_legal_move, GenMode};
use super::position::Position;
use super::types::{Move, PieceType, Square};

impl Position {
    /// Parse a move in UCI long algebraic notation (`e2e4`, `e7e8q`).
    /// The promotion letter is accepted in either case.
    pub fn from_uci(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() < 4 || chars.len() > 5 {
            return Err(MoveParseError::InvalidFormat {
                notation: text.to_string(),
            });
        }
        let squares_ok = ('a'..='h').contains(&chars[0])
            && ('1'..='8').contains(&chars[1])
            && ('a'..='h').contains(&chars[2])
            && ('1'..='8').contains(&chars[3]);
        if !squares_ok {
            return Err(MoveParseError::InvalidFormat {
                notation: text.to_string(),
            });
        }

        let from = Square::new(chars[1] as usize - '1' as usize, chars[0] as usize - 'a' as usize);
        let to = Square::new(chars[3] as usize - '1' as usize, chars[2] as usize - 'a' as usize);

        let promotion = if chars.len() == 5 {
            match PieceType::from_char(chars[4]) {
                Some(pt) if pt != PieceType::Pawn && pt != PieceType::King => Some(pt),
                _ => {
                    return Err(MoveParseError::InvalidFormat {
                        notation: text.to_string(),
                    })
                }
            }
        } else {
            None
        };

        let legal = generate_legal(self, GenMode::All);
        for m in &legal {
            if m.from() == from && m.to() == to && m.promotion_piece() == promotion {
                return Ok(*m);
            }
        }
        Err(MoveParseError::IllegalMove {
            notation: text.to_string(),
        })
    }

    /// Parse a move in Standard Algebraic Notation (`e4`, `Nf3`, `exd5`,
    /// `O-O`, `e8=Q`, `Nbd7`), tolerating `+ # ! ?` suffixes.
    pub fn from_san(&mut self, text: &str) -> Result<Move, SanError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SanError::Empty);
        }
        let body = trimmed.trim_end_matches(['+', '#', '!', '?']);
        if body.is_empty() {
            return Err(SanError::InvalidFormat {
                san: text.to_string(),
            });
        }

        let legal = generate_legal(self, GenMode::All);

        // Castling first; "O-O" is a prefix of "O-O-O"
        if body == "O-O-O" || body == "0-0-0" {
            return single_match(legal.iter().copied().filter(|m| {
                m.is_castling() && m.to().file() == 2
            }), text);
        }
        if body == "O-O" || body == "0-0" {
            return single_match(legal.iter().copied().filter(|m| {
                m.is_castling() && m.to().file() == 6
            }), text);
        }

        let mut chars: Vec<char> = body.chars().collect();

        // Promotion suffix: "=Q" or a bare trailing piece letter
        let mut promotion = None;
        if let Some(&last) = chars.last() {
            if last.is_ascii_uppercase() && chars.len() >= 3 {
                promotion = PieceType::from_char(last).filter(|pt| {
                    !matches!(pt, PieceType::Pawn | PieceType::King)
                });
                if promotion.is_some() {
                    chars.pop();
                    if chars.last() == Some(&'=') {
                        chars.pop();
                    }
                }
            }
        }

        // Destination square is the final file-rank pair
        if chars.len() < 2 {
            return Err(SanError::InvalidFormat {
                san: text.to_string(),
            });
        }
        let rank_char = chars.pop().expect("length checked");
        let file_char = chars.pop().expect("length checked");
        if !('a'..='h').contains(&file_char) || !('1'..='8').contains(&rank_char) {
            return Err(SanError::InvalidFormat {
                san: text.to_string(),
            });
        }
        let dest = Square::new(
            rank_char as usize - '1' as usize,
            file_char as usize - 'a' as usize,
        );

        // Leading piece letter, defaulting to pawn
        let mut idx = 0;
        let piece = if chars.first().is_some_and(|c| c.is_ascii_uppercase()) {
            let pt = PieceType::from_char(chars[0]).ok_or_else(|| SanError::InvalidFormat {
                san: text.to_string(),
            })?;
            idx = 1;
            pt
        } else {
            PieceType::Pawn
        };

        // Optional disambiguation and capture marker
        let mut from_file = None;
        let mut from_rank = None;
        while idx < chars.len() {
            let c = chars[idx];
            match c {
                'a'..='h' => from_file = Some(c as usize - 'a' as usize),
                '1'..='8' => from_rank = Some(c as usize - '1' as usize),
                'x' => {}
                _ => {
                    return Err(SanError::InvalidFormat {
                        san: text.to_string(),
                    })
                }
            }
            idx += 1;
        }

        let candidates = legal.iter().copied().filter(|m| {
            if m.is_castling() || m.to() != dest || m.promotion_piece() != promotion {
                return false;
            }
            if self.piece_on(m.from()).map(|(_, pt)| pt) != Some(piece) {
                return false;
            }
            if from_file.is_some_and(|f| m.from().file() != f) {
                return false;
            }
            if from_rank.is_some_and(|r| m.from().rank() != r) {
                return false;
            }
            true
        });
        single_match(candidates, text)
    }

    /// Format a move in SAN, with `+`/`#` suffixes.
    #[must_use]
    pub fn move_to_san(&self, m: Move) -> String {
        let mut scratch = self.clone();
        let mut san = String::new();

        if m.is_castling() {
            san.push_str(if m.to().file() == 6 { "O-O" } else { "O-O-O" });
        } else {
            let piece = self.piece_on(m.from()).map(|(_, pt)| pt);
            let is_capture = self.piece_on(m.to()).is_some() || m.is_en_passant();

            match piece {
                Some(PieceType::Pawn) | None => {
                    if is_capture {
                        san.push((b'a' + m.from().file() as u8) as char);
                    }
                }
                Some(pt) => {
                    san.push(pt.to_char().to_ascii_uppercase());
                    let (need_file, need_rank) = self.disambiguation(&mut scratch, m, pt);
                    if need_file {
                        san.push((b'a' + m.from().file() as u8) as char);
                    }
                    if need_rank {
                        san.push((b'1' + m.from().rank() as u8) as char);
                    }
                }
            }
            if is_capture {
                san.push('x');
            }
            san.push_str(&m.to().to_string());
            if let Some(promo) = m.promotion_piece() {
                san.push('=');
                san.push(promo.to_char().to_ascii_uppercase());
            }
        }

        scratch.do_move(m);
        if scratch.has_check() {
            if has_legal_move(&mut scratch) {
                san.push('+');
            } else {
                san.push('#');
            }
        }
        san
    }

    /// Whether other pieces of the same type reach the same destination,
    /// and which coordinate separates them.
    fn disambiguation(&self, scratch: &mut Position, m: Move, piece: PieceType) -> (bool, bool) {
        let legal = generate_legal(scratch, GenMode::All);
        let mut shares_file = false;
        let mut shares_rank = false;
        let mut others = false;
        for other in &legal {
            if other.to() != m.to()
                || other.from() == m.from()
                || self.piece_on(other.from()).map(|(_, pt)| pt) != Some(piece)
            {
                continue;
            }
            others = true;
            if other.from().file() == m.from().file() {
                shares_file = true;
            }
            if other.from().rank() == m.from().rank() {
                shares_rank = true;
            }
        }
        if !others {
            (false, false)
        } else if !shares_file {
            (true, false)
        } else if !shares_rank {
            (false, true)
        } else {
            (true, true)
        }
    }
}

fn single_match<I: Iterator<Item = Move>>(candidates: I, san: &str) -> Result<Move, SanError> {
    let mut found = Move::NONE;
    let mut count = 0;
    for m in candidates {
        found = m;
        count += 1;
    }
    match count {
        0 => Err(SanError::NotFound {
            san: san.to_string(),
        }),
        1 => Ok(found),
        _ => Err(SanError::Ambiguous {
            san: san.to_string(),
        }),
    }
}
