//! Move notation used in the game history
//!
//! Every committed move is recorded as a token `<piece><src><dst><suffix>`, for example `Pe2e4`,
//! `Ng1f3`, `Ke1g1%` or `Pe7d8Q&`. The piece letter is always uppercase, pawns are `P`.
//!
//! The suffix is built from the outcome flags in a fixed order: the promotion letter, `%` for
//! castling, `p` for enpassant, `:` for capture, `+` for check and `#` for checkmate. Then the
//! pairs `p:`, `:+` and `:#` are contracted to `p`, `*` and `&` respectively.
//!
//! Resignation is recorded as the literal token `bye`.

use crate::types::{Coord, CoordParseError, Piece, PromotePiece, Ret};

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Token which marks a resignation
pub const RESIGN: &str = "bye";

const SUFFIX_CHARS: &[char] = &['*', '&', '#', '+', ':', 'p', '%', 'R', 'N', 'B', 'Q'];

/// Error decoding a notation token
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum NotationError {
    /// Token is empty
    #[error("empty token")]
    Empty,
    /// Token doesn't start with a piece letter
    #[error("unexpected piece char {0:?}")]
    UnexpectedPiece(char),
    /// Coordinate part is not four characters long
    #[error("bad coordinate part {0:?}")]
    BadLength(String),
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
}

/// History entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Note {
    /// Notation token
    pub token: String,
    /// Time of the move, in milliseconds since the Unix epoch
    pub time: u64,
}

impl Note {
    /// Creates a note stamped with the current time
    pub fn now(token: String) -> Note {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Note { token, time }
    }
}

/// Typed contents of a notation token
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Decoded {
    Move { piece: Piece, src: Coord, dst: Coord },
    Resign,
}

/// Renders a resolved move and its outcome flags into a notation token
///
/// `promote` is written only if `rets` contains [`Ret::Promote`].
pub fn notate(
    rets: &[Ret],
    piece: Piece,
    promote: Option<PromotePiece>,
    src: Coord,
    dst: Coord,
) -> String {
    let mut note = format!("{}{}{}", piece.as_char(), src, dst);
    if rets.is_empty() {
        return note;
    }

    let mut suffix = String::new();
    if rets.contains(&Ret::Promote) {
        if let Some(p) = promote {
            suffix.push(p.as_char());
        }
    }
    for (ret, ch) in [
        (Ret::Castle, '%'),
        (Ret::EnPassant, 'p'),
        (Ret::Capture, ':'),
        (Ret::Check, '+'),
        (Ret::Checkmate, '#'),
    ] {
        if rets.contains(&ret) {
            suffix.push(ch);
        }
    }
    let suffix = suffix
        .replace("p:", "p")
        .replace(":+", "*")
        .replace(":#", "&");

    note.push_str(&suffix);
    note
}

/// Strips the piece letter and the suffix from the token, leaving the bare coordinates
///
/// For example, `Pe7d8Q&` becomes `e7d8`. The resignation token `bye` is returned unchanged.
pub fn denotate(note: &str) -> Result<&str, NotationError> {
    let note = note.trim();
    if note == RESIGN {
        return Ok(note);
    }
    let mut chars = note.chars();
    let first = chars.next().ok_or(NotationError::Empty)?;
    if Piece::from_char(first).is_none() {
        return Err(NotationError::UnexpectedPiece(first));
    }
    Ok(chars.as_str().trim_end_matches(SUFFIX_CHARS))
}

/// Decodes a notation token into the piece kind and its squares
pub fn decode(note: &str) -> Result<Decoded, NotationError> {
    let bare = denotate(note)?;
    if bare == RESIGN {
        return Ok(Decoded::Resign);
    }
    if bare.len() != 4 || !bare.is_ascii() {
        return Err(NotationError::BadLength(bare.to_string()));
    }
    // `denotate()` has already checked the first char
    let piece = note
        .trim()
        .chars()
        .next()
        .and_then(Piece::from_char)
        .ok_or(NotationError::Empty)?;
    let src = bare[0..2].parse().map_err(NotationError::BadSrc)?;
    let dst = bare[2..4].parse().map_err(NotationError::BadDst)?;
    Ok(Decoded::Move { piece, src, dst })
}

/// Returns the promotion choice recorded in the token, if any
pub fn promotion(note: &str) -> Option<PromotePiece> {
    note.trim().chars().nth(5).and_then(PromotePiece::from_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_notate() {
        let (e2, e4) = (sq("e2"), sq("e4"));
        assert_eq!(notate(&[], Piece::Pawn, None, e2, e4), "Pe2e4");
        assert_eq!(
            notate(&[Ret::Castle], Piece::King, None, sq("e1"), sq("g1")),
            "Ke1g1%"
        );
        assert_eq!(
            notate(&[Ret::EnPassant], Piece::Pawn, None, sq("e5"), sq("d6")),
            "Pe5d6p"
        );
        assert_eq!(
            notate(&[Ret::Capture], Piece::Knight, None, sq("f3"), sq("e5")),
            "Nf3e5:"
        );
        assert_eq!(
            notate(&[Ret::Capture, Ret::Check], Piece::Bishop, None, sq("c4"), sq("f7")),
            "Bc4f7*"
        );
        assert_eq!(
            notate(&[Ret::Capture, Ret::Checkmate], Piece::Queen, None, sq("h5"), sq("f7")),
            "Qh5f7&"
        );
        assert_eq!(
            notate(&[Ret::Check], Piece::Rook, None, sq("a1"), sq("a8")),
            "Ra1a8+"
        );
        assert_eq!(
            notate(
                &[Ret::Capture, Ret::Promote, Ret::Checkmate],
                Piece::Pawn,
                Some(PromotePiece::Queen),
                sq("e7"),
                sq("d8")
            ),
            "Pe7d8Q&"
        );
        assert_eq!(
            notate(&[Ret::Castle, Ret::Check], Piece::King, None, sq("e8"), sq("c8")),
            "Ke8c8%+"
        );
    }

    #[test]
    fn test_denotate() {
        assert_eq!(denotate("Pe2e4"), Ok("e2e4"));
        assert_eq!(denotate("Pe7d8Q&"), Ok("e7d8"));
        assert_eq!(denotate("Ke1c1%+"), Ok("e1c1"));
        assert_eq!(denotate("Pe5d6p#"), Ok("e5d6"));
        assert_eq!(denotate(" Nb1c3 "), Ok("b1c3"));
        assert_eq!(denotate("bye"), Ok("bye"));
        assert_eq!(denotate(""), Err(NotationError::Empty));
        assert_eq!(denotate("xe2e4"), Err(NotationError::UnexpectedPiece('x')));
    }

    #[test]
    fn test_round_trip() {
        let src = Coord::from_parts(File::B, Rank::R7);
        let dst = Coord::from_parts(File::C, Rank::R8);
        let flag_sets: &[&[Ret]] = &[
            &[],
            &[Ret::Capture],
            &[Ret::Capture, Ret::Check],
            &[Ret::Capture, Ret::Checkmate],
            &[Ret::EnPassant],
            &[Ret::EnPassant, Ret::Check],
            &[Ret::EnPassant, Ret::Checkmate],
            &[Ret::Castle],
            &[Ret::Castle, Ret::Check],
            &[Ret::Check],
            &[Ret::Checkmate],
            &[Ret::Promote],
            &[Ret::Capture, Ret::Promote, Ret::Check],
            &[Ret::Capture, Ret::Promote, Ret::Checkmate],
            &[Ret::Promote, Ret::Checkmate],
        ];
        for &rets in flag_sets {
            for promote in [None, Some(PromotePiece::Knight), Some(PromotePiece::Queen)] {
                let note = notate(rets, Piece::Pawn, promote, src, dst);
                assert_eq!(denotate(&note), Ok("b7c8"), "note {:?}", note);
                assert_eq!(
                    decode(&note),
                    Ok(Decoded::Move {
                        piece: Piece::Pawn,
                        src,
                        dst
                    })
                );
            }
        }
    }

    #[test]
    fn test_promotion() {
        assert_eq!(promotion("Pe7d8Q&"), Some(PromotePiece::Queen));
        assert_eq!(promotion("Pb7b8N"), Some(PromotePiece::Knight));
        assert_eq!(promotion("Pe5d6p"), None);
        assert_eq!(promotion("Ke1g1%"), None);
        assert_eq!(promotion("bye"), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("bye"), Ok(Decoded::Resign));
        assert_eq!(
            decode("Ke1g1%"),
            Ok(Decoded::Move {
                piece: Piece::King,
                src: sq("e1"),
                dst: sq("g1")
            })
        );
        assert_eq!(
            decode("Pe2e"),
            Err(NotationError::BadLength("e2e".to_string()))
        );
        assert_eq!(
            decode("Pz2e4"),
            Err(NotationError::BadSrc(CoordParseError::UnexpectedFileChar('z')))
        );
        assert_eq!(
            decode("Pe2e9"),
            Err(NotationError::BadDst(CoordParseError::UnexpectedRankChar('9')))
        );
    }
}
