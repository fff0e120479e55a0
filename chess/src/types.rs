//! Core types
//!
//! Re-exports the value types from `chesh_base` and defines the outcome flags of move requests.

pub use chesh_base::types::*;

use std::fmt;
use std::ops::Deref;
use std::slice;

use arrayvec::ArrayVec;

/// Outcome flag of a move request
///
/// Success flags describe what a committed (or pending, in case of [`Ret::Promote`]) move does.
/// Error flags describe why a request was rejected. A rejected request yields exactly one error
/// flag and changes nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Ret {
    /// Piece is selected and may be moved by the side to move
    Selected,
    /// Move is castling
    Castle,
    /// Move captures the piece on the destination square
    Capture,
    /// Pawn reaches the last rank and waits for the promotion choice
    Promote,
    /// Move captures a pawn enpassant
    EnPassant,
    /// Move checks the opponent's king
    Check,
    /// Move checkmates the opponent's king
    Checkmate,
    /// Move would leave the mover's own king in check
    Checked,
    /// No piece on the source square
    BadSrc,
    /// Destination square holds a piece of the mover's color
    BadDst,
    /// Source piece does not belong to the side to move
    BadTurn,
    /// Castling conditions are not met
    BadCastle,
    /// Piece cannot reach the destination square
    InvalidMove,
}

impl Ret {
    pub const fn is_error(&self) -> bool {
        matches!(
            *self,
            Ret::Checked
                | Ret::BadSrc
                | Ret::BadDst
                | Ret::BadTurn
                | Ret::BadCastle
                | Ret::InvalidMove
        )
    }
}

impl fmt::Display for Ret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let s = match *self {
            Ret::Selected => "selected",
            Ret::Castle => "castle",
            Ret::Capture => "capture",
            Ret::Promote => "promote",
            Ret::EnPassant => "en passant",
            Ret::Check => "check",
            Ret::Checkmate => "checkmate",
            Ret::Checked => "king would be in check",
            Ret::BadSrc => "no piece on source square",
            Ret::BadDst => "destination holds own piece",
            Ret::BadTurn => "not this side's turn",
            Ret::BadCastle => "cannot castle",
            Ret::InvalidMove => "invalid move",
        };
        write!(f, "{}", s)
    }
}

/// Ordered list of outcome flags returned by a single request
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Rets(ArrayVec<Ret, 8>);

impl Deref for Rets {
    type Target = [Ret];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Rets {
    type Item = &'a Ret;
    type IntoIter = slice::Iter<'a, Ret>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Ret> for Rets {
    fn from(r: Ret) -> Rets {
        let mut res = Rets::new();
        res.push(r);
        res
    }
}

impl<const N: usize> From<[Ret; N]> for Rets {
    fn from(rets: [Ret; N]) -> Rets {
        let mut res = Rets::new();
        for r in rets {
            res.push(r);
        }
        res
    }
}

impl Rets {
    pub fn new() -> Rets {
        Rets(ArrayVec::new())
    }

    /// Appends a flag, unless it is already present
    pub fn push(&mut self, r: Ret) {
        if !self.0.contains(&r) {
            self.0.push(r);
        }
    }

    pub fn remove(&mut self, r: Ret) {
        self.0.retain(|x| *x != r);
    }

    pub fn has(&self, r: Ret) -> bool {
        self.0.contains(&r)
    }

    /// Returns the error flag if the request was rejected
    pub fn error(&self) -> Option<Ret> {
        self.0.iter().copied().find(Ret::is_error)
    }

    pub fn is_ok(&self) -> bool {
        self.error().is_none()
    }
}

impl fmt::Display for Rets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, r) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", r)?;
        }
        Ok(())
    }
}
