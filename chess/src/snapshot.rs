//! Read-only view of the board state for rendering and persistence

use crate::board::{Board, Figure};
use crate::notation::Note;
use crate::types::Color;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Owned copy of a single piece
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FigureView {
    /// Piece letter, uppercase for White and lowercase for Black
    pub symbol: char,
    pub color: Color,
    /// File number, from 1 to 8
    pub file: u8,
    /// Rank number, from 1 to 8
    pub rank: u8,
    pub dormant: bool,
}

impl From<&Figure> for FigureView {
    fn from(f: &Figure) -> FigureView {
        FigureView {
            symbol: f.symbol(),
            color: f.color,
            file: f.coord.file().number(),
            rank: f.coord.rank().number(),
            dormant: f.dormant,
        }
    }
}

/// Owned copy of the board state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Snapshot {
    pub live: Vec<FigureView>,
    pub captured: Vec<FigureView>,
    pub history: Vec<Note>,
}

impl Board {
    /// Takes a snapshot of the board
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            live: self.live().iter().map(FigureView::from).collect(),
            captured: self.captured().iter().map(FigureView::from).collect(),
            history: self.history().to_vec(),
        }
    }
}
