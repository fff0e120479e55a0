use std::fmt::{self, Display};
use std::hint;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PromotePieceParseError {
    #[error("unexpected promote char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Returns the file number, from 1 (file `a`) to 8 (file `h`)
    pub const fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => File::A,
            1 => File::B,
            2 => File::C,
            3 => File::D,
            4 => File::E,
            5 => File::F,
            6 => File::G,
            7 => File::H,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    /// Builds a file from its number between 1 and 8
    pub const fn from_number(val: u8) -> Option<Self> {
        match val {
            1..=8 => Some(unsafe { Self::from_index_unchecked(val as usize - 1) }),
            _ => None,
        }
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(unsafe {
                Self::from_index_unchecked((u32::from(c) - u32::from('a')) as usize)
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    /// Returns the rank number, from 1 to 8
    pub const fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Rank::R1,
            1 => Rank::R2,
            2 => Rank::R3,
            3 => Rank::R4,
            4 => Rank::R5,
            5 => Rank::R6,
            6 => Rank::R7,
            7 => Rank::R8,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    /// Builds a rank from its number between 1 and 8
    pub const fn from_number(val: u8) -> Option<Self> {
        match val {
            1..=8 => Some(unsafe { Self::from_index_unchecked(val as usize - 1) }),
            _ => None,
        }
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(unsafe {
                Self::from_index_unchecked((u32::from(c) - u32::from('1')) as usize)
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'1' + *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// Coordinates are plain values: two coordinates are the same square iff they compare equal.
/// The index is `rank * 8 + file`, so `a1` is 0 and `h8` is 63.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Coord(u8);

impl Coord {
    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    pub const fn from_parts(file: File, rank: Rank) -> Coord {
        Coord(((rank as u8) << 3) | file as u8)
    }

    /// Builds a coordinate from 1-based file and rank numbers
    ///
    /// Returns `None` if any of them is outside of `1..=8`.
    pub const fn new(file: u8, rank: u8) -> Option<Coord> {
        match (File::from_number(file), Rank::from_number(rank)) {
            (Some(file), Some(rank)) => Some(Coord::from_parts(file, rank)),
            _ => None,
        }
    }

    pub const fn file(&self) -> File {
        unsafe { File::from_index_unchecked((self.0 & 7) as usize) }
    }

    pub const fn rank(&self) -> Rank {
        unsafe { Rank::from_index_unchecked((self.0 >> 3) as usize) }
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn try_shift(self, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        let new_file = self.file().index().wrapping_add(delta_file as usize);
        let new_rank = self.rank().index().wrapping_add(delta_rank as usize);
        if new_file >= 8 || new_rank >= 8 {
            return None;
        }
        unsafe {
            Some(Coord::from_parts(
                File::from_index_unchecked(new_file),
                Rank::from_index_unchecked(new_rank),
            ))
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Coord)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Coord({})", self);
        }
        write!(f, "Coord(?{:?})", self.0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file().as_char(), self.rank().as_char())
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err(CoordParseError::BadLength);
        }
        let bytes = s.as_bytes();
        let (file_ch, rank_ch) = (bytes[0] as char, bytes[1] as char);
        Ok(Coord::from_parts(
            File::from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(CoordParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Kind of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl Piece {
    /// Uppercase letter for the piece kind, as used in notation
    pub fn as_char(&self) -> char {
        b"PKNBRQ"[*self as u8 as usize] as char
    }

    pub fn from_char(c: char) -> Option<Piece> {
        match c {
            'P' => Some(Piece::Pawn),
            'K' => Some(Piece::King),
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            _ => None,
        }
    }
}

/// Piece kind a pawn may be promoted to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl PromotePiece {
    pub fn as_char(&self) -> char {
        Piece::from(*self).as_char()
    }

    pub fn from_char(c: char) -> Option<PromotePiece> {
        match c {
            'N' => Some(PromotePiece::Knight),
            'B' => Some(PromotePiece::Bishop),
            'R' => Some(PromotePiece::Rook),
            'Q' => Some(PromotePiece::Queen),
            _ => None,
        }
    }
}

impl From<PromotePiece> for Piece {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => Piece::Knight,
            PromotePiece::Bishop => Piece::Bishop,
            PromotePiece::Rook => Piece::Rook,
            PromotePiece::Queen => Piece::Queen,
        }
    }
}

impl Display for PromotePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for PromotePiece {
    type Err = PromotePieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(PromotePieceParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        PromotePiece::from_char(ch).ok_or(PromotePieceParseError::UnexpectedChar(ch))
    }
}

/// Contents of a single square: either empty or a piece of some color
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const fn from_parts(c: Color, p: Piece) -> Cell {
        Cell(match c {
            Color::White => 1 + p as u8,
            Color::Black => 7 + p as u8,
        })
    }

    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub const fn piece(&self) -> Option<Piece> {
        match self.0 {
            0 => None,
            1 | 7 => Some(Piece::Pawn),
            2 | 8 => Some(Piece::King),
            3 | 9 => Some(Piece::Knight),
            4 | 10 => Some(Piece::Bishop),
            5 | 11 => Some(Piece::Rook),
            6 | 12 => Some(Piece::Queen),
            _ => unsafe { hint::unreachable_unchecked() },
        }
    }

    /// Returns `true` if the cell holds a piece that a piece of color `c` may capture
    pub fn is_enemy_of(&self, c: Color) -> bool {
        self.color() == Some(c.inv())
    }

    pub fn as_char(&self) -> char {
        b".PKNBRQpknbrq"[self.0 as usize] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = Piece::from_char(c.to_ascii_uppercase())?;
        Some(Cell::from_parts(color, piece))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Cell({})", self.as_char())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DrawKind {
    Agreement,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum WinKind {
    Checkmate,
    Resign,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Outcome {
    Win { side: Color, kind: WinKind },
    Draw(DrawKind),
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Self::Win { side, .. } => Some(*side),
            Self::Draw(_) => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::Win { side, kind } => {
                let side = match side {
                    Color::White => "White",
                    Color::Black => "Black",
                };
                match kind {
                    WinKind::Checkmate => write!(f, "{} wins by checkmate", side),
                    WinKind::Resign => write!(f, "{} wins by resignation", side),
                }
            }
            Self::Draw(DrawKind::Agreement) => write!(f, "draw by agreement"),
        }
    }
}
