//! Board and related things

use crate::check;
use crate::notation::{self, Note, NotationError};
use crate::types::{Cell, Color, Coord, File, Piece, Rank};
use chesh_base::geometry;

use std::fmt;

use thiserror::Error;

/// Error parsing the placement part of [`Board::from_placement()`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1th or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// The king of the side which doesn't move is attacked
    #[error("opponent king is attacked")]
    OpponentKingAttacked,
}

/// Error building a [`Board`] with [`Board::from_placement()`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlacementError {
    /// Placement cannot be parsed
    #[error("bad placement: {0}")]
    Cells(#[from] CellsParseError),
    /// Placement was parsed, but the position is invalid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
    /// History contains a bad token
    #[error("bad history token at {pos}: {source}")]
    History { pos: usize, source: NotationError },
}

/// Piece standing on the board, or lying among the captured ones
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Figure {
    pub piece: Piece,
    pub color: Color,
    pub coord: Coord,
    /// `true` until the piece makes its first move
    pub dormant: bool,
}

impl Figure {
    /// Creates a dormant piece
    pub fn new(piece: Piece, color: Color, coord: Coord) -> Figure {
        Figure {
            piece,
            color,
            coord,
            dormant: true,
        }
    }

    pub fn cell(&self) -> Cell {
        Cell::from_parts(self.color, self.piece)
    }

    /// Single-letter symbol, uppercase for White and lowercase for Black
    pub fn symbol(&self) -> char {
        self.cell().as_char()
    }
}

/// Chess board
///
/// The board owns the live pieces, the captured pieces and the move history. The occupancy grid
/// is derived from the live pieces and is rebuilt after every change, so it never disagrees with
/// them.
///
/// The side to move is determined by the parity of the history length: White moves when the
/// history has even length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) live: Vec<Figure>,
    pub(crate) captured: Vec<Figure>,
    pub(crate) history: Vec<Note>,
    pub(crate) grid: [Cell; 64],
}

impl Board {
    fn from_parts(live: Vec<Figure>, history: Vec<Note>) -> Board {
        let mut res = Board {
            live,
            captured: Vec::new(),
            history,
            grid: [Cell::EMPTY; 64],
        };
        res.sync_grid();
        res
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        let mut live = Vec::with_capacity(32);
        for (color, rank, pawn_rank) in [
            (Color::White, Rank::R1, Rank::R2),
            (Color::Black, Rank::R8, Rank::R7),
        ] {
            for (file, piece) in [
                (File::A, Piece::Rook),
                (File::B, Piece::Knight),
                (File::C, Piece::Bishop),
                (File::D, Piece::Queen),
                (File::E, Piece::King),
                (File::F, Piece::Bishop),
                (File::G, Piece::Knight),
                (File::H, Piece::Rook),
            ] {
                live.push(Figure::new(piece, color, Coord::from_parts(file, rank)));
            }
            for file in File::iter() {
                live.push(Figure::new(
                    Piece::Pawn,
                    color,
                    Coord::from_parts(file, pawn_rank),
                ));
            }
        }
        Board::from_parts(live, Vec::new())
    }

    /// Builds a board from a piece placement and a history
    ///
    /// The placement is written like the first part of FEN: ranks from 8th to 1st separated by
    /// `/`, digits for runs of empty squares. `history` only needs to contain the last moves that
    /// matter: its length sets the side to move, and its last token sets the enpassant context.
    ///
    /// A piece is considered dormant if it stands where it started: pawns on their second rank,
    /// kings on `e1`/`e8`, rooks in the corners of their home rank.
    ///
    /// # Example
    ///
    /// ```
    /// # use chesh::{Board, Color};
    /// #
    /// let b = Board::from_placement("4k3/8/8/8/8/8/8/4K2R", &["Pa2a3"]).unwrap();
    /// assert_eq!(b.side(), Color::Black);
    /// assert_eq!(b.live().len(), 3);
    /// ```
    pub fn from_placement(placement: &str, history: &[&str]) -> Result<Board, PlacementError> {
        let live = parse_cells(placement)?;

        for color in [Color::White, Color::Black] {
            let kings = live
                .iter()
                .filter(|f| f.color == color && f.piece == Piece::King)
                .count();
            if kings == 0 {
                return Err(ValidateError::NoKing(color).into());
            }
            if kings > 1 {
                return Err(ValidateError::TooManyKings(color).into());
            }
        }
        if let Some(f) = live.iter().find(|f| {
            f.piece == Piece::Pawn && matches!(f.coord.rank(), Rank::R1 | Rank::R8)
        }) {
            return Err(ValidateError::InvalidPawn(f.coord).into());
        }

        let mut notes = Vec::with_capacity(history.len());
        for (pos, token) in history.iter().enumerate() {
            notation::decode(token).map_err(|source| PlacementError::History { pos, source })?;
            notes.push(Note::now(token.trim().to_string()));
        }

        let board = Board::from_parts(live, notes);
        if let Some(idx) = board.king_index(board.side().inv()) {
            if check::is_attacked(&board, &board.live[idx]) {
                return Err(ValidateError::OpponentKingAttacked.into());
            }
        }
        Ok(board)
    }

    /// Returns the live pieces
    #[inline]
    pub fn live(&self) -> &[Figure] {
        &self.live
    }

    /// Returns the captured pieces, in order of capture
    #[inline]
    pub fn captured(&self) -> &[Figure] {
        &self.captured
    }

    #[inline]
    pub fn history(&self) -> &[Note] {
        &self.history
    }

    /// Returns the token of the last history entry
    #[inline]
    pub fn last_note(&self) -> Option<&str> {
        self.history.last().map(|n| n.token.as_str())
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        if self.history.len() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.grid[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Returns the live piece standing on `c`
    pub fn at(&self, c: Coord) -> Option<&Figure> {
        self.live.iter().find(|f| f.coord == c)
    }

    pub(crate) fn index_at(&self, c: Coord) -> Option<usize> {
        self.live.iter().position(|f| f.coord == c)
    }

    pub(crate) fn king_index(&self, c: Color) -> Option<usize> {
        self.live
            .iter()
            .position(|f| f.color == c && f.piece == Piece::King)
    }

    /// Returns the position of the king of color `c`
    pub fn king_pos(&self, c: Color) -> Option<Coord> {
        self.king_index(c).map(|i| self.live[i].coord)
    }

    /// Rebuilds the occupancy grid from the live pieces
    pub(crate) fn sync_grid(&mut self) {
        self.grid = [Cell::EMPTY; 64];
        for f in &self.live {
            self.grid[f.coord.index()] = f.cell();
        }
    }

    /// Moves the live piece on `c` to the captured roster
    pub(crate) fn kill(&mut self, c: Coord) {
        if let Some(idx) = self.index_at(c) {
            let victim = self.live.remove(idx);
            self.captured.push(victim);
        }
    }

    /// Verifies the board invariants, panicking if any of them is broken
    ///
    /// Each color has exactly one live king, no square holds two live pieces, and the grid agrees
    /// with the live roster.
    pub fn selftest(&self) {
        for color in [Color::White, Color::Black] {
            let kings = self
                .live
                .iter()
                .filter(|f| f.color == color && f.piece == Piece::King)
                .count();
            assert_eq!(kings, 1, "{:?} must have exactly one king", color);
        }
        let mut seen = [false; 64];
        for f in &self.live {
            assert!(!seen[f.coord.index()], "two pieces on {}", f.coord);
            seen[f.coord.index()] = true;
            assert_eq!(self.grid[f.coord.index()], f.cell(), "grid mismatch at {}", f.coord);
        }
        for c in Coord::iter() {
            assert_eq!(seen[c.index()], self.grid[c.index()].is_occupied(), "stale grid at {}", c);
        }
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::initial()
    }
}

/// Prints the grid from White's side, one rank per line
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}|", rank)?;
            for file in File::iter() {
                write!(f, "{}", self.get2(file, rank))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "-+--------")?;
        write!(f, "{}|abcdefgh", self.side())
    }
}

fn is_dormant(piece: Piece, color: Color, c: Coord) -> bool {
    match piece {
        Piece::Pawn => c.rank() == geometry::pawn_home_rank(color),
        Piece::King => c == Coord::from_parts(File::E, geometry::home_rank(color)),
        Piece::Rook => {
            c.rank() == geometry::home_rank(color) && matches!(c.file(), File::A | File::H)
        }
        _ => false,
    }
}

fn parse_cells(s: &str) -> Result<Vec<Figure>, CellsParseError> {
    type Error = CellsParseError;

    let mut live = Vec::new();
    let mut rank_idx = 8_usize;
    for row in s.split('/') {
        if rank_idx == 0 {
            return Err(Error::Overflow);
        }
        rank_idx -= 1;
        let rank = Rank::from_index(rank_idx);
        let mut file = 0_usize;
        for ch in row.chars() {
            match ch {
                '1'..='8' => {
                    file += (u32::from(ch) - u32::from('0')) as usize;
                }
                _ => {
                    let cell = Cell::from_char(ch)
                        .filter(Cell::is_occupied)
                        .ok_or(Error::UnexpectedChar(ch))?;
                    if file >= 8 {
                        return Err(Error::RankOverflow(rank));
                    }
                    let coord = Coord::from_parts(File::from_index(file), rank);
                    if let (Some(color), Some(piece)) = (cell.color(), cell.piece()) {
                        let mut figure = Figure::new(piece, color, coord);
                        figure.dormant = is_dormant(piece, color, coord);
                        live.push(figure);
                    }
                    file += 1;
                }
            }
            if file > 8 {
                return Err(Error::RankOverflow(rank));
            }
        }
        if file < 8 {
            return Err(Error::RankUnderflow(rank));
        }
    }
    if rank_idx > 0 {
        return Err(Error::Underflow);
    }
    Ok(live)
}
