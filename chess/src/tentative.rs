//! Scoped simulation of a single move

use crate::board::{Board, Figure};
use crate::notation::{self, Note};
use crate::types::Coord;

use std::ops::{Deref, DerefMut};

/// Guard which applies a move to the board tentatively and reverts it when dropped
///
/// While the guard is alive, the mover stands on its destination, the piece on the capture
/// square (if any) is taken out of the live roster, and a provisional note for the move is
/// appended to the history, so the move is seen as the last one made. The grid is kept in sync.
///
/// Dropping the guard restores the board exactly, on every exit path.
///
/// # Example
///
/// ```
/// # use chesh::{Board, Coord, Tentative};
/// #
/// let mut b = Board::initial();
/// let (e2, e4) = ("e2".parse().unwrap(), "e4".parse().unwrap());
/// {
///     let t = Tentative::new(&mut b, e2, e4, None).unwrap();
///     assert!(t.get(e2).is_empty());
///     assert_eq!(t.last_note(), Some("Pe2e4"));
/// }
/// assert_eq!(b, Board::initial());
/// ```
pub struct Tentative<'a> {
    board: &'a mut Board,
    mover: usize,
    origin: Coord,
    suspended: Option<(usize, Figure)>,
}

impl<'a> Tentative<'a> {
    /// Tentatively moves the piece on `src` to `dst`, removing the piece on `capture`
    ///
    /// Returns `None` if there is no piece on `src`. The move itself is not validated.
    pub fn new(
        board: &'a mut Board,
        src: Coord,
        dst: Coord,
        capture: Option<Coord>,
    ) -> Option<Tentative<'a>> {
        let mover = board.index_at(src)?;
        Some(Self::with_index(board, mover, dst, capture))
    }

    pub(crate) fn with_index(
        board: &'a mut Board,
        mut mover: usize,
        dst: Coord,
        capture: Option<Coord>,
    ) -> Tentative<'a> {
        let mut suspended = None;
        if let Some(idx) = capture.and_then(|c| board.index_at(c)) {
            if idx != mover {
                let victim = board.live.remove(idx);
                if idx < mover {
                    mover -= 1;
                }
                suspended = Some((idx, victim));
            }
        }

        let fig = board.live[mover];
        board.history.push(Note {
            token: notation::notate(&[], fig.piece, None, fig.coord, dst),
            time: 0,
        });
        board.live[mover].coord = dst;
        board.sync_grid();

        Tentative {
            board,
            mover,
            origin: fig.coord,
            suspended,
        }
    }

    /// Returns the moved piece, standing on its destination
    #[inline]
    pub fn mover(&self) -> &Figure {
        &self.board.live[self.mover]
    }

    /// Returns the square the mover came from
    #[inline]
    pub fn origin(&self) -> Coord {
        self.origin
    }

    /// Returns the piece removed by the move
    #[inline]
    pub fn suspended(&self) -> Option<&Figure> {
        self.suspended.as_ref().map(|(_, f)| f)
    }
}

impl<'a> Deref for Tentative<'a> {
    type Target = Board;

    #[inline]
    fn deref(&self) -> &Board {
        self.board
    }
}

impl<'a> DerefMut for Tentative<'a> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl<'a> Drop for Tentative<'a> {
    fn drop(&mut self) {
        self.board.live[self.mover].coord = self.origin;
        if let Some((idx, victim)) = self.suspended.take() {
            self.board.live.insert(idx, victim);
        }
        self.board.history.pop();
        self.board.sync_grid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, Color, Piece};

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_capture_restored() {
        let mut b = Board::from_placement("4k3/8/3p4/8/8/8/8/3QK3", &[]).unwrap();
        let before = b.clone();
        {
            let t = Tentative::new(&mut b, sq("d1"), sq("d6"), Some(sq("d6"))).unwrap();
            assert_eq!(t.live().len(), 3);
            assert_eq!(t.mover().coord, sq("d6"));
            assert_eq!(t.origin(), sq("d1"));
            assert_eq!(t.suspended().map(Figure::symbol), Some('p'));
            assert_eq!(t.get(sq("d6")), Cell::from_parts(Color::White, Piece::Queen));
            assert!(t.get(sq("d1")).is_empty());
            assert_eq!(t.side(), Color::Black);
            t.selftest();
        }
        assert_eq!(b, before);
        b.selftest();
    }

    #[test]
    fn test_enpassant_restored() {
        // Suspended piece is before the mover in the roster
        let mut b = Board::from_placement("4k3/8/8/3pP3/8/8/8/4K3", &["Pd7d5"]).unwrap();
        let before = b.clone();
        {
            let mut t = Tentative::new(&mut b, sq("e5"), sq("d6"), Some(sq("d5"))).unwrap();
            assert_eq!(t.mover().symbol(), 'P');
            assert!(t.get(sq("d5")).is_empty());
            assert_eq!(t.last_note(), Some("Pe5d6"));
            {
                let nested = Tentative::new(&mut t, sq("e8"), sq("d7"), None).unwrap();
                assert_eq!(nested.history().len(), 3);
            }
            assert_eq!(t.history().len(), 2);
        }
        assert_eq!(b, before);
    }

    #[test]
    fn test_no_mover() {
        let mut b = Board::initial();
        assert!(Tentative::new(&mut b, sq("e4"), sq("e5"), None).is_none());
    }
}
