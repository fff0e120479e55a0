use crate::types::{Coord, File, Rank};
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use std::fmt;
use std::iter::FromIterator;

/// Set of squares
///
/// Bit `i` is set iff the square with index `i` belongs to the set, so `a1` is the lowest bit.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, BitAnd, BitAndAssign, BitOr, BitOrAssign, Not)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub const fn with(self, c: Coord) -> Bitboard {
        Bitboard(self.0 | (1_u64 << c.index()))
    }

    #[inline]
    pub fn set(&mut self, c: Coord) {
        *self = self.with(c);
    }

    #[inline]
    pub const fn has(&self, c: Coord) -> bool {
        (self.0 >> c.index()) & 1 != 0
    }

    #[inline]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

/// Prints the ranks from 8th to 1st, separated by `/`, with `1` for each square in the set
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            if rank != Rank::R8 {
                write!(f, "/")?;
            }
            for file in File::iter() {
                let set = self.has(Coord::from_parts(file, rank));
                write!(f, "{}", if set { '1' } else { '0' })?;
            }
        }
        Ok(())
    }
}

/// Iterator over the squares of a [`Bitboard`], in index order
pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Coord::from_index(idx))
    }
}

impl IntoIterator for Bitboard {
    type Item = Coord;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        iter.into_iter().fold(Bitboard::EMPTY, Bitboard::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_set() {
        let bb: Bitboard = [sq("a4"), sq("f3"), sq("e2")].into_iter().collect();
        assert!(bb.has(sq("f3")));
        assert!(!bb.has(sq("f4")));
        assert_eq!(
            bb.into_iter().collect::<Vec<_>>(),
            vec![sq("e2"), sq("f3"), sq("a4")],
        );

        let mut other = Bitboard::EMPTY;
        other.set(sq("f3"));
        other.set(sq("h8"));
        assert_eq!(bb & other, Bitboard::EMPTY.with(sq("f3")));
        assert_eq!((bb | other).into_iter().count(), 4);
        assert_eq!((!bb).into_iter().count(), 61);
        assert!(!(bb & !bb).is_nonempty());
        assert!((bb & other).is_nonempty());
    }

    #[test]
    fn test_format() {
        let bb: Bitboard = [sq("a4"), sq("e2"), sq("f3"), sq("h8")].into_iter().collect();
        assert_eq!(
            bb.to_string(),
            "00000001/00000000/00000000/00000000/10000000/00000100/00001000/00000000"
        );
    }
}
