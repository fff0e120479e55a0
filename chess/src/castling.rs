//! Castling eligibility

use crate::board::{Board, Figure};
use crate::movegen;
use crate::types::{Cell, Coord, File, Piece};
use chesh_base::bitboard::Bitboard;
use chesh_base::geometry;

/// Castling side
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    /// Kingside castling (a.k.a. O-O)
    King,
    /// Queenside castling (a.k.a. O-O-O)
    Queen,
}

impl CastlingSide {
    /// File where the king lands
    pub const fn king_dst_file(self) -> File {
        match self {
            CastlingSide::King => File::G,
            CastlingSide::Queen => File::C,
        }
    }

    pub const fn rook_src_file(self) -> File {
        match self {
            CastlingSide::King => File::H,
            CastlingSide::Queen => File::A,
        }
    }

    pub const fn rook_dst_file(self) -> File {
        match self {
            CastlingSide::King => File::F,
            CastlingSide::Queen => File::D,
        }
    }

    fn from_king_dst(file: File) -> Option<CastlingSide> {
        match file {
            File::G => Some(CastlingSide::King),
            File::C => Some(CastlingSide::Queen),
            _ => None,
        }
    }
}

/// Rook relocation of an accepted castling
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Castle {
    pub side: CastlingSide,
    pub rook_src: Coord,
    pub rook_dst: Coord,
}

/// Returns `true` if moving `fig` to `dst` must be treated as castling
///
/// This holds when a king standing on its home rank moves two files along it. Whether such
/// castling is allowed is decided by [`resolve()`].
pub fn is_attempt(fig: &Figure, dst: Coord) -> bool {
    let src = fig.coord;
    fig.piece == Piece::King
        && src.rank() == geometry::home_rank(fig.color)
        && dst.rank() == src.rank()
        && src.file().index().abs_diff(dst.file().index()) == 2
}

/// Squares strictly between `a` and `b` on the same rank
fn between(a: Coord, b: Coord) -> Bitboard {
    let (lo, hi) = if a.file().index() < b.file().index() {
        (a, b)
    } else {
        (b, a)
    };
    (lo.file().index() + 1..hi.file().index())
        .map(|f| Coord::from_parts(File::from_index(f), a.rank()))
        .collect()
}

/// Checks whether the castling attempt of `king` to `dst` is allowed
///
/// Castling is allowed if the king is dormant, lands on file `c` or `g`, the corner rook on that
/// side is a dormant rook of the king's color, the squares between them are empty, and none of
/// the squares the king starts on, passes or lands on is threatened by the enemy.
///
/// Returns `None` if castling is not allowed.
pub fn resolve(b: &Board, king: &Figure, dst: Coord) -> Option<Castle> {
    if !king.dormant || !is_attempt(king, dst) {
        return None;
    }
    let side = CastlingSide::from_king_dst(dst.file())?;
    let rank = geometry::home_rank(king.color);
    let rook_src = Coord::from_parts(side.rook_src_file(), rank);
    let rook = b.at(rook_src)?;
    if rook.cell() != Cell::from_parts(king.color, Piece::Rook) || !rook.dormant {
        return None;
    }
    if between(king.coord, rook_src)
        .into_iter()
        .any(|c| b.get(c).is_occupied())
    {
        return None;
    }
    let pass = between(king.coord, dst).with(king.coord).with(dst);
    if (pass & movegen::threats(b, king.color.inv())).is_nonempty() {
        return None;
    }
    Some(Castle {
        side,
        rook_src,
        rook_dst: Coord::from_parts(side.rook_dst_file(), rank),
    })
}
