//! Ray-based movement generation

use crate::board::{Board, Figure};
use crate::notation::{self, Decoded};
use crate::types::{Cell, Color, Coord, Piece};
use chesh_base::bitboard::Bitboard;
use chesh_base::geometry;

use arrayvec::ArrayVec;

/// Single step along a ray
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    /// Square where the piece lands
    pub dst: Coord,
    /// Square of the piece captured by this step
    ///
    /// Equals `dst` for a normal capture and differs from it for enpassant.
    pub capture: Option<Coord>,
}

impl Step {
    #[inline]
    pub const fn quiet(dst: Coord) -> Step {
        Step { dst, capture: None }
    }

    #[inline]
    pub const fn capture(dst: Coord) -> Step {
        Step {
            dst,
            capture: Some(dst),
        }
    }

    #[inline]
    pub fn is_enpassant(&self) -> bool {
        matches!(self.capture, Some(c) if c != self.dst)
    }
}

/// Steps in one direction, ordered from the nearest square
pub type Ray = ArrayVec<Step, 7>;

/// All the rays of a piece
pub type Rays = ArrayVec<Ray, 8>;

/// All the steps of a piece
pub type Reach = ArrayVec<Step, 32>;

const ORTHOGONAL: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

fn slide(b: &Board, fig: &Figure, dirs: &[(isize, isize)], rays: &mut Rays) {
    for &(df, dr) in dirs {
        let mut ray = Ray::new();
        let mut cur = fig.coord;
        while let Some(next) = cur.try_shift(df, dr) {
            let cell = b.get(next);
            if cell.is_empty() {
                ray.push(Step::quiet(next));
            } else {
                if cell.is_enemy_of(fig.color) {
                    ray.push(Step::capture(next));
                }
                break;
            }
            cur = next;
        }
        rays.push(ray);
    }
}

fn leap(b: &Board, fig: &Figure, offsets: &[(isize, isize)], rays: &mut Rays) {
    for &(df, dr) in offsets {
        let mut ray = Ray::new();
        if let Some(dst) = fig.coord.try_shift(df, dr) {
            let cell = b.get(dst);
            if cell.is_empty() {
                ray.push(Step::quiet(dst));
            } else if cell.is_enemy_of(fig.color) {
                ray.push(Step::capture(dst));
            }
        }
        rays.push(ray);
    }
}

/// Returns the square of the enemy pawn that can be captured enpassant by moving `df` files
/// aside, if the last move allows it
fn enpassant_victim(b: &Board, fig: &Figure, df: isize) -> Option<Coord> {
    let enemy = fig.color.inv();
    let (piece, src, dst) = match notation::decode(b.last_note()?).ok()? {
        Decoded::Move { piece, src, dst } => (piece, src, dst),
        Decoded::Resign => return None,
    };
    if piece != Piece::Pawn
        || src.file() != dst.file()
        || src.rank() != geometry::pawn_home_rank(enemy)
        || dst.rank() != geometry::double_advance_rank(enemy)
        || fig.coord.rank() != dst.rank()
        || fig.coord.try_shift(df, 0) != Some(dst)
        || b.get(dst) != Cell::from_parts(enemy, Piece::Pawn)
    {
        return None;
    }
    Some(dst)
}

fn pawn(b: &Board, fig: &Figure, rays: &mut Rays) {
    let fwd = geometry::pawn_forward_delta(fig.color);

    let mut ray = Ray::new();
    if let Some(one) = fig.coord.try_shift(0, fwd) {
        if b.get(one).is_empty() {
            ray.push(Step::quiet(one));
            if fig.dormant {
                if let Some(two) = one.try_shift(0, fwd) {
                    if b.get(two).is_empty() {
                        ray.push(Step::quiet(two));
                    }
                }
            }
        }
    }
    rays.push(ray);

    for df in [-1, 1] {
        let mut ray = Ray::new();
        if let Some(dst) = fig.coord.try_shift(df, fwd) {
            if b.get(dst).is_enemy_of(fig.color) {
                ray.push(Step::capture(dst));
            } else if let Some(victim) = enpassant_victim(b, fig, df) {
                if b.get(dst).is_empty() {
                    ray.push(Step {
                        dst,
                        capture: Some(victim),
                    });
                }
            }
        }
        rays.push(ray);
    }
}

/// Returns the rays of the piece `fig`
///
/// Sliding pieces get one ray per direction, running until the board edge, a friendly piece
/// (excluded) or an enemy piece (included as a capture). Knights and kings get one ray with at
/// most one step per offset. Pawns get a forward ray and two diagonal rays, the latter holding
/// either a capture or an enpassant step.
///
/// Castling and self-check are not considered here.
pub fn rays(b: &Board, fig: &Figure) -> Rays {
    let mut res = Rays::new();
    match fig.piece {
        Piece::Pawn => pawn(b, fig, &mut res),
        Piece::King => leap(b, fig, &KING, &mut res),
        Piece::Knight => leap(b, fig, &KNIGHT, &mut res),
        Piece::Bishop => slide(b, fig, &DIAGONAL, &mut res),
        Piece::Rook => slide(b, fig, &ORTHOGONAL, &mut res),
        Piece::Queen => {
            slide(b, fig, &ORTHOGONAL, &mut res);
            slide(b, fig, &DIAGONAL, &mut res);
        }
    }
    res
}

/// Returns all the steps of the piece `fig`, which are its rays flattened
pub fn reach(b: &Board, fig: &Figure) -> Reach {
    rays(b, fig).into_iter().flatten().collect()
}

/// Returns the squares threatened by the pieces of color `c`
///
/// Pawns threaten both their forward diagonal squares regardless of what stands there, and
/// never threaten by advancing. Other pieces threaten their reach.
pub fn threats(b: &Board, c: Color) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for fig in b.live().iter().filter(|f| f.color == c) {
        if fig.piece == Piece::Pawn {
            let fwd = geometry::pawn_forward_delta(c);
            for df in [-1, 1] {
                if let Some(dst) = fig.coord.try_shift(df, fwd) {
                    res.set(dst);
                }
            }
        } else {
            for step in reach(b, fig) {
                res.set(step.dst);
            }
        }
    }
    res
}
