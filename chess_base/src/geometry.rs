use crate::types::{Color, Rank};

/// Rank where the king and rooks of color `c` start
pub const fn home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank where the pawns of color `c` start
pub const fn pawn_home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Rank where a pawn of color `c` lands after its double advance
///
/// This is also the only rank from which an enemy pawn may capture it enpassant.
pub const fn double_advance_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    }
}

pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}
