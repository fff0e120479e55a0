//! Check and checkmate detection
//!
//! All the functions here evaluate a move by applying it tentatively via [`Tentative`] and
//! inspecting the resulting position. The board is restored before they return.

use crate::board::{Board, Figure};
use crate::movegen::{self, Step};
use crate::tentative::Tentative;
use crate::types::Coord;

use arrayvec::ArrayVec;
use log::trace;

/// Squares which the checked side may occupy to get rid of the check
///
/// Contains the squares between the attacker and the king, and the attacker's own square.
pub type Line = ArrayVec<Coord, 8>;

fn gives_check(b: &Board, attacker: &Figure) -> bool {
    match b.king_pos(attacker.color.inv()) {
        Some(king) => movegen::reach(b, attacker)
            .iter()
            .any(|s| s.capture == Some(king)),
        None => false,
    }
}

/// Returns `true` if the king of the same color as `fig` is attacked by an enemy piece
pub(crate) fn is_attacked(b: &Board, fig: &Figure) -> bool {
    let king = match b.king_pos(fig.color) {
        Some(king) => king,
        None => return false,
    };
    b.live()
        .iter()
        .filter(|e| e.color != fig.color)
        .any(|e| movegen::reach(b, e).iter().any(|s| s.capture == Some(king)))
}

/// Returns `true` if the piece on `src` checks the enemy king after moving to `dst`
///
/// Only the reach of the moved piece is considered.
pub fn will_check(b: &mut Board, src: Coord, dst: Coord, capture: Option<Coord>) -> bool {
    match Tentative::new(b, src, dst, capture) {
        Some(t) => {
            let mover = *t.mover();
            gives_check(&t, &mover)
        }
        None => false,
    }
}

/// Returns `true` if the king of the piece on `src` is attacked after it moves to `dst`
pub fn will_be_checked(b: &mut Board, src: Coord, dst: Coord, capture: Option<Coord>) -> bool {
    match Tentative::new(b, src, dst, capture) {
        Some(t) => {
            let mover = *t.mover();
            is_attacked(&t, &mover)
        }
        None => false,
    }
}

/// Returns the line of attack of `attacker` against the king on `king`
///
/// This is the ray of `attacker` which captures the king, with the king's square replaced by the
/// square of the attacker. For knights and pawns, it consists of the attacker's square only.
///
/// Returns `None` if `attacker` doesn't attack `king`.
pub fn line_of_attack(b: &Board, attacker: &Figure, king: Coord) -> Option<Line> {
    movegen::rays(b, attacker).into_iter().find_map(|ray| {
        let pos = ray.iter().position(|s| s.capture == Some(king))?;
        let mut line: Line = ray[..pos].iter().map(|s| s.dst).collect();
        line.push(attacker.coord);
        Some(line)
    })
}

fn relieves(b: &mut Board, defender: &Figure, step: &Step) -> bool {
    !will_be_checked(b, defender.coord, step.dst, step.capture)
}

/// Returns `true` if the piece on `src` checkmates the enemy king after moving to `dst`
///
/// The enemy is not mated if its king has a safe step, or if some enemy piece can move onto the
/// line of attack (thus blocking it or capturing the attacker) without leaving its king attacked.
///
/// Only the moved piece is considered as the attacker, so the result is meaningful only when
/// [`will_check()`] holds for the same move.
pub fn will_checkmate(b: &mut Board, src: Coord, dst: Coord, capture: Option<Coord>) -> bool {
    let mut t = match Tentative::new(b, src, dst, capture) {
        Some(t) => t,
        None => return false,
    };
    let attacker = *t.mover();
    let king = match t.king_index(attacker.color.inv()) {
        Some(idx) => t.live()[idx],
        None => return false,
    };

    for step in movegen::reach(&t, &king) {
        if relieves(&mut t, &king, &step) {
            trace!("{} escapes to {}", king.coord, step.dst);
            return false;
        }
    }

    let line = match line_of_attack(&t, &attacker, king.coord) {
        Some(line) => line,
        None => return false,
    };

    let defenders: Vec<Figure> = t
        .live()
        .iter()
        .filter(|f| f.color == king.color && f.coord != king.coord)
        .copied()
        .collect();
    for defender in &defenders {
        for step in movegen::reach(&t, defender) {
            let covers = line.contains(&step.dst) || step.capture == Some(attacker.coord);
            if covers && relieves(&mut t, defender, &step) {
                trace!(
                    "{} at {} covers the line by moving to {}",
                    defender.symbol(),
                    defender.coord,
                    step.dst
                );
                return false;
            }
        }
    }

    trace!("{} at {} mates", attacker.symbol(), attacker.coord);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement, &[]).unwrap()
    }

    #[test]
    fn test_will_check() {
        let mut b = board("4k3/8/8/8/8/8/8/R3K3");
        let before = b.clone();
        assert!(will_check(&mut b, sq("a1"), sq("a8"), None));
        assert!(!will_check(&mut b, sq("a1"), sq("a7"), None));
        assert_eq!(b, before);

        let mut b = board("4k3/8/8/8/6N1/8/8/4K3");
        assert!(will_check(&mut b, sq("g4"), sq("f6"), None));
        assert!(!will_check(&mut b, sq("g4"), sq("e5"), None));
        assert!(!will_check(&mut b, sq("e4"), sq("e5"), None));
    }

    #[test]
    fn test_will_be_checked() {
        // Pinned bishop
        let mut b = board("4k3/4r3/8/8/8/8/4B3/4K3");
        let before = b.clone();
        assert!(will_be_checked(&mut b, sq("e2"), sq("d3"), None));
        assert!(!will_be_checked(&mut b, sq("e1"), sq("d1"), None));
        assert_eq!(b, before);

        // Capturing the pinner is fine
        let mut b = board("4k3/8/8/8/4r3/8/4R3/4K3");
        assert!(!will_be_checked(&mut b, sq("e2"), sq("e4"), Some(sq("e4"))));
        assert!(will_be_checked(&mut b, sq("e2"), sq("d2"), None));

        // Pawns attack diagonally
        let mut b = board("4k3/8/8/8/8/3p4/8/4K3");
        assert!(will_be_checked(&mut b, sq("e1"), sq("e2"), None));
        assert!(!will_be_checked(&mut b, sq("e1"), sq("d2"), None));
    }

    #[test]
    fn test_line_of_attack() {
        let b = board("4k3/8/8/8/8/8/8/R3K3");
        let rook = *b.at(sq("a1")).unwrap();
        assert_eq!(line_of_attack(&b, &rook, sq("e8")), None);

        let b = Board::from_placement("R3k3/8/8/8/8/8/8/4K3", &["Ra1a8"]).unwrap();
        let rook = *b.at(sq("a8")).unwrap();
        let line = line_of_attack(&b, &rook, sq("e8")).unwrap();
        assert_eq!(line.as_slice(), &[sq("b8"), sq("c8"), sq("d8"), sq("a8")]);

        let b = Board::from_placement("4k3/8/5N2/8/8/8/8/4K3", &["Ng4f6"]).unwrap();
        let knight = *b.at(sq("f6")).unwrap();
        let line = line_of_attack(&b, &knight, sq("e8")).unwrap();
        assert_eq!(line.as_slice(), &[sq("f6")]);
    }

    #[test]
    fn test_back_rank_mate() {
        let mut b = board("6k1/5ppp/8/8/8/8/8/R5K1");
        let before = b.clone();
        assert!(will_check(&mut b, sq("a1"), sq("a8"), None));
        assert!(will_checkmate(&mut b, sq("a1"), sq("a8"), None));
        assert_eq!(b, before);

        // King escapes to h7
        let mut b = board("6k1/5pp1/7p/8/8/8/8/R5K1");
        assert!(!will_checkmate(&mut b, sq("a1"), sq("a8"), None));
    }

    #[test]
    fn test_block() {
        let mut b = board("6k1/5ppp/8/8/8/8/8/R2r2K1");
        assert!(!will_checkmate(&mut b, sq("a1"), sq("a8"), None));
        let mut b = board("6k1/5ppp/8/8/1b6/8/8/R5K1");
        assert!(!will_checkmate(&mut b, sq("a1"), sq("a8"), None));
    }

    #[test]
    fn test_capture_the_checker() {
        let mut b = board("r5k1/5ppp/8/8/8/8/8/1R4K1");
        assert!(!will_checkmate(&mut b, sq("b1"), sq("b8"), None));

        // Protected queen can't be taken by the king
        let mut b = board("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR");
        assert!(will_check(&mut b, sq("h5"), sq("f7"), Some(sq("f7"))));
        assert!(will_checkmate(&mut b, sq("h5"), sq("f7"), Some(sq("f7"))));

        let mut b = board("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/4P3/8/PPPP1PPP/RNB1K1NR");
        assert!(will_check(&mut b, sq("h5"), sq("f7"), Some(sq("f7"))));
        assert!(!will_checkmate(&mut b, sq("h5"), sq("f7"), Some(sq("f7"))));
    }

    #[test]
    fn test_enpassant_capture_of_checker() {
        // The only relief is taking the advanced pawn enpassant
        let mut b = board("8/8/4ppp1/4pkp1/3p1pp1/8/4P3/K3R3");
        let before = b.clone();
        assert!(will_check(&mut b, sq("e2"), sq("e4"), None));
        assert!(!will_checkmate(&mut b, sq("e2"), sq("e4"), None));
        assert_eq!(b, before);

        // A bishop instead of the pawns can't take enpassant, and the rook guards e4
        let mut b = board("8/8/4ppp1/4pkp1/5bp1/8/4P3/K3R3");
        assert!(will_check(&mut b, sq("e2"), sq("e4"), None));
        assert!(will_checkmate(&mut b, sq("e2"), sq("e4"), None));
    }

    #[test]
    fn test_double_check() {
        // Knight checks and uncovers the rook, so capturing the knight doesn't help
        let mut b = board("3qkb2/2pp1p2/8/8/4N3/8/8/4R1K1");
        assert!(will_check(&mut b, sq("e4"), sq("d6"), None));
        assert!(will_checkmate(&mut b, sq("e4"), sq("d6"), None));

        // Without the rook, the knight is simply taken
        let mut b = board("3qkb2/2pppp2/8/8/4N3/8/8/6K1");
        assert!(will_check(&mut b, sq("e4"), sq("d6"), None));
        assert!(!will_checkmate(&mut b, sq("e4"), sq("d6"), None));
    }
}
