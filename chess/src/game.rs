//! Game state on top of the board

use crate::board::Board;
use crate::notation::{self, Decoded, Note, NotationError, RESIGN};
use crate::snapshot::Snapshot;
use crate::types::{Color, Coord, DrawKind, Outcome, Piece, PromotePiece, Ret, Rets, WinKind};

use log::{debug, info};
use thiserror::Error;

/// Reason why a token cannot be replayed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplayErrorKind {
    #[error("bad token: {0}")]
    Notation(#[from] NotationError),
    #[error("move rejected: {0}")]
    Rejected(Ret),
    #[error("promotion choice missing")]
    NoPromotion,
    #[error("token names {token:?}, but the piece is {found:?}")]
    WrongPiece { token: Piece, found: Piece },
    #[error("game is already finished")]
    Finished,
}

/// Error replaying a list of notation tokens with [`Game::from_notes()`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot replay note #{}: {}", .pos + 1, .kind)]
pub struct ReplayError {
    pub pos: usize,
    pub kind: ReplayErrorKind,
}

/// Chess game
///
/// Wraps a [`Board`] and tracks what the board alone doesn't know: whether the game is over,
/// and which sides offer a draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    outcome: Option<Outcome>,
    draw_offers: [bool; 2],
}

impl Game {
    /// Starts a game from the initial position
    pub fn new() -> Game {
        Game::from_board(Board::initial())
    }

    pub fn from_board(board: Board) -> Game {
        Game {
            board,
            outcome: None,
            draw_offers: [false; 2],
        }
    }

    /// Replays the notation tokens from the initial position
    ///
    /// Suffixes of the tokens are not trusted: the moves are validated and their flags are
    /// computed again. Promotion tokens must carry the promotion letter.
    ///
    /// # Example
    ///
    /// ```
    /// # use chesh::{Color, Game, Outcome, WinKind};
    /// #
    /// let game = Game::from_notes(&["Pf2f3", "Pe7e5", "Pg2g4", "Qd8h4#"]).unwrap();
    /// assert_eq!(
    ///     game.outcome(),
    ///     Some(Outcome::Win { side: Color::Black, kind: WinKind::Checkmate }),
    /// );
    /// ```
    pub fn from_notes(notes: &[&str]) -> Result<Game, ReplayError> {
        let mut game = Game::new();
        for (pos, note) in notes.iter().enumerate() {
            game.replay(note)
                .map_err(|kind| ReplayError { pos, kind })?;
        }
        Ok(game)
    }

    fn replay(&mut self, note: &str) -> Result<(), ReplayErrorKind> {
        if self.is_finished() {
            return Err(ReplayErrorKind::Finished);
        }
        let (src, dst) = match notation::decode(note)? {
            Decoded::Resign => {
                self.resign(self.board.side());
                return Ok(());
            }
            Decoded::Move { piece, src, dst } => {
                if let Some(fig) = self.board.at(src) {
                    if fig.piece != piece {
                        return Err(ReplayErrorKind::WrongPiece {
                            token: piece,
                            found: fig.piece,
                        });
                    }
                }
                (src, dst)
            }
        };
        let mut rets = self.make_move(src, dst);
        if rets.has(Ret::Promote) {
            let choice = notation::promotion(note).ok_or(ReplayErrorKind::NoPromotion)?;
            rets = self.promote(&rets, choice, src, dst);
        }
        match rets.error() {
            Some(e) => Err(ReplayErrorKind::Rejected(e)),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns `true` if the side `c` has a standing draw offer
    #[inline]
    pub fn offers_draw(&self, c: Color) -> bool {
        self.draw_offers[c.index()]
    }

    fn finish(&mut self, outcome: Outcome) {
        info!("game over: {}", outcome);
        self.outcome = Some(outcome);
    }

    fn after_move(&mut self, rets: &Rets) {
        if rets.has(Ret::Checkmate) {
            // The mover is the side which moved before the last note
            self.finish(Outcome::Win {
                side: self.board.side().inv(),
                kind: WinKind::Checkmate,
            });
        }
    }

    /// Makes the move from `src` to `dst`, see [`Board::make_move()`]
    ///
    /// Returns [`Ret::BadTurn`] if the game is finished.
    pub fn make_move(&mut self, src: Coord, dst: Coord) -> Rets {
        if self.is_finished() {
            debug!("reject {}{}: game is finished", src, dst);
            return Ret::BadTurn.into();
        }
        let rets = self.board.make_move(src, dst);
        self.after_move(&rets);
        rets
    }

    /// Makes the move given by 1-based file and rank numbers
    ///
    /// Returns [`Ret::BadSrc`] or [`Ret::BadDst`] if the corresponding square is off the board.
    pub fn move_at(&mut self, src_file: u8, src_rank: u8, dst_file: u8, dst_rank: u8) -> Rets {
        let src = match Coord::new(src_file, src_rank) {
            Some(c) => c,
            None => return Ret::BadSrc.into(),
        };
        let dst = match Coord::new(dst_file, dst_rank) {
            Some(c) => c,
            None => return Ret::BadDst.into(),
        };
        self.make_move(src, dst)
    }

    /// Completes a pending promotion, see [`Board::promote()`]
    ///
    /// Returns [`Ret::BadTurn`] if the game is finished.
    pub fn promote(
        &mut self,
        pending: &Rets,
        choice: PromotePiece,
        src: Coord,
        dst: Coord,
    ) -> Rets {
        if self.is_finished() {
            return Ret::BadTurn.into();
        }
        let rets = self.board.promote(pending, choice, src, dst);
        self.after_move(&rets);
        rets
    }

    /// See [`Board::select()`]
    ///
    /// Returns [`Ret::BadTurn`] if the game is finished.
    pub fn select(&self, c: Coord) -> Ret {
        if self.is_finished() {
            return Ret::BadTurn;
        }
        self.board.select(c)
    }

    /// Resigns on behalf of side `c`
    ///
    /// The resignation token is appended to the history and the other side wins. Does nothing if
    /// the game is already finished.
    pub fn resign(&mut self, c: Color) {
        if self.is_finished() {
            return;
        }
        self.board.history.push(Note::now(RESIGN.to_string()));
        self.finish(Outcome::Win {
            side: c.inv(),
            kind: WinKind::Resign,
        });
    }

    /// Offers a draw on behalf of side `c`
    ///
    /// The game ends in a draw once both sides offer it. Returns `true` in this case.
    pub fn offer_draw(&mut self, c: Color) -> bool {
        if self.is_finished() {
            return false;
        }
        self.draw_offers[c.index()] = true;
        if self.draw_offers.iter().all(|&x| x) {
            self.finish(Outcome::Draw(DrawKind::Agreement));
            return true;
        }
        false
    }

    /// Withdraws the draw offer of side `c`
    pub fn withdraw_draw(&mut self, c: Color) {
        self.draw_offers[c.index()] = false;
    }

    /// Takes a snapshot of the board
    pub fn snapshot(&self) -> Snapshot {
        self.board.snapshot()
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Figure;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new();
        for (src, dst) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4")] {
            assert!(game.make_move(sq(src), sq(dst)).is_empty());
        }
        let rets = game.make_move(sq("d8"), sq("h4"));
        assert_eq!(&rets[..], &[Ret::Checkmate]);
        assert_eq!(
            game.outcome(),
            Some(Outcome::Win {
                side: Color::Black,
                kind: WinKind::Checkmate
            })
        );

        let before = game.clone();
        assert_eq!(&game.make_move(sq("e2"), sq("e4"))[..], &[Ret::BadTurn]);
        assert_eq!(game.select(sq("e2")), Ret::BadTurn);
        game.resign(Color::White);
        assert!(!game.offer_draw(Color::White));
        assert_eq!(game, before);
    }

    #[test]
    fn test_move_at() {
        let mut game = Game::new();
        assert_eq!(&game.move_at(0, 2, 5, 4)[..], &[Ret::BadSrc]);
        assert_eq!(&game.move_at(5, 9, 5, 4)[..], &[Ret::BadSrc]);
        assert_eq!(&game.move_at(5, 2, 5, 0)[..], &[Ret::BadDst]);
        assert_eq!(&game.move_at(5, 2, 9, 4)[..], &[Ret::BadDst]);
        assert!(game.board().history().is_empty());
        assert!(game.move_at(5, 2, 5, 4).is_empty());
        assert_eq!(game.board().last_note(), Some("Pe2e4"));
    }

    #[test]
    fn test_resign() {
        let mut game = Game::new();
        assert!(game.make_move(sq("e2"), sq("e4")).is_empty());
        game.resign(Color::Black);
        assert_eq!(
            game.outcome(),
            Some(Outcome::Win {
                side: Color::White,
                kind: WinKind::Resign
            })
        );
        assert_eq!(game.board().last_note(), Some("bye"));
        assert_eq!(game.board().live().len(), 32);
        assert_eq!(game.snapshot().history.len(), 2);
    }

    #[test]
    fn test_draw() {
        let mut game = Game::new();
        assert!(!game.offer_draw(Color::White));
        assert!(game.offers_draw(Color::White));
        game.withdraw_draw(Color::White);
        assert!(!game.offer_draw(Color::Black));
        assert!(!game.is_finished());
        assert!(game.offer_draw(Color::White));
        assert_eq!(game.outcome(), Some(Outcome::Draw(DrawKind::Agreement)));
        assert_eq!(game.outcome().and_then(|o| o.winner()), None);
    }

    #[test]
    fn test_from_notes() {
        let game = Game::from_notes(&["Pe2e4", "Pe7e5", "Ng1f3", "bye"]).unwrap();
        assert_eq!(
            game.outcome(),
            Some(Outcome::Win {
                side: Color::White,
                kind: WinKind::Resign
            })
        );
        assert_eq!(game.board().history().len(), 4);

        let game = Game::from_notes(&[
            "Pa2a4", "Pb7b5", "Pa4b5:", "Ng8f6", "Pb5b6", "Pe7e6", "Pb6a7:", "Bf8e7",
            "Pa7b8Q:",
        ])
        .unwrap();
        assert_eq!(game.board().last_note(), Some("Pa7b8Q:"));
        assert_eq!(game.board().at(sq("b8")).map(Figure::symbol), Some('Q'));

        assert_eq!(
            Game::from_notes(&["Pe2e4", "Pe2e4"]),
            Err(ReplayError {
                pos: 1,
                kind: ReplayErrorKind::Rejected(Ret::BadSrc)
            })
        );
        assert_eq!(
            Game::from_notes(&["Ne2e4"]),
            Err(ReplayError {
                pos: 0,
                kind: ReplayErrorKind::WrongPiece {
                    token: Piece::Knight,
                    found: Piece::Pawn
                }
            })
        );
        assert_eq!(
            Game::from_notes(&["Pe2e5"]),
            Err(ReplayError {
                pos: 0,
                kind: ReplayErrorKind::Rejected(Ret::InvalidMove)
            })
        );
        assert!(matches!(
            Game::from_notes(&["Pe2e4", "??"]),
            Err(ReplayError {
                pos: 1,
                kind: ReplayErrorKind::Notation(_)
            })
        ));
        assert_eq!(
            Game::from_notes(&["bye", "Pe7e5"]),
            Err(ReplayError {
                pos: 1,
                kind: ReplayErrorKind::Finished
            })
        );
    }

    #[test]
    fn test_random_playout() {
        let mut rng = StdRng::seed_from_u64(0x5eed_c4e5);
        for _ in 0..8 {
            let mut game = Game::new();
            for _ in 0..120 {
                let board = game.board();
                let side = board.side();
                let srcs: Vec<Coord> = board
                    .live()
                    .iter()
                    .filter(|f| f.color == side)
                    .map(|f| f.coord)
                    .collect();
                let moves: Vec<(Coord, Coord)> = srcs
                    .iter()
                    .flat_map(|&src| {
                        board
                            .legal_destinations(src)
                            .into_iter()
                            .map(move |dst| (src, dst))
                    })
                    .collect();
                let (src, dst) = match moves.choose(&mut rng) {
                    Some(&mv) => mv,
                    None => break,
                };

                let len = board.history().len();
                let mut rets = game.make_move(src, dst);
                assert!(rets.is_ok(), "{}{} rejected: {}", src, dst, rets);
                if rets.has(Ret::Promote) && game.board().history().len() == len {
                    rets = game.promote(&rets, PromotePiece::Queen, src, dst);
                    assert!(rets.is_ok());
                }

                let board = game.board();
                board.selftest();
                assert_eq!(board.history().len(), len + 1);
                assert_eq!(board.side() == Color::White, board.history().len() % 2 == 0);
                assert_eq!(board.live().len() + board.captured().len(), 32);
                let expected = format!("{}{}", src, dst);
                let note = board.last_note().unwrap();
                assert_eq!(notation::denotate(note), Ok(expected.as_str()));
                if game.is_finished() {
                    break;
                }
            }
        }
    }
}
