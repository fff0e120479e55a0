//! Move validation and application

use crate::board::{Board, Figure};
use crate::castling::{self, Castle, CastlingSide};
use crate::check;
use crate::movegen;
use crate::notation::{self, Note};
use crate::tentative::Tentative;
use crate::types::{Coord, Piece, PromotePiece, Ret, Rets};
use chesh_base::geometry;

use log::debug;

fn check_flag(b: &mut Board, src: Coord, dst: Coord, capture: Option<Coord>) -> Option<Ret> {
    if !check::will_check(b, src, dst, capture) {
        return None;
    }
    if check::will_checkmate(b, src, dst, capture) {
        Some(Ret::Checkmate)
    } else {
        Some(Ret::Check)
    }
}

/// Move which passed validation and waits to be committed
struct Resolved {
    mover: Figure,
    rets: Rets,
    capture: Option<Coord>,
    castle: Option<Castle>,
}

impl Board {
    /// Validates the move from `src` to `dst` without changing the board
    ///
    /// On success, the returned flags describe the move, except for check and checkmate, which
    /// are determined later.
    fn resolve(&mut self, src: Coord, dst: Coord) -> Result<Resolved, Ret> {
        let mover = *self.at(src).ok_or(Ret::BadSrc)?;
        if mover.color != self.side() {
            return Err(Ret::BadTurn);
        }
        if self.get(dst).color() == Some(mover.color) {
            return Err(Ret::BadDst);
        }

        let mut rets = Rets::new();
        let mut capture = None;
        let mut castle = None;
        if castling::is_attempt(&mover, dst) {
            castle = Some(castling::resolve(self, &mover, dst).ok_or(Ret::BadCastle)?);
            rets.push(Ret::Castle);
        } else {
            let step = movegen::reach(self, &mover)
                .into_iter()
                .find(|s| s.dst == dst)
                .ok_or(Ret::InvalidMove)?;
            if let Some(c) = step.capture {
                rets.push(if c == dst {
                    Ret::Capture
                } else {
                    Ret::EnPassant
                });
            }
            capture = step.capture;
        }

        if check::will_be_checked(self, src, dst, capture) {
            return Err(Ret::Checked);
        }
        if mover.piece == Piece::Pawn && dst.rank() == geometry::promote_rank(mover.color) {
            rets.push(Ret::Promote);
        }

        Ok(Resolved {
            mover,
            rets,
            capture,
            castle,
        })
    }

    /// Adds check or checkmate to the flags of the resolved move
    ///
    /// For castling, the rook is the piece which may give check. It is tested with the king
    /// already standing on its destination, so the rook sees through the king's start square.
    fn add_check_flags(&mut self, res: &mut Resolved, src: Coord, dst: Coord) {
        let flag = match res.castle {
            Some(c) => Tentative::new(self, src, dst, None)
                .and_then(|mut king| check_flag(&mut king, c.rook_src, c.rook_dst, None)),
            None => check_flag(self, src, dst, res.capture),
        };
        if let Some(flag) = flag {
            res.rets.push(flag);
        }
    }

    fn commit(
        &mut self,
        res: Resolved,
        src: Coord,
        dst: Coord,
        promote: Option<PromotePiece>,
    ) -> Rets {
        let token = notation::notate(&res.rets, res.mover.piece, promote, src, dst);

        if let Some(c) = res.capture {
            self.kill(c);
        }
        if let Some(castle) = res.castle {
            if let Some(idx) = self.index_at(castle.rook_src) {
                let rook = &mut self.live[idx];
                rook.coord = castle.rook_dst;
                rook.dormant = false;
            }
        }
        if let Some(idx) = self.index_at(src) {
            let mover = &mut self.live[idx];
            mover.coord = dst;
            mover.dormant = false;
        }
        self.sync_grid();

        debug!("commit {} ({})", token, res.rets);
        self.history.push(Note::now(token));

        #[cfg(feature = "selftest")]
        self.selftest();

        res.rets
    }

    /// Makes the move from `src` to `dst`
    ///
    /// If the move is rejected, the returned flags contain exactly one error flag and the board is
    /// unchanged. If a pawn reaches the last rank, the returned flags contain [`Ret::Promote`] and
    /// the board is also unchanged: the move must be completed with [`Board::promote()`].
    /// Otherwise, the move is committed and appended to the history.
    ///
    /// # Example
    ///
    /// ```
    /// # use chesh::{Board, Ret};
    /// #
    /// let mut b = Board::initial();
    /// let rets = b.make_move("e2".parse().unwrap(), "e4".parse().unwrap());
    /// assert!(rets.is_empty());
    /// assert_eq!(b.last_note(), Some("Pe2e4"));
    ///
    /// let rets = b.make_move("e4".parse().unwrap(), "e5".parse().unwrap());
    /// assert_eq!(&rets[..], &[Ret::BadTurn]);
    /// ```
    pub fn make_move(&mut self, src: Coord, dst: Coord) -> Rets {
        let mut res = match self.resolve(src, dst) {
            Ok(res) => res,
            Err(e) => {
                debug!("reject {}{}: {}", src, dst, e);
                return e.into();
            }
        };
        if res.rets.has(Ret::Promote) {
            return res.rets;
        }
        self.add_check_flags(&mut res, src, dst);
        self.commit(res, src, dst, None)
    }

    /// Completes the promotion from `src` to `dst` requested by [`Board::make_move()`]
    ///
    /// `pending` are the flags returned by [`Board::make_move()`]. If they don't contain
    /// [`Ret::Promote`], the request is rejected with [`Ret::InvalidMove`].
    ///
    /// The move is validated again. If it doesn't lead to promotion anymore, the flags of the
    /// validation are returned and the board is unchanged. Otherwise, the pawn is replaced with a
    /// piece of kind `choice` and the move is committed.
    pub fn promote(
        &mut self,
        pending: &Rets,
        choice: PromotePiece,
        src: Coord,
        dst: Coord,
    ) -> Rets {
        if !pending.has(Ret::Promote) {
            debug!("reject promotion {}{}: nothing pending", src, dst);
            return Ret::InvalidMove.into();
        }
        let mut res = match self.resolve(src, dst) {
            Ok(res) => res,
            Err(e) => {
                debug!("reject promotion {}{}: {}", src, dst, e);
                return e.into();
            }
        };
        if !res.rets.has(Ret::Promote) {
            return res.rets;
        }

        if let Some(idx) = self.index_at(src) {
            self.live[idx] = Figure {
                piece: choice.into(),
                color: res.mover.color,
                coord: src,
                dormant: false,
            };
            self.sync_grid();
        }
        self.add_check_flags(&mut res, src, dst);
        self.commit(res, src, dst, Some(choice))
    }

    /// Checks whether the piece on `c` may be moved by the side to move
    ///
    /// Returns [`Ret::Selected`] on success, or [`Ret::BadSrc`] or [`Ret::BadTurn`].
    pub fn select(&self, c: Coord) -> Ret {
        match self.at(c) {
            None => Ret::BadSrc,
            Some(f) if f.color != self.side() => Ret::BadTurn,
            Some(_) => Ret::Selected,
        }
    }

    /// Returns all the squares where the piece on `src` may move
    ///
    /// These are exactly the squares for which [`Board::make_move()`] doesn't return an error,
    /// including castling and promotions.
    pub fn legal_destinations(&self, src: Coord) -> Vec<Coord> {
        let mover = match self.at(src) {
            Some(f) if f.color == self.side() => *f,
            _ => return Vec::new(),
        };

        let mut dsts: Vec<Coord> = movegen::reach(self, &mover).iter().map(|s| s.dst).collect();
        if mover.piece == Piece::King {
            for side in [CastlingSide::King, CastlingSide::Queen] {
                let dst = Coord::from_parts(side.king_dst_file(), mover.coord.rank());
                if castling::is_attempt(&mover, dst) {
                    dsts.push(dst);
                }
            }
        }

        let mut scratch = self.clone();
        dsts.retain(|&dst| scratch.resolve(src, dst).is_ok());
        dsts
    }
}
