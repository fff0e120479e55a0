//! Chess rules engine
//!
//! The engine keeps the board as a roster of live pieces, a roster of captured pieces and a
//! history of notation tokens. Moves are generated along per-piece rays, and check is detected by
//! applying a move tentatively and reverting it afterwards.
//!
//! Move requests never fail with an error: they return a list of [`Ret`] flags describing either
//! what the move did or why it was rejected.
//!
//! # Example
//!
//! ```
//! # use chesh::{Game, Ret};
//! #
//! let mut game = Game::new();
//! assert!(game.move_at(5, 2, 5, 4).is_empty());
//! assert_eq!(&game.move_at(5, 4, 5, 5)[..], &[Ret::BadTurn]);
//! assert_eq!(game.board().last_note(), Some("Pe2e4"));
//! ```

pub mod board;
pub mod castling;
pub mod check;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod snapshot;
pub mod tentative;
pub mod types;

pub use chesh_base::bitboard::Bitboard;
pub use chesh_base::geometry;

pub use board::{Board, Figure, PlacementError};
pub use castling::{Castle, CastlingSide};
pub use game::{Game, ReplayError};
pub use movegen::Step;
pub use notation::{Decoded, Note, NotationError};
pub use snapshot::{FigureView, Snapshot};
pub use tentative::Tentative;
pub use types::{
    Cell, Color, Coord, DrawKind, File, Outcome, Piece, PromotePiece, Rank, Ret, Rets, WinKind,
};
