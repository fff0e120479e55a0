//! # Base types for chesh
//!
//! This is an auxiliary crate for `chesh`, which contains the plain value types: squares, colors,
//! piece kinds, cells and square sets.
//!
//! Normally you don't want to use this crate directly. Use `chesh` instead, which re-exports
//! everything needed.

pub mod bitboard;
pub mod geometry;
pub mod types;
