//! Deterministic board agreement and reveal replay.
//!
//! A match's board is fixed by the tuple `(width, height, mines, seed)`:
//! every party that holds the tuple reproduces the identical mine layout,
//! with the first-revealed cell and its 8-neighborhood guaranteed clear.
//! The server stores and serves the tuple; it re-runs generation only to
//! replay the step log when ranking a finished match.
//!
//! ## Types
//!
//! - [`Difficulty`] — Named presets fixing `(width, height, mines)`
//! - [`Layout`] — Deterministic mine placement derived from a seed
//! - [`Sweep`] — Reveal-only replay of a step log over a layout
//! - [`Rng`] — Platform-independent Xorshift128+ generator
mod difficulty;
mod layout;
mod rng;
mod seed;
mod sweep;

pub use difficulty::*;
pub use layout::*;
pub use rng::*;
pub use seed::*;
pub use sweep::*;
