//! Single-player leaderboard: best time per user per difficulty.
//!
//! An entry is upserted only when a strictly better time arrives. Entries
//! inside the top N for their difficulty keep a stored replay (board
//! descriptor plus ordered steps); replays falling out of the window are
//! pruned synchronously after each submit.
mod entry;
mod replay;
mod repository;
mod service;

pub use entry::*;
pub use replay::*;
pub use repository::*;
pub use service::*;
