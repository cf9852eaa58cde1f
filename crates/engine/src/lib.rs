//! Match coordination: lifecycle, step log, timeouts, and ranking.
//!
//! A match moves `pending → active → finished`. Seats join and signal
//! readiness while pending; the host starts; steps append to a per-match
//! monotonic log while active; finishing every seat (voluntarily or by
//! timeout) ranks the field and freezes the match.
//!
//! The crate splits into a functional core and an imperative shell:
//! [`rules`] and [`ranking`] carry the decision logic (no I/O, fully
//! unit-tested), [`MatchRepository`] owns the SQL, and [`Coordinator`]
//! glues them together. Timeouts are evaluated lazily on every read or write that
//! touches a match; no background scheduler exists.
mod coordinator;
mod error;
mod matches;
pub mod ranking;
mod repository;
pub mod rules;
mod seat;
mod step;

pub use coordinator::*;
pub use error::*;
pub use matches::*;
pub use repository::*;
pub use seat::*;
pub use step::*;
