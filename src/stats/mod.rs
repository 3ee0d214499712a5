//! Derived views. Every function here is a pure recomputation over `(roster, ledger)`;
//! nothing is cached, so a view can never be stale.

pub mod matrix;
pub mod scoreboard;
pub mod summary;
pub mod timeline;

pub use matrix::{stat_matrix, MatrixRow, StatMatrix};
pub use scoreboard::{scoreboard, Scoreboard};
pub use summary::{player_summaries, PlayerSummary};
pub use timeline::{timeline, TimelineEntry};
