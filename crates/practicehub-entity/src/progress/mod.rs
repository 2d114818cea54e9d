//! Per-user solved-problem history and drafts.

pub mod model;

pub use model::{Draft, ProgressStats, SolvedProblem, UserProgress};
