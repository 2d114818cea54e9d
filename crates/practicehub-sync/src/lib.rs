//! # practicehub-sync
//!
//! Server-side copy of each user's solved problems and drafts. Clients push
//! their local snapshot and receive the reconciled one back:
//! - Solved problems are unioned by slug, the earliest solve wins
//! - Drafts are unioned by slug, the latest edit wins
//! - Records not synced within the configured horizon are swept

pub mod merge;
pub mod store;

pub use merge::merge_progress;
pub use store::ProgressStore;
