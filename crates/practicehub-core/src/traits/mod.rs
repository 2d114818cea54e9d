//! Core traits defined in `practicehub-core` and implemented by other crates.

pub mod cache;
pub mod sweeper;

pub use cache::{CacheProvider, CacheStats};
pub use sweeper::Sweeper;
