//! # practicehub-core
//!
//! Core crate for PracticeHub. Contains the configuration schemas, typed
//! identifiers, the traits implemented by the cache and the periodic
//! sweepers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PracticeHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
