//! # practicehub-entity
//!
//! Domain entity models for PracticeHub. Every struct in this crate is an
//! in-memory record owned by one of the stores, or a read-only projection
//! of one. All entities derive `Debug`, `Clone`, `Serialize` and
//! `Deserialize`.

pub mod job;
pub mod progress;
