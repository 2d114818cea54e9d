//! Core type definitions used across the PracticeHub workspace.

pub mod id;

pub use id::*;
