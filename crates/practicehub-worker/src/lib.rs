//! In-process asynchronous job engine for PracticeHub.
//!
//! This crate provides:
//! - A processor registry mapping job types to their handlers
//! - A job queue holding every job record with per-owner visibility
//! - A runner that dispatches each job on its own task, bounded by a
//!   concurrency limit, and writes the outcome back into the queue
//! - The [`JobEngine`] facade consumed by the routing layer and by the
//!   adapters that register processors
//! - A scheduler running the periodic sweeps of every store

pub mod engine;
pub mod executor;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use engine::JobEngine;
pub use executor::{JobProcessor, ProcessorError, ProcessorRegistry, processor_fn};
pub use runner::JobEvent;
pub use scheduler::SweepScheduler;
