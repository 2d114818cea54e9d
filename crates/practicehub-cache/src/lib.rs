//! # practicehub-cache
//!
//! In-process TTL cache used to memoize expensive external calls (AI
//! responses, code execution results). Built on
//! [moka](https://crates.io/crates/moka) with a per-entry expiry policy,
//! lazy expiry on read and a periodic active expiry scan driven by the
//! sweep scheduler.

pub mod memory;

pub use memory::MemoryCacheProvider;
