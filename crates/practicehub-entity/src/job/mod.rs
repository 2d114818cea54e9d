//! Asynchronous job domain entities.

pub mod kind;
pub mod model;
pub mod status;

pub use kind::JobType;
pub use model::{Job, JobPayload, JobSnapshot, JobStats, StatusCounts};
pub use status::JobStatus;
