//! Convenience result type alias for PracticeHub.

use crate::error::AppError;

/// A specialized `Result` type for PracticeHub operations.
pub type AppResult<T> = Result<T, AppError>;
