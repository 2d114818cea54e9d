//! Job type identifier.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Job type identifier.
///
/// The set is open: any string is a valid type, and processors are
/// registered for types at runtime. The constants name the types the
/// platform's adapters register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobType(Cow<'static, str>);

impl JobType {
    /// Code execution.
    pub const EXECUTE: JobType = JobType(Cow::Borrowed("execute"));
    /// AI tutor conversation turn.
    pub const AI_TUTOR: JobType = JobType(Cow::Borrowed("ai_tutor"));
    /// AI hint for a problem.
    pub const AI_HINT: JobType = JobType(Cow::Borrowed("ai_hint"));
    /// AI explanation of a solution.
    pub const AI_EXPLAIN: JobType = JobType(Cow::Borrowed("ai_explain"));
    /// AI problem generation.
    pub const GENERATE: JobType = JobType(Cow::Borrowed("generate"));

    /// Create a job type from any name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Return the type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for JobType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
