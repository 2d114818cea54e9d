//! User progress snapshot model.
//!
//! Timestamps are milliseconds since the Unix epoch, as reported by clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use practicehub_core::types::UserId;

/// One solved problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedProblem {
    /// Problem slug, e.g. `"two-sum"`.
    pub slug: String,
    /// When the problem was first solved.
    pub timestamp: i64,
    /// Accepted solution.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_runtime: Option<f64>,
}

/// Unsubmitted code for a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub code: String,
    pub updated_at: i64,
}

/// A user's complete solved-problems-and-drafts state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    /// Owner of the snapshot.
    pub user_id: UserId,
    /// When the server last stored this snapshot.
    #[serde(default)]
    pub last_synced_at: i64,
    /// At most one entry per slug.
    #[serde(default)]
    pub solved_problems: Vec<SolvedProblem>,
    /// Drafts keyed by slug.
    #[serde(default)]
    pub drafts: BTreeMap<String, Draft>,
}

impl UserProgress {
    /// Empty snapshot for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            last_synced_at: 0,
            solved_problems: Vec::new(),
            drafts: BTreeMap::new(),
        }
    }

    /// The solved entry for `slug`, if any.
    pub fn solved(&self, slug: &str) -> Option<&SolvedProblem> {
        self.solved_problems.iter().find(|p| p.slug == slug)
    }

    /// Whether `slug` has been solved.
    pub fn is_solved(&self, slug: &str) -> bool {
        self.solved(slug).is_some()
    }
}

/// Progress store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Number of stored users.
    pub total_users: usize,
    /// Solved entries summed over all users.
    pub total_solved: usize,
}
