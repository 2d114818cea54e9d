//! Reconciliation of a client snapshot with the stored one.
//!
//! Solved entries keep the order in which their slug was first seen, server
//! entries first. A later entry for a known slug replaces the kept one only
//! if its timestamp is strictly smaller; a draft replaces the kept one only
//! if its `updated_at` is strictly larger. Ties keep what is already there,
//! which makes merging a snapshot with itself a no-op.

use std::collections::HashMap;

use practicehub_core::types::UserId;
use practicehub_entity::progress::{SolvedProblem, UserProgress};

/// Merge `client` into `server` and stamp the result for `user_id` at `now`
/// (milliseconds since the Unix epoch).
///
/// With no server record the client snapshot is adopted, with duplicate
/// slugs collapsed.
pub fn merge_progress(
    server: Option<&UserProgress>,
    client: UserProgress,
    user_id: &UserId,
    now: i64,
) -> UserProgress {
    let mut solved = SolvedSet::default();
    let mut drafts = server.map(|s| s.drafts.clone()).unwrap_or_default();

    if let Some(server) = server {
        for problem in &server.solved_problems {
            solved.offer(problem.clone());
        }
    }
    for problem in client.solved_problems {
        solved.offer(problem);
    }

    for (slug, draft) in client.drafts {
        let newer = drafts
            .get(&slug)
            .is_none_or(|existing| draft.updated_at > existing.updated_at);
        if newer {
            drafts.insert(slug, draft);
        }
    }

    UserProgress {
        user_id: user_id.clone(),
        last_synced_at: now,
        solved_problems: solved.into_vec(),
        drafts,
    }
}

/// Solved entries keyed by slug, in first-seen order.
#[derive(Default)]
struct SolvedSet {
    entries: Vec<SolvedProblem>,
    index: HashMap<String, usize>,
}

impl SolvedSet {
    fn offer(&mut self, problem: SolvedProblem) {
        match self.index.get(&problem.slug) {
            Some(&i) => {
                if problem.timestamp < self.entries[i].timestamp {
                    self.entries[i] = problem;
                }
            }
            None => {
                self.index.insert(problem.slug.clone(), self.entries.len());
                self.entries.push(problem);
            }
        }
    }

    fn into_vec(self) -> Vec<SolvedProblem> {
        self.entries
    }
}
