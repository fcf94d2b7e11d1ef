//! Commit statistics
//!
//! Derives per-day commit counts from a raw commit listing for the
//! project activity chart.

use std::collections::BTreeMap;

use crate::models::{CommitStat, RepoCommit};

/// Group commits by the UTC calendar date of their author timestamp and
/// count occurrences, ascending by date.
///
/// Idempotent: the same commit list always yields the same stats, and the
/// counts sum to the number of input commits.
pub fn process_commit_stats(commits: &[RepoCommit]) -> Vec<CommitStat> {
    let mut by_date: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();

    for commit in commits {
        *by_date.entry(commit.commit.author.date.date_naive()).or_insert(0) += 1;
    }

    by_date
        .into_iter()
        .map(|(date, count)| CommitStat { date, count })
        .collect()
}
