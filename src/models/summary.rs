//! AI summary models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated project summary held in the in-process cache.
///
/// Lives only for the process lifetime; considered stale 24 hours after
/// generation and then treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// The generated summary text
    pub summary: String,
    /// When the summary was generated
    pub generated_at: DateTime<Utc>,
    /// Whether this record was served from cache
    pub cached: bool,
}

/// Summary cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}
