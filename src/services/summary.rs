//! AI summary service
//!
//! Generates short project summaries through the completion client and
//! caches them in-process for 24 hours. Concurrent requests for the same
//! project coalesce onto one provider call; requests for different
//! projects never block each other.
//!
//! The cache is intentionally not persisted: summaries are cheap to
//! regenerate and go stale with the repository anyway.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::ai::{build_summary_messages, CompletionClient, CompletionError, ProjectSummaryInput};
use crate::models::{SummaryRecord, SummaryStats};

/// How long a generated summary stays valid
const CACHE_DURATION_HOURS: i64 = 24;

/// Error types for summary operations
#[derive(Debug, thiserror::Error)]
pub enum SummaryServiceError {
    /// The completion provider failed
    #[error("Summary generation failed: {0}")]
    Generation(#[from] CompletionError),
}

/// AI summary service with a 24-hour in-process cache
pub struct SummaryService {
    client: Arc<CompletionClient>,
    entries: RwLock<HashMap<String, SummaryRecord>>,
    /// Per-project generation locks; entries exist only while a
    /// generation for that project is running.
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SummaryService {
    /// Create a new summary service
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self {
            client,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Get the cached summary for a project, if still valid.
    ///
    /// A stale entry is evicted on access and reported as absent.
    pub async fn get_cached(&self, project: &str) -> Option<SummaryRecord> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            if let Some(record) = entries.get(project) {
                if !is_stale(record.generated_at, now) {
                    let mut cached = record.clone();
                    cached.cached = true;
                    return Some(cached);
                }
            } else {
                return None;
            }
        }

        // Entry exists but is stale; evict under the write lock
        let mut entries = self.entries.write().await;
        if let Some(record) = entries.get(project) {
            if is_stale(record.generated_at, now) {
                entries.remove(project);
            }
        }
        None
    }

    /// Generate a summary for a project, serving from cache when valid.
    ///
    /// Concurrent callers for the same project wait on the first caller's
    /// generation and then read its cached result.
    pub async fn generate(
        &self,
        project: &str,
        input: &ProjectSummaryInput,
    ) -> Result<SummaryRecord, SummaryServiceError> {
        if let Some(cached) = self.get_cached(project).await {
            return Ok(cached);
        }

        let lock = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(project.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let _guard = lock.lock().await;

        // Another caller may have finished generating while we waited
        if let Some(cached) = self.get_cached(project).await {
            self.release_in_flight(project).await;
            return Ok(cached);
        }

        let result = self.generate_fresh(project, input).await;
        self.release_in_flight(project).await;
        result
    }

    async fn generate_fresh(
        &self,
        project: &str,
        input: &ProjectSummaryInput,
    ) -> Result<SummaryRecord, SummaryServiceError> {
        let messages = build_summary_messages(input);
        let summary = self.client.generate(&messages).await?;

        let record = SummaryRecord {
            summary,
            generated_at: Utc::now(),
            cached: false,
        };

        let mut entries = self.entries.write().await;
        entries.insert(project.to_string(), record.clone());

        tracing::info!("Generated summary for {}", project);
        Ok(record)
    }

    async fn release_in_flight(&self, project: &str) {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.remove(project);
    }

    /// Drop the cached summary for one project; returns whether one existed
    pub async fn clear(&self, project: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(project).is_some()
    }

    /// Drop all cached summaries; returns how many were held
    pub async fn clear_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    /// Report cache occupancy split by validity
    pub async fn stats(&self) -> SummaryStats {
        let now = Utc::now();
        let entries = self.entries.read().await;

        let total_entries = entries.len();
        let expired_entries = entries
            .values()
            .filter(|record| is_stale(record.generated_at, now))
            .count();

        SummaryStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
        }
    }

    /// Seed a record directly, used by tests to control timestamps
    #[cfg(test)]
    async fn insert_record(&self, project: &str, record: SummaryRecord) {
        let mut entries = self.entries.write().await;
        entries.insert(project.to_string(), record);
    }
}

fn is_stale(generated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - generated_at >= ChronoDuration::hours(CACHE_DURATION_HOURS)
}
