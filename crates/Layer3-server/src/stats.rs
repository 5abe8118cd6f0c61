//! Call statistics
//!
//! Counters reflect attempted calls: total and per-tool counts increment
//! before lookup and validation, so unknown-tool and invalid-argument calls
//! are visible in the numbers. State is in-memory only and resets with the
//! process.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared mutable call counters
///
/// Atomics cover the scalar counters; the per-tool map sits behind a mutex
/// because concurrent tool calls update it in place.
pub struct CallStats {
    total: AtomicU64,
    success: AtomicU64,
    failure: AtomicU64,
    per_tool: Mutex<HashMap<String, u64>>,
    started: Instant,
}

impl CallStats {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            per_tool: Mutex::new(HashMap::new()),
            started: Instant::now(),
        }
    }

    /// Record an attempted call before dispatch
    pub fn record_attempt(&self, tool_name: &str) {
        self.total.fetch_add(1, Ordering::Relaxed);
        *self
            .per_tool
            .lock()
            .entry(tool_name.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn successful(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    /// Point-in-time view for status display and export
    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.total();
        let successful = self.successful();

        let success_rate = if total > 0 {
            ((successful as f64 / total as f64) * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        let mut top_tools: Vec<ToolCallCount> = self
            .per_tool
            .lock()
            .iter()
            .map(|(name, count)| ToolCallCount {
                name: name.clone(),
                count: *count,
            })
            .collect();
        top_tools.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_tools.truncate(5);

        StatsSnapshot {
            uptime_ms: self.started.elapsed().as_millis() as u64,
            total_requests: total,
            successful_requests: successful,
            failed_requests: self.failed(),
            success_rate,
            top_tools,
        }
    }
}

impl Default for CallStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable statistics view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub uptime_ms: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Percentage with two decimals
    pub success_rate: f64,
    pub top_tools: Vec<ToolCallCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolCallCount {
    pub name: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_count_before_outcome() {
        let stats = CallStats::new();

        stats.record_attempt("deck/ask");
        stats.record_attempt("deck/ask");
        stats.record_attempt("missing-tool");
        stats.record_success();
        stats.record_failure();

        assert_eq!(stats.total(), 3);
        assert_eq!(stats.successful(), 1);
        assert_eq!(stats.failed(), 1);
    }

    #[test]
    fn test_snapshot_success_rate() {
        let stats = CallStats::new();
        for _ in 0..3 {
            stats.record_attempt("t");
        }
        stats.record_success();
        stats.record_success();
        stats.record_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert!((snapshot.success_rate - 66.67).abs() < 0.01);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CallStats::new().snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert!(snapshot.top_tools.is_empty());
    }

    #[test]
    fn test_top_tools_ordered_and_capped() {
        let stats = CallStats::new();
        for i in 0..7 {
            let name = format!("tool-{i}");
            for _ in 0..=i {
                stats.record_attempt(&name);
            }
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.top_tools.len(), 5);
        assert_eq!(snapshot.top_tools[0].name, "tool-6");
        assert_eq!(snapshot.top_tools[0].count, 7);
    }
}
