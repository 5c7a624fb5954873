//! Process-wide optimization statistics
//!
//! Counters are plain atomics; the running averages share one lock so a
//! completion updates both means together.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct OptimizerStats {
    total_sessions: AtomicU64,
    completed_sessions: AtomicU64,
    cancelled_sessions: AtomicU64,
    ai_calls: AtomicU64,
    ai_candidates_accepted: AtomicU64,
    averages: Mutex<RunningAverages>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningAverages {
    samples: u64,
    processing_time_ms: f64,
    score_improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub cancelled_sessions: u64,
    pub ai_calls: u64,
    pub ai_candidates_accepted: u64,
    pub average_processing_time_ms: f64,
    pub average_score_improvement: f64,
}

impl OptimizerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_started(&self) {
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ai_call(&self) {
        self.ai_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ai_accepted(&self) {
        self.ai_candidates_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.cancelled_sessions.fetch_add(1, Ordering::Relaxed);
    }

    /// `score_improvement` is final minus initial overall score
    pub fn record_completed(&self, processing_time_ms: u64, score_improvement: i32) {
        self.completed_sessions.fetch_add(1, Ordering::Relaxed);

        let mut averages = self.averages.lock();
        averages.samples += 1;
        let n = averages.samples as f64;
        averages.processing_time_ms += (processing_time_ms as f64 - averages.processing_time_ms) / n;
        averages.score_improvement += (f64::from(score_improvement) - averages.score_improvement) / n;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let averages = *self.averages.lock();
        StatsSnapshot {
            total_sessions: self.total_sessions.load(Ordering::Relaxed),
            completed_sessions: self.completed_sessions.load(Ordering::Relaxed),
            cancelled_sessions: self.cancelled_sessions.load(Ordering::Relaxed),
            ai_calls: self.ai_calls.load(Ordering::Relaxed),
            ai_candidates_accepted: self.ai_candidates_accepted.load(Ordering::Relaxed),
            average_processing_time_ms: averages.processing_time_ms,
            average_score_improvement: averages.score_improvement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_running_averages() {
        let stats = OptimizerStats::new();
        stats.record_completed(100, 10);
        stats.record_completed(300, -4);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.completed_sessions, 2);
        assert!((snapshot.average_processing_time_ms - 200.0).abs() < 1e-9);
        assert!((snapshot.average_score_improvement - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_increments() {
        let stats = Arc::new(OptimizerStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_session_started();
                        stats.record_ai_call();
                        stats.record_completed(10, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_sessions, 800);
        assert_eq!(snapshot.ai_calls, 800);
        assert_eq!(snapshot.completed_sessions, 800);
        assert!((snapshot.average_processing_time_ms - 10.0).abs() < 1e-9);
    }
}
