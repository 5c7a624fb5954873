//! Progress notifications for UI consumers
//!
//! Sinks are best-effort. [`ProgressFanout`] calls each one in isolation:
//! an error or a panic in one sink is logged and the remaining sinks (and
//! the optimization itself) carry on.

use super::Termination;
use super::validate::CandidateRejection;
use crate::error::SinkError;
use serde::Serialize;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::warn;

/// Notable things that happen during a session, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OptimizationEvent {
    SessionStarted {
        initial_score: u8,
    },
    FastPath {
        score: u8,
    },
    CycleStarted {
        cycle: u32,
        score: u8,
    },
    AutoFixesApplied {
        cycle: u32,
        fixes: Vec<String>,
    },
    AiCandidateAccepted {
        cycle: u32,
        improver: String,
    },
    AiCandidateRejected {
        cycle: u32,
        reason: CandidateRejection,
    },
    ErrorOccurred {
        cycle: u32,
        stage: String,
        message: String,
    },
    CycleFinished {
        cycle: u32,
        score_before: u8,
        score_after: u8,
    },
    Cancelled {
        cycles_performed: u32,
    },
    Completed {
        final_score: u8,
        termination: Termination,
    },
}

pub trait ProgressSink: Send + Sync {
    /// Used in logs when the sink fails
    fn name(&self) -> &str {
        "progress-sink"
    }

    fn on_progress(&self, session_id: &str, message: &str, percent: u8) -> Result<(), SinkError>;

    fn on_event(&self, _session_id: &str, _event: &OptimizationEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct ProgressFanout {
    sinks: Vec<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for ProgressFanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressFanout")
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ProgressFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Arc<dyn ProgressSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Returns the failures, already logged
    pub fn progress(&self, session_id: &str, message: &str, percent: u8) -> Vec<SinkError> {
        let percent = percent.min(100);
        self.deliver(|sink| sink.on_progress(session_id, message, percent))
    }

    pub fn event(&self, session_id: &str, event: &OptimizationEvent) -> Vec<SinkError> {
        self.deliver(|sink| sink.on_event(session_id, event))
    }

    fn deliver<F>(&self, call: F) -> Vec<SinkError>
    where
        F: Fn(&dyn ProgressSink) -> Result<(), SinkError>,
    {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            let result = match catch_unwind(AssertUnwindSafe(|| call(sink.as_ref()))) {
                Ok(result) => result,
                Err(panic) => Err(SinkError::new(sink.name(), panic_message(panic.as_ref()))),
            };
            if let Err(err) = result {
                warn!(sink = sink.name(), error = %err, "progress sink failed");
                failures.push(err);
            }
        }
        failures
    }
}

pub(super) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
