//! Optimization loop
//!
//! Drives a page through analyze → fix → (AI rewrite) → re-analyze cycles
//! until it converges, stalls or hits the cycle limit. Each session is
//! registered in a [`SessionRegistry`] so it can be cancelled by id between
//! cycles, or while it waits on the content improver.

mod progress;
mod session;
mod stats;
mod validate;

pub use progress::{OptimizationEvent, ProgressFanout, ProgressSink};
pub use session::{SessionRegistry, SessionState, SessionStatus};
use session::SessionLease;
pub use stats::{OptimizerStats, StatsSnapshot};
pub use validate::{CandidateRejection, MAX_GROWTH_FACTOR, validate_candidate};

use crate::autofix::{AutoFixEngine, FixOutcome, FixRequest};
use crate::config::{OptimizerConfig, SeolensConfig};
use crate::error::{ConfigError, ImproverError, OptimizerError};
use crate::improver::{ContentImprover, build_improver};
use crate::scoring::analyze;
use crate::types::{AnalysisOptions, AnalysisReport, ContentContext, Recommendation};
use futures::FutureExt;
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, error, info, instrument, warn};
use uuid::Uuid;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The page already met the threshold; one minor pass ran
    FastPath,
    Converged,
    /// A cycle changed neither the HTML nor the score
    Stalled,
    CycleLimitReached,
    /// The fix engine failed; the last good HTML was kept
    Error,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FastPath => "fast_path",
            Self::Converged => "converged",
            Self::Stalled => "stalled",
            Self::CycleLimitReached => "cycle_limit_reached",
            Self::Error => "error",
        }
    }
}

/// History entry for one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    pub cycle_index: u32,
    pub score_before: u8,
    pub score_after: u8,
    pub auto_fixes_applied: Vec<String>,
    pub ai_improvements_applied: Vec<String>,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub session_id: String,
    pub optimized_html: String,
    pub initial_analysis: AnalysisReport,
    pub final_analysis: AnalysisReport,
    pub cycle_records: Vec<CycleRecord>,
    pub cycles_performed: u32,
    pub termination: Termination,
    pub events: Vec<OptimizationEvent>,
    pub processing_time_ms: u64,
}

impl OptimizationReport {
    pub fn score_improvement(&self) -> i32 {
        i32::from(self.final_analysis.overall_score) - i32::from(self.initial_analysis.overall_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptimizationOutcome {
    Completed(OptimizationReport),
    Cancelled {
        session_id: String,
        cycles_performed: u32,
    },
}

impl OptimizationOutcome {
    pub fn session_id(&self) -> &str {
        match self {
            Self::Completed(report) => &report.session_id,
            Self::Cancelled { session_id, .. } => session_id,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn report(&self) -> Option<&OptimizationReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<OptimizationReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Input of [`OptimizationLoop::start_optimization`]
#[derive(Debug, Clone, Default)]
pub struct OptimizationRequest {
    pub html: String,
    /// Generated (UUID v4) when absent
    pub session_id: Option<String>,
    pub context: Option<ContentContext>,
    pub options: AnalysisOptions,
}

impl OptimizationRequest {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_context(mut self, context: ContentContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

enum Improvement {
    Candidate(String),
    Failed(ImproverError),
    Panicked(String),
    Cancelled,
}

/// Per-session bookkeeping: event history plus sink delivery
struct SessionRun<'a> {
    session_id: String,
    sinks: &'a ProgressFanout,
    events: Vec<OptimizationEvent>,
}

impl SessionRun<'_> {
    fn emit(&mut self, event: OptimizationEvent) {
        self.sinks.event(&self.session_id, &event);
        self.events.push(event);
    }

    fn progress(&self, message: &str, percent: u8) {
        self.sinks.progress(&self.session_id, message, percent);
    }
}

pub struct OptimizationLoop {
    config: OptimizerConfig,
    engine: AutoFixEngine,
    improver: Arc<dyn ContentImprover>,
    registry: Arc<SessionRegistry>,
    stats: Arc<OptimizerStats>,
    sinks: ProgressFanout,
}

impl std::fmt::Debug for OptimizationLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizationLoop")
            .field("config", &self.config)
            .field("improver", &self.improver.name())
            .field("sessions", &self.registry.len())
            .field("sinks", &self.sinks)
            .finish()
    }
}

impl OptimizationLoop {
    pub fn new(
        config: OptimizerConfig,
        engine: AutoFixEngine,
        improver: Arc<dyn ContentImprover>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            config,
            engine,
            improver,
            registry,
            stats: Arc::new(OptimizerStats::new()),
            sinks: ProgressFanout::new(),
        }
    }

    /// Build every collaborator from a loaded configuration
    pub fn from_config(config: &SeolensConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = AutoFixEngine::new(config.autofix.clone())?;
        let improver = build_improver(&config.improver)?;
        Ok(Self::new(
            config.optimizer.clone(),
            engine,
            improver,
            Arc::new(SessionRegistry::new()),
        ))
    }

    /// Share statistics with other loops
    pub fn with_stats(mut self, stats: Arc<OptimizerStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sinks.add(sink);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<OptimizerStats> {
        &self.stats
    }

    pub fn cancel(&self, session_id: &str) -> bool {
        self.registry.cancel(session_id)
    }

    /// Run one optimization session to completion or cancellation.
    ///
    /// Only a duplicate session id is returned as an error. Fix engine and
    /// improver failures (panics included) are recorded in the report
    /// instead. The session leaves the registry however the run ends, even
    /// when the returned future is dropped before completion.
    #[instrument(skip_all, fields(session_id = tracing::field::Empty))]
    pub async fn start_optimization(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        let started = Instant::now();
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Span::current().record("session_id", session_id.as_str());

        let lease = self.registry.lease(&session_id, &self.stats)?;
        let token = lease.token().clone();
        self.stats.record_session_started();

        let mut run = SessionRun {
            session_id,
            sinks: &self.sinks,
            events: Vec::new(),
        };

        run.progress("Analyzing initial HTML", 0);
        let initial = analyze(&request.html, &request.options);
        info!(
            initial_score = initial.overall_score,
            threshold = self.config.min_score_threshold(),
            "optimization started"
        );
        run.emit(OptimizationEvent::SessionStarted {
            initial_score: initial.overall_score,
        });
        self.registry.update(&run.session_id, |status| {
            status.current_score = Some(initial.overall_score);
        });

        let (html, records, termination) =
            if initial.overall_score >= self.config.min_score_threshold() {
                self.minor_pass(&mut run, &request, &initial)
            } else {
                match self.run_cycles(&mut run, &request, &initial, &token).await {
                    Some(result) => result,
                    None => return Ok(self.cancelled(run, lease)),
                }
            };

        run.progress("Running final analysis", 95);
        let final_analysis = analyze(&html, &request.options);
        let cycles_performed = records.len() as u32;
        let processing_time_ms = started.elapsed().as_millis() as u64;

        self.registry.update(&run.session_id, |status| {
            status.state = match termination {
                Termination::Error => SessionState::Error,
                _ => SessionState::Completed,
            };
            status.cycles_performed = cycles_performed;
            status.current_score = Some(final_analysis.overall_score);
        });
        lease.release();

        run.emit(OptimizationEvent::Completed {
            final_score: final_analysis.overall_score,
            termination,
        });
        run.progress("Optimization complete", 100);

        let report = OptimizationReport {
            session_id: run.session_id,
            optimized_html: html,
            initial_analysis: initial,
            final_analysis,
            cycle_records: records,
            cycles_performed,
            termination,
            events: run.events,
            processing_time_ms,
        };
        self.stats
            .record_completed(processing_time_ms, report.score_improvement());
        info!(
            final_score = report.final_analysis.overall_score,
            cycles = cycles_performed,
            termination = termination.as_str(),
            elapsed_ms = processing_time_ms,
            "optimization completed"
        );
        Ok(OptimizationOutcome::Completed(report))
    }

    /// Fast path: one auto-fix pass with no AI. The original HTML is kept
    /// when the pass would lower the score.
    fn minor_pass(
        &self,
        run: &mut SessionRun<'_>,
        request: &OptimizationRequest,
        initial: &AnalysisReport,
    ) -> (String, Vec<CycleRecord>, Termination) {
        let cycle_started = Instant::now();
        info!(score = initial.overall_score, "score meets threshold, minor improvements only");
        run.emit(OptimizationEvent::FastPath {
            score: initial.overall_score,
        });
        run.progress("Applying minor improvements", 50);

        let mut record = CycleRecord {
            cycle_index: 1,
            score_before: initial.overall_score,
            score_after: initial.overall_score,
            auto_fixes_applied: Vec::new(),
            ai_improvements_applied: Vec::new(),
            processing_time_ms: 0,
            error: None,
        };

        let (html, termination) = match self.apply_fixes(&request.html, request, initial) {
            Ok(outcome) if outcome.changed() => {
                let fixed = analyze(&outcome.html, &request.options);
                if fixed.overall_score >= initial.overall_score {
                    record.score_after = fixed.overall_score;
                    record.auto_fixes_applied = outcome.applied.clone();
                    run.emit(OptimizationEvent::AutoFixesApplied {
                        cycle: 1,
                        fixes: outcome.applied,
                    });
                    (outcome.html, Termination::FastPath)
                } else {
                    debug!(
                        before = initial.overall_score,
                        after = fixed.overall_score,
                        "minor pass lowered the score, keeping original"
                    );
                    (request.html.clone(), Termination::FastPath)
                }
            }
            Ok(_) => (request.html.clone(), Termination::FastPath),
            Err(message) => {
                run.emit(OptimizationEvent::ErrorOccurred {
                    cycle: 1,
                    stage: "auto_fix".to_string(),
                    message: message.clone(),
                });
                record.error = Some(message);
                (request.html.clone(), Termination::Error)
            }
        };

        record.processing_time_ms = cycle_started.elapsed().as_millis() as u64;
        (html, vec![record], termination)
    }

    /// Bounded loop. `None` means the session was cancelled.
    async fn run_cycles(
        &self,
        run: &mut SessionRun<'_>,
        request: &OptimizationRequest,
        initial: &AnalysisReport,
        token: &CancellationToken,
    ) -> Option<(String, Vec<CycleRecord>, Termination)> {
        let limit = self.config.optimization_cycles_limit();
        let threshold = self.config.min_score_threshold();
        let empty_context = ContentContext::default();
        let context = request.context.as_ref().unwrap_or(&empty_context);

        let mut html = request.html.clone();
        let mut current = initial.clone();
        let mut records: Vec<CycleRecord> = Vec::new();
        let mut termination = Termination::CycleLimitReached;

        for cycle in 1..=limit {
            if token.is_cancelled() {
                return None;
            }
            if !current.has_critical_issues() && current.overall_score >= threshold {
                termination = Termination::Converged;
                break;
            }

            let cycle_started = Instant::now();
            let score_before = current.overall_score;
            debug!(cycle, score = score_before, "cycle started");
            run.emit(OptimizationEvent::CycleStarted {
                cycle,
                score: score_before,
            });
            run.progress(&format!("Cycle {cycle}/{limit}: applying fixes"), cycle_percent(cycle, limit));

            let mut record = CycleRecord {
                cycle_index: cycle,
                score_before,
                score_after: score_before,
                auto_fixes_applied: Vec::new(),
                ai_improvements_applied: Vec::new(),
                processing_time_ms: 0,
                error: None,
            };

            let fixes = match self.apply_fixes(&html, request, &current) {
                Ok(outcome) => outcome,
                Err(message) => {
                    run.emit(OptimizationEvent::ErrorOccurred {
                        cycle,
                        stage: "auto_fix".to_string(),
                        message: message.clone(),
                    });
                    record.error = Some(message);
                    record.processing_time_ms = cycle_started.elapsed().as_millis() as u64;
                    records.push(record);
                    termination = Termination::Error;
                    break;
                }
            };

            let mut analysis = current.clone();
            if fixes.changed() {
                html = fixes.html;
                analysis = analyze(&html, &request.options);
                record.auto_fixes_applied = fixes.applied.clone();
                run.emit(OptimizationEvent::AutoFixesApplied {
                    cycle,
                    fixes: fixes.applied,
                });
            }

            if analysis.overall_score < self.config.ai_suggestions_threshold()
                && self.improver.is_enabled()
            {
                run.progress(
                    &format!("Cycle {cycle}/{limit}: requesting content improvements"),
                    cycle_percent(cycle, limit),
                );
                self.stats.record_ai_call();
                match self
                    .request_improvement(&html, &analysis.issues, context, token)
                    .await
                {
                    Improvement::Cancelled => return None,
                    Improvement::Panicked(message) => {
                        error!(cycle, error = %message, "content improver panicked");
                        run.emit(OptimizationEvent::ErrorOccurred {
                            cycle,
                            stage: "content_improver".to_string(),
                            message: message.clone(),
                        });
                        record.error = Some(message);
                        record.score_after = analysis.overall_score;
                        record.processing_time_ms = cycle_started.elapsed().as_millis() as u64;
                        records.push(record);
                        current = analysis;
                        termination = Termination::Error;
                        break;
                    }
                    Improvement::Failed(err) => {
                        warn!(cycle, error = %err, "content improver failed");
                        run.emit(OptimizationEvent::ErrorOccurred {
                            cycle,
                            stage: "content_improver".to_string(),
                            message: err.to_string(),
                        });
                        record.error = Some(err.to_string());
                    }
                    Improvement::Candidate(candidate) => {
                        match validate_candidate(&candidate, html.len()) {
                            Ok(accepted) => {
                                html = accepted;
                                analysis = analyze(&html, &request.options);
                                self.stats.record_ai_accepted();
                                record
                                    .ai_improvements_applied
                                    .push(format!("{} rewrite", self.improver.name()));
                                info!(cycle, score = analysis.overall_score, "AI candidate accepted");
                                run.emit(OptimizationEvent::AiCandidateAccepted {
                                    cycle,
                                    improver: self.improver.name().to_string(),
                                });
                            }
                            Err(reason) => {
                                info!(cycle, %reason, "AI candidate rejected");
                                run.emit(OptimizationEvent::AiCandidateRejected { cycle, reason });
                            }
                        }
                    }
                }
            }

            record.score_after = analysis.overall_score;
            record.processing_time_ms = cycle_started.elapsed().as_millis() as u64;
            run.emit(OptimizationEvent::CycleFinished {
                cycle,
                score_before,
                score_after: record.score_after,
            });
            debug!(cycle, before = score_before, after = record.score_after, "cycle finished");

            let stalled = record.auto_fixes_applied.is_empty()
                && record.ai_improvements_applied.is_empty()
                && record.score_after == score_before;
            records.push(record);
            current = analysis;
            self.registry.update(&run.session_id, |status| {
                status.cycles_performed = cycle;
                status.current_score = Some(current.overall_score);
            });

            if stalled {
                termination = Termination::Stalled;
                break;
            }
        }

        if termination == Termination::CycleLimitReached
            && !current.has_critical_issues()
            && current.overall_score >= threshold
        {
            termination = Termination::Converged;
        }

        Some((html, records, termination))
    }

    /// Fix engine call with panics turned into an error message
    fn apply_fixes(
        &self,
        html: &str,
        request: &OptimizationRequest,
        analysis: &AnalysisReport,
    ) -> Result<FixOutcome, String> {
        let recommendations: &[Recommendation] = if self.config.critical_issues_auto_fix_enabled() {
            &analysis.recommendations
        } else {
            &[]
        };
        let fix_request = FixRequest::new(recommendations)
            .with_context(request.context.as_ref())
            .with_keywords(&request.options.keywords);

        catch_unwind(AssertUnwindSafe(|| self.engine.apply(html, &fix_request))).map_err(|panic| {
            let message = progress::panic_message(panic.as_ref());
            error!(error = %message, "auto-fix engine failed");
            format!("auto-fix engine {message}")
        })
    }

    async fn request_improvement(
        &self,
        html: &str,
        issues: &[String],
        context: &ContentContext,
        token: &CancellationToken,
    ) -> Improvement {
        let timeout_secs = self.config.ai_timeout_secs();
        let call = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            AssertUnwindSafe(self.improver.enhance_for_seo(html, issues, context)).catch_unwind(),
        );

        tokio::select! {
            biased;
            _ = token.cancelled() => Improvement::Cancelled,
            result = call => match result {
                Ok(Ok(Ok(candidate))) => Improvement::Candidate(candidate),
                Ok(Ok(Err(err))) => Improvement::Failed(err),
                Ok(Err(panic)) => Improvement::Panicked(format!(
                    "content improver {}",
                    progress::panic_message(panic.as_ref())
                )),
                Err(_) => Improvement::Failed(ImproverError::Timeout(timeout_secs)),
            },
        }
    }

    fn cancelled(&self, mut run: SessionRun<'_>, lease: SessionLease<'_>) -> OptimizationOutcome {
        // cancel() already removed the entry; this covers a token cancelled elsewhere
        lease.token().cancel();
        lease.release();

        let cycles_performed = run
            .events
            .iter()
            .filter(|e| matches!(e, OptimizationEvent::CycleFinished { .. }))
            .count() as u32;
        run.emit(OptimizationEvent::Cancelled { cycles_performed });
        self.stats.record_cancelled();
        info!(cycles = cycles_performed, "optimization cancelled");

        OptimizationOutcome::Cancelled {
            session_id: run.session_id,
            cycles_performed,
        }
    }
}

fn cycle_percent(cycle: u32, limit: u32) -> u8 {
    let span = 90 / limit.max(1);
    (5 + (cycle - 1) * span).min(90) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::improver::DisabledImprover;

    fn optimizer(config: OptimizerConfig) -> OptimizationLoop {
        OptimizationLoop::new(
            config,
            AutoFixEngine::default(),
            Arc::new(DisabledImprover),
            Arc::new(SessionRegistry::new()),
        )
    }

    const WEAK: &str = "<html><head><title>Test</title></head><body><h2>x</h2></body></html>";

    #[test]
    fn test_cycle_percent_stays_in_range() {
        assert_eq!(cycle_percent(1, 3), 5);
        assert_eq!(cycle_percent(3, 3), 65);
        assert_eq!(cycle_percent(20, 20), 90);
    }

    #[tokio::test]
    async fn test_generated_session_id_and_cleanup() {
        let optimizer = optimizer(OptimizerConfig::default());
        let outcome = optimizer
            .start_optimization(OptimizationRequest::new(WEAK))
            .await
            .unwrap();

        assert!(Uuid::parse_str(outcome.session_id()).is_ok());
        assert!(optimizer.registry().is_empty());
        assert_eq!(optimizer.stats().snapshot().completed_sessions, 1);
    }

    #[tokio::test]
    async fn test_weak_page_gets_fixed() {
        let optimizer = optimizer(OptimizerConfig::default());
        let report = optimizer
            .start_optimization(OptimizationRequest::new(WEAK).with_session_id("weak"))
            .await
            .unwrap()
            .into_report()
            .unwrap();

        assert!(report.cycles_performed >= 1);
        assert!(report.cycles_performed <= 3);
        assert!(report.optimized_html.contains("<h1>"));
        assert!(report.optimized_html.contains("<title>Test</title>"));
        assert!(report.final_analysis.overall_score > report.initial_analysis.overall_score);
        assert!(!report.cycle_records[0].auto_fixes_applied.is_empty());
        assert!(matches!(
            report.events.first(),
            Some(OptimizationEvent::SessionStarted { .. })
        ));
        assert!(matches!(
            report.events.last(),
            Some(OptimizationEvent::Completed { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_session_is_an_error() {
        let optimizer = optimizer(OptimizerConfig::default());
        optimizer.registry().create("taken").unwrap();
        let result = optimizer
            .start_optimization(OptimizationRequest::new(WEAK).with_session_id("taken"))
            .await;
        assert!(matches!(result, Err(OptimizerError::Session(_))));
        // the existing session is left alone
        assert!(optimizer.registry().get("taken").is_some());
    }

    #[tokio::test]
    async fn test_second_cycle_without_changes_stalls() {
        let mut config = OptimizerConfig::default();
        config.set_min_score_threshold(100).unwrap();
        config.set_optimization_cycles_limit(5).unwrap();
        let optimizer = optimizer(config);

        let report = optimizer
            .start_optimization(OptimizationRequest::new(WEAK))
            .await
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.termination, Termination::Stalled);
        let last = report.cycle_records.last().unwrap();
        assert!(last.auto_fixes_applied.is_empty());
        assert!(report.cycles_performed < 5);
    }

    fn panicking_optimizer(config: OptimizerConfig) -> OptimizationLoop {
        OptimizationLoop::new(
            config,
            AutoFixEngine::panicking(),
            Arc::new(DisabledImprover),
            Arc::new(SessionRegistry::new()),
        )
    }

    #[tokio::test]
    async fn test_fix_engine_panic_ends_with_error() {
        let optimizer = panicking_optimizer(OptimizerConfig::default());
        let report = optimizer
            .start_optimization(OptimizationRequest::new(WEAK).with_session_id("boom"))
            .await
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.termination, Termination::Error);
        assert_eq!(report.optimized_html, WEAK);
        assert_eq!(report.cycles_performed, 1);
        assert!(
            report.cycle_records[0]
                .error
                .as_deref()
                .unwrap()
                .contains("fix pass blew up")
        );
        assert!(report.events.iter().any(|e| matches!(
            e,
            OptimizationEvent::ErrorOccurred { stage, .. } if stage == "auto_fix"
        )));
        assert!(optimizer.registry().active_ids().is_empty());
        assert_eq!(optimizer.stats().snapshot().completed_sessions, 1);
    }

    #[tokio::test]
    async fn test_fix_engine_panic_on_fast_path() {
        let mut config = OptimizerConfig::default();
        config.set_min_score_threshold(0).unwrap();
        let optimizer = panicking_optimizer(config);

        let report = optimizer
            .start_optimization(OptimizationRequest::new(WEAK))
            .await
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.termination, Termination::Error);
        assert_eq!(report.optimized_html, WEAK);
        assert!(optimizer.registry().active_ids().is_empty());
    }
}
