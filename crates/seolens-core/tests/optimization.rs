//! Optimization loop scenarios with in-test content improvers

mod common;

use async_trait::async_trait;
use common::{WEAK_PAGE, good_page};
use parking_lot::Mutex;
use seolens_core::error::SinkError;
use seolens_core::optimizer::CandidateRejection;
use seolens_core::{
    AutoFixEngine, ContentContext, ContentImprover, DisabledImprover, ImproverError,
    OptimizationEvent, OptimizationLoop, OptimizationOutcome, OptimizationRequest,
    OptimizerConfig, ProgressSink, SessionRegistry, Termination,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the scripted improver does when called
enum Script {
    /// Append a paragraph to the HTML it was given
    Append,
    Reply(&'static str),
    Fail,
    /// Cancel the session, then fail
    CancelThenFail,
    /// Cancel the session, then never answer
    CancelThenHang,
    Hang,
    Panic,
}

struct ScriptedImprover {
    script: Script,
    calls: AtomicUsize,
    registry: Arc<SessionRegistry>,
    session_id: String,
}

impl ScriptedImprover {
    fn new(script: Script, registry: &Arc<SessionRegistry>, session_id: &str) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            registry: Arc::clone(registry),
            session_id: session_id.to_string(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentImprover for ScriptedImprover {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn enhance_for_seo(
        &self,
        html: &str,
        _issues: &[String],
        _context: &ContentContext,
    ) -> Result<String, ImproverError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script {
            Script::Append => Ok(html.replace(
                "</body>",
                &format!("<p>Extra paragraph number {call}.</p></body>"),
            )),
            Script::Reply(reply) => Ok(reply.to_string()),
            Script::Fail => Err(ImproverError::Request("connection refused".to_string())),
            Script::CancelThenFail => {
                self.registry.cancel(&self.session_id);
                Err(ImproverError::Request("interrupted".to_string()))
            }
            Script::CancelThenHang => {
                self.registry.cancel(&self.session_id);
                std::future::pending::<()>().await;
                unreachable!()
            }
            Script::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Script::Panic => panic!("model backend crashed"),
        }
    }
}

/// Config that never converges and always asks the improver
fn demanding_config(cycles: i64) -> OptimizerConfig {
    let mut config = OptimizerConfig::default();
    config.set_min_score_threshold(100).unwrap();
    config.set_ai_suggestions_threshold(100).unwrap();
    config.set_optimization_cycles_limit(cycles).unwrap();
    config
}

fn build(
    config: OptimizerConfig,
    script: Script,
    session_id: &str,
) -> (OptimizationLoop, Arc<ScriptedImprover>) {
    let registry = Arc::new(SessionRegistry::new());
    let improver = ScriptedImprover::new(script, &registry, session_id);
    let optimizer = OptimizationLoop::new(
        config,
        AutoFixEngine::default(),
        improver.clone(),
        registry,
    );
    (optimizer, improver)
}

#[tokio::test]
async fn test_good_page_takes_fast_path_without_improver() {
    let (optimizer, improver) = build(OptimizerConfig::default(), Script::Append, "fast");
    let html = good_page();

    let report = optimizer
        .start_optimization(OptimizationRequest::new(html).with_session_id("fast"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.cycles_performed, 1);
    assert_eq!(report.termination, Termination::FastPath);
    assert_eq!(improver.calls(), 0);
    assert!(report.final_analysis.overall_score >= report.initial_analysis.overall_score);
    assert!(report.events.contains(&OptimizationEvent::FastPath {
        score: report.initial_analysis.overall_score
    }));
    assert!(optimizer.registry().get("fast").is_none());
}

#[tokio::test]
async fn test_cycle_limit_is_respected() {
    let (optimizer, improver) = build(demanding_config(2), Script::Append, "capped");

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("capped"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.cycles_performed, 2);
    assert_eq!(report.cycle_records.len(), 2);
    assert_eq!(report.termination, Termination::CycleLimitReached);
    assert_eq!(improver.calls(), 2);
    assert!(report.optimized_html.contains("Extra paragraph number 2."));
    for record in &report.cycle_records {
        assert_eq!(record.ai_improvements_applied, vec!["scripted rewrite"]);
    }

    let stats = optimizer.stats().snapshot();
    assert_eq!(stats.ai_calls, 2);
    assert_eq!(stats.ai_candidates_accepted, 2);
}

#[tokio::test]
async fn test_cancel_before_second_cycle() {
    let (optimizer, improver) = build(demanding_config(3), Script::CancelThenFail, "doomed");

    let outcome = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("doomed"))
        .await
        .unwrap();

    assert!(outcome.is_cancelled());
    assert_eq!(outcome.session_id(), "doomed");
    assert!(matches!(
        outcome,
        OptimizationOutcome::Cancelled {
            cycles_performed: 1,
            ..
        }
    ));
    assert_eq!(improver.calls(), 1);
    assert!(optimizer.registry().get("doomed").is_none());
    assert_eq!(optimizer.stats().snapshot().cancelled_sessions, 1);
}

#[tokio::test]
async fn test_stuck_improver_yields_to_cancellation() {
    let (optimizer, _improver) = build(demanding_config(3), Script::CancelThenHang, "stuck");

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        optimizer.start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("stuck")),
    )
    .await
    .expect("cancellation did not interrupt the improver")
    .unwrap();

    assert!(outcome.is_cancelled());
    assert!(outcome.report().is_none());
    assert!(optimizer.registry().is_empty());
}

#[tokio::test]
async fn test_failing_improver_still_completes() {
    let (optimizer, improver) = build(demanding_config(3), Script::Fail, "flaky");

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("flaky"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert!(improver.calls() >= 1);
    assert_eq!(
        report.cycle_records[0].error.as_deref(),
        Some("provider request failed: connection refused")
    );
    assert!(report.events.iter().any(|e| matches!(
        e,
        OptimizationEvent::ErrorOccurred { stage, .. } if stage == "content_improver"
    )));
    // the auto-fixes from the same cycle are kept
    assert!(report.optimized_html.contains("<h1>"));
    assert!(report.final_analysis.overall_score > report.initial_analysis.overall_score);
    assert!(optimizer.registry().is_empty());
}

#[tokio::test]
async fn test_invalid_candidate_is_rejected() {
    let (optimizer, _improver) = build(
        demanding_config(1),
        Script::Reply("Sure! I improved your page."),
        "chatty",
    );

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("chatty"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert!(!report.optimized_html.contains("Sure!"));
    assert!(report.cycle_records[0].ai_improvements_applied.is_empty());
    assert!(report.events.contains(&OptimizationEvent::AiCandidateRejected {
        cycle: 1,
        reason: CandidateRejection::NoMarkup,
    }));
    assert_eq!(optimizer.stats().snapshot().ai_candidates_accepted, 0);
}

#[tokio::test]
async fn test_oversized_candidate_is_rejected() {
    let huge: &'static str = Box::leak(format!("<div>{}</div>", "x".repeat(10_000)).into_boxed_str());
    let (optimizer, _improver) = build(demanding_config(1), Script::Reply(huge), "huge");

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("huge"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert!(report.events.iter().any(|e| matches!(
        e,
        OptimizationEvent::AiCandidateRejected {
            reason: CandidateRejection::TooLarge { .. },
            ..
        }
    )));
    assert!(!report.optimized_html.contains("xxxx"));
}

#[tokio::test]
async fn test_auto_fix_can_be_disabled() {
    let mut config = OptimizerConfig::default();
    config.set_critical_issues_auto_fix_enabled(false);
    let optimizer = OptimizationLoop::new(
        config,
        AutoFixEngine::default(),
        Arc::new(DisabledImprover),
        Arc::new(SessionRegistry::new()),
    );

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(report.optimized_html, WEAK_PAGE);
    assert_eq!(report.termination, Termination::Stalled);
    assert_eq!(report.cycles_performed, 1);
}

#[derive(Default)]
struct RecordingSink {
    percents: Mutex<Vec<u8>>,
    events: AtomicUsize,
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, _session_id: &str, _message: &str, percent: u8) -> Result<(), SinkError> {
        self.percents.lock().push(percent);
        Ok(())
    }

    fn on_event(&self, _session_id: &str, _event: &OptimizationEvent) -> Result<(), SinkError> {
        self.events.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct BrokenSink;

impl ProgressSink for BrokenSink {
    fn on_progress(&self, _: &str, _: &str, _: u8) -> Result<(), SinkError> {
        Err(SinkError::new("broken", "websocket closed"))
    }
}

#[tokio::test]
async fn test_sink_failures_do_not_abort_the_session() {
    let recorder = Arc::new(RecordingSink::default());
    let (optimizer, _improver) = build(OptimizerConfig::default(), Script::Fail, "observed");
    let optimizer = optimizer
        .with_sink(Arc::new(BrokenSink))
        .with_sink(recorder.clone());

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("observed"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    let percents = recorder.percents.lock().clone();
    assert_eq!(percents.first(), Some(&0));
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(recorder.events.load(Ordering::SeqCst), report.events.len());
}

#[tokio::test]
async fn test_concurrent_sessions_share_stats() {
    let registry = Arc::new(SessionRegistry::new());
    let optimizer = Arc::new(OptimizationLoop::new(
        OptimizerConfig::default(),
        AutoFixEngine::default(),
        Arc::new(DisabledImprover),
        Arc::clone(&registry),
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let optimizer = Arc::clone(&optimizer);
            tokio::spawn(async move {
                optimizer
                    .start_optimization(
                        OptimizationRequest::new(WEAK_PAGE).with_session_id(format!("s{i}")),
                    )
                    .await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(!outcome.is_cancelled());
    }

    let stats = optimizer.stats().snapshot();
    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.completed_sessions, 4);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_panicking_improver_ends_with_error() {
    let (optimizer, improver) = build(demanding_config(3), Script::Panic, "crashy");

    let report = optimizer
        .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("crashy"))
        .await
        .unwrap()
        .into_report()
        .unwrap();

    assert_eq!(improver.calls(), 1);
    assert_eq!(report.termination, Termination::Error);
    assert_eq!(report.cycles_performed, 1);
    assert!(report.events.iter().any(|e| matches!(
        e,
        OptimizationEvent::ErrorOccurred { stage, message, .. }
            if stage == "content_improver" && message.contains("model backend crashed")
    )));
    // fixes from the failed cycle are kept
    assert!(report.optimized_html.contains("<h1>"));
    assert!(optimizer.registry().active_ids().is_empty());
}

#[tokio::test]
async fn test_panicking_improver_inside_spawned_task() {
    let (optimizer, _improver) = build(demanding_config(2), Script::Panic, "spawned");
    let optimizer = Arc::new(optimizer);

    let task = {
        let optimizer = Arc::clone(&optimizer);
        tokio::spawn(async move {
            optimizer
                .start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("spawned"))
                .await
        })
    };

    let outcome = task.await.expect("panic escaped the session").unwrap();
    assert_eq!(outcome.report().unwrap().termination, Termination::Error);
    assert!(optimizer.registry().active_ids().is_empty());
}

#[tokio::test]
async fn test_dropped_session_future_frees_the_id() {
    let (optimizer, _improver) = build(demanding_config(3), Script::Hang, "abandoned");

    let timed_out = tokio::time::timeout(
        std::time::Duration::from_millis(200),
        optimizer.start_optimization(OptimizationRequest::new(WEAK_PAGE).with_session_id("abandoned")),
    )
    .await
    .is_err();

    assert!(timed_out);
    assert!(optimizer.registry().active_ids().is_empty());
    assert_eq!(optimizer.stats().snapshot().cancelled_sessions, 1);
    assert!(optimizer.registry().create("abandoned").is_ok());
}
