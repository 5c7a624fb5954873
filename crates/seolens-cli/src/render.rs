//! Plain-text and JSON views of analysis, fix and optimization results

use anyhow::Result;
use seolens_core::{
    AnalysisReport, FixOutcome, Impact, OptimizationOutcome, OptimizationReport,
    RecommendationType,
};
use serde::Serialize;
use std::fmt::Write;

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;
const BAR_WIDTH: usize = 20;

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn score_bar(score: u8) -> String {
    let filled = usize::from(score.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn kind_label(kind: RecommendationType) -> &'static str {
    match kind {
        RecommendationType::Critical => "critical",
        RecommendationType::Warning => "warning",
        RecommendationType::Suggestion => "suggestion",
    }
}

fn impact_label(impact: Impact) -> &'static str {
    match impact {
        Impact::High => "high",
        Impact::Medium => "medium",
        Impact::Low => "low",
    }
}

fn signed(delta: i32) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

pub fn render_analysis(report: &AnalysisReport) -> String {
    let mut buf = String::new();

    push_section_header(&mut buf, "📊", "SEO Score");
    push_key_value(&mut buf, "Overall", &format!("{}/100", report.overall_score));
    push_key_value(&mut buf, "Basic", &format!("{}/100", report.basic_score));
    push_key_value(
        &mut buf,
        "Critical issues",
        &report.critical_count().to_string(),
    );
    buf.push('\n');

    push_dimensions(&mut buf, report);

    if !report.priority_actions.is_empty() {
        push_section_header(&mut buf, "🎯", "Priority Actions");
        for (index, action) in report.priority_actions.iter().enumerate() {
            let _ = writeln!(buf, "{}. {}", index + 1, action);
        }
        buf.push('\n');
    }

    if !report.recommendations.is_empty() {
        push_section_header(&mut buf, "💡", "Recommendations");
        for rec in &report.recommendations {
            let _ = writeln!(
                buf,
                "[{}/{}] {}: {}",
                kind_label(rec.kind),
                impact_label(rec.impact),
                rec.category,
                rec.issue
            );
            let _ = writeln!(buf, "    → {}", rec.recommendation);
            if let Some(example) = &rec.example {
                let _ = writeln!(buf, "      e.g. {example}");
            }
        }
    }

    buf
}

fn push_dimensions(buf: &mut String, report: &AnalysisReport) {
    push_section_header(buf, "📐", "Dimensions");
    for (dimension, result) in &report.per_dimension {
        push_key_value(
            buf,
            dimension.as_str(),
            &format!("{} {:>3}", score_bar(result.score), result.score),
        );
    }
    buf.push('\n');
}

pub fn render_fix(outcome: &FixOutcome, before: &AnalysisReport, after: &AnalysisReport) -> String {
    let mut buf = String::new();

    push_section_header(&mut buf, "🔧", "Auto-fix");
    push_key_value(
        &mut buf,
        "Score",
        &format!(
            "{} → {} ({})",
            before.overall_score,
            after.overall_score,
            signed(i32::from(after.overall_score) - i32::from(before.overall_score))
        ),
    );
    if outcome.parse_failed {
        push_key_value(&mut buf, "Status", "document could not be parsed; left unchanged");
    }
    push_key_value(
        &mut buf,
        "Manual review",
        &outcome.manual_review.len().to_string(),
    );
    buf.push('\n');

    push_section_header(&mut buf, "✅", "Applied fixes");
    if outcome.applied.is_empty() {
        let _ = writeln!(buf, "(none)");
    }
    for fix in &outcome.applied {
        let _ = writeln!(buf, "• {fix}");
    }

    buf
}

pub fn render_optimization(outcome: &OptimizationOutcome) -> String {
    match outcome {
        OptimizationOutcome::Completed(report) => render_report(report),
        OptimizationOutcome::Cancelled {
            session_id,
            cycles_performed,
        } => {
            let mut buf = String::new();
            push_section_header(&mut buf, "⏹", "Optimization cancelled");
            push_key_value(&mut buf, "Session", session_id);
            push_key_value(&mut buf, "Cycles", &cycles_performed.to_string());
            buf
        }
    }
}

fn render_report(report: &OptimizationReport) -> String {
    let mut buf = String::new();

    push_section_header(&mut buf, "🚀", "Optimization");
    push_key_value(&mut buf, "Session", &report.session_id);
    push_key_value(&mut buf, "Termination", report.termination.as_str());
    push_key_value(&mut buf, "Cycles", &report.cycles_performed.to_string());
    push_key_value(
        &mut buf,
        "Score",
        &format!(
            "{} → {} ({})",
            report.initial_analysis.overall_score,
            report.final_analysis.overall_score,
            signed(report.score_improvement())
        ),
    );
    push_key_value(
        &mut buf,
        "Time",
        &format!("{} ms", report.processing_time_ms),
    );
    buf.push('\n');

    if !report.cycle_records.is_empty() {
        push_section_header(&mut buf, "🔁", "Cycles");
        for record in &report.cycle_records {
            let _ = writeln!(
                buf,
                "#{} {} → {}  fixes: {}  ai: {}  ({} ms)",
                record.cycle_index,
                record.score_before,
                record.score_after,
                record.auto_fixes_applied.len(),
                record.ai_improvements_applied.len(),
                record.processing_time_ms
            );
            if let Some(error) = &record.error {
                let _ = writeln!(buf, "   ⚠️  {error}");
            }
        }
        buf.push('\n');
    }

    push_dimensions(&mut buf, &report.final_analysis);
    buf
}

/// Pretty-printed JSON followed by a newline
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Machine-readable result of `seolens fix`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixSummary<'a> {
    pub score_before: u8,
    pub score_after: u8,
    pub applied: &'a [String],
    pub manual_review: usize,
    pub parse_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<&'a str>,
}

impl<'a> FixSummary<'a> {
    pub fn new(
        outcome: &'a FixOutcome,
        before: &AnalysisReport,
        after: &AnalysisReport,
        include_html: bool,
    ) -> Self {
        Self {
            score_before: before.overall_score,
            score_after: after.overall_score,
            applied: &outcome.applied,
            manual_review: outcome.manual_review.len(),
            parse_failed: outcome.parse_failed,
            html: include_html.then_some(outcome.html.as_str()),
        }
    }
}
