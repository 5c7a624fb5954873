//! Terminal progress bar fed by the optimization loop

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use seolens_core::error::SinkError;
use seolens_core::{OptimizationEvent, ProgressSink};

const TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}";

/// Draws session progress on stderr
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new() -> Result<Self> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)?
                .progress_chars("##-"),
        );
        Ok(Self { bar })
    }

    /// A sink that tracks progress without drawing anything
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ProgressBarSink {
    fn name(&self) -> &str {
        "progress-bar"
    }

    fn on_progress(&self, _session_id: &str, message: &str, percent: u8) -> Result<(), SinkError> {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(message.to_string());
        Ok(())
    }

    fn on_event(&self, _session_id: &str, event: &OptimizationEvent) -> Result<(), SinkError> {
        match event {
            OptimizationEvent::ErrorOccurred {
                cycle,
                stage,
                message,
            } => self
                .bar
                .println(format!("⚠️  cycle {cycle}: {stage} failed: {message}")),
            OptimizationEvent::AutoFixesApplied { cycle, fixes } if !fixes.is_empty() => self
                .bar
                .println(format!("🔧 cycle {cycle}: {}", fixes.join(", "))),
            _ => {}
        }
        Ok(())
    }
}
