//! One check cycle.
//!
//! Probes every target in order, classifies each result, collects the down
//! targets, renders the alert from the template and dispatches it only when
//! something is down. A failing target never aborts the cycle.

use std::sync::Arc;

use chrono::Local;

use crate::alerts::AlertDispatcher;
use crate::metrics::AppMetrics;
use crate::monitor::classifier::classify;
use crate::monitor::probe::Prober;
use crate::monitor::template::EmailTemplate;
use crate::monitor::types::{CheckOutcome, CycleReport, ProbeResult, Target};

/// Body summary used when nothing is down.
pub const ALL_UP_SUMMARY: &str = "All websites are up and running.";

/// Format of the `{date}` placeholder.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CycleRunner {
    prober: Arc<dyn Prober + Send + Sync>,
    dispatcher: AlertDispatcher,
    targets: Arc<Vec<Target>>,
    template: Arc<EmailTemplate>,
    metrics: Option<Arc<AppMetrics>>,
}

impl CycleRunner {
    pub fn new(
        prober: Arc<dyn Prober + Send + Sync>,
        dispatcher: AlertDispatcher,
        targets: Arc<Vec<Target>>,
        template: Arc<EmailTemplate>,
    ) -> Self {
        Self {
            prober,
            dispatcher,
            targets,
            template,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Run one full cycle and report what happened.
    pub async fn run_cycle(&self) -> CycleReport {
        tracing::info!("Running scheduled check...");

        let mut down_entries = Vec::new();
        for target in self.targets.iter() {
            tracing::info!("Checking URL: {}", target.url);

            let result = self.prober.probe(&target.url).await;
            let outcome = classify(&result);
            self.record_check(&result, &outcome);

            if outcome.alive {
                tracing::info!("Website check: {}", outcome.message);
            } else {
                tracing::warn!("Website check: {}", outcome.message);
                down_entries.push(format!("{}: {}", target.url, outcome.message));
            }
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let (subject, body) = self.render_alert(&timestamp, &down_entries);

        let dispatched = if down_entries.is_empty() {
            tracing::info!("All websites are up. No alert email sent.");
            false
        } else {
            let sent = self.dispatcher.send(&subject, &body).await;
            if sent {
                tracing::info!("Alert email sent for down websites.");
            }
            sent
        };

        if let Some(metrics) = &self.metrics {
            metrics.cycles_total.inc();
            metrics.targets_down.set(down_entries.len() as i64);
        }

        CycleReport {
            timestamp,
            checked: self.targets.len(),
            down_entries,
            dispatched,
        }
    }

    /// Render `(subject, body)` for the given timestamp and down entries.
    pub fn render_alert(&self, timestamp: &str, down_entries: &[String]) -> (String, String) {
        let summary = if down_entries.is_empty() {
            ALL_UP_SUMMARY.to_string()
        } else {
            down_entries.join("\n")
        };

        (
            self.template.render_subject(timestamp),
            self.template.render_body(timestamp, &summary),
        )
    }

    fn record_check(&self, result: &ProbeResult, outcome: &CheckOutcome) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        metrics.checks_total.inc();
        if !outcome.alive {
            metrics.checks_down_total.inc();
        }
        if let Some(elapsed) = result.elapsed() {
            metrics.probe_duration.observe(elapsed.as_secs_f64());
        }
    }
}
