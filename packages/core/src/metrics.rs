//! Prometheus metrics registry for the site monitor.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the cycle runner and the alert dispatcher.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`) when a metrics port is configured.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Completed check cycles.
    pub cycles_total: IntCounter,
    /// Individual target probes (up + down).
    pub checks_total: IntCounter,
    /// Probes classified as down.
    pub checks_down_total: IntCounter,
    /// Targets found down in the most recent cycle.
    pub targets_down: IntGauge,
    /// Alert emails accepted by the mail transport.
    pub alerts_sent_total: IntCounter,
    /// Alert emails the mail transport rejected or failed to deliver.
    pub alert_failures_total: IntCounter,
    /// Probe latency histogram in seconds, for probes that reported timing.
    pub probe_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated (should not happen in practice).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_total = IntCounter::with_opts(Opts::new(
            "site_monitor_cycles_total",
            "Completed check cycles",
        ))?;

        let checks_total = IntCounter::with_opts(Opts::new(
            "site_monitor_checks_total",
            "Target probes performed",
        ))?;

        let checks_down_total = IntCounter::with_opts(Opts::new(
            "site_monitor_checks_down_total",
            "Target probes classified as down",
        ))?;

        let targets_down = IntGauge::with_opts(Opts::new(
            "site_monitor_targets_down",
            "Targets down in the most recent cycle",
        ))?;

        let alerts_sent_total = IntCounter::with_opts(Opts::new(
            "site_monitor_alerts_sent_total",
            "Alert emails delivered to the mail transport",
        ))?;

        let alert_failures_total = IntCounter::with_opts(Opts::new(
            "site_monitor_alert_failures_total",
            "Alert emails that failed to send",
        ))?;

        let probe_duration = Histogram::with_opts(
            HistogramOpts::new(
                "site_monitor_probe_duration_seconds",
                "Target probe latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(checks_total.clone()))?;
        registry.register(Box::new(checks_down_total.clone()))?;
        registry.register(Box::new(targets_down.clone()))?;
        registry.register(Box::new(alerts_sent_total.clone()))?;
        registry.register(Box::new(alert_failures_total.clone()))?;
        registry.register(Box::new(probe_duration.clone()))?;

        Ok(Self {
            cycles_total,
            checks_total,
            checks_down_total,
            targets_down,
            alerts_sent_total,
            alert_failures_total,
            probe_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
