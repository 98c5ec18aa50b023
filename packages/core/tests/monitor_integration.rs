//! End-to-end check cycles.
//!
//! Wires the production pieces together (JSON sources, `HttpProber`,
//! `CycleRunner`, `AlertDispatcher`) against a wiremock server standing in
//! for the monitored websites. Only the mail transport is replaced, by a
//! recorder, so no SMTP server is needed.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use site_monitor::alerts::{AlertDispatcher, AlertMessage, MailError, MailTransport};
use site_monitor::config::ProbeConfig;
use site_monitor::metrics::AppMetrics;
use site_monitor::monitor::CycleRunner;
use site_monitor::services::HttpProber;
use site_monitor::sources::{load_targets, load_template};

// ---- Helpers ----------------------------------------------------------------

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<AlertMessage>>,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: &AlertMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Write `contents` to a per-test file in the system temp directory.
fn write_temp(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("site-monitor-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join(name);
    std::fs::write(&file, contents).unwrap();
    file
}

async fn site_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

async fn build_runner(
    test_name: &str,
    urls: &[String],
    mailer: Arc<RecordingMailer>,
    metrics: Arc<AppMetrics>,
) -> CycleRunner {
    let entries: Vec<String> = urls
        .iter()
        .map(|url| format!(r#"{{ "url": "{}" }}"#, url))
        .collect();
    let targets_file = write_temp(
        &format!("{}-urls.json", test_name),
        &format!(r#"{{ "urls": [{}] }}"#, entries.join(", ")),
    );
    let template_file = write_temp(
        &format!("{}-template.json", test_name),
        r#"{
            "subject": "Website Down Alert - {date}",
            "body": "The following websites are down as of {date}:\n\n{down_websites}"
        }"#,
    );

    let targets = Arc::new(load_targets(&targets_file).await.unwrap());
    let template = Arc::new(load_template(&template_file).await.unwrap());
    let prober = Arc::new(HttpProber::new(&ProbeConfig::default()).unwrap());

    CycleRunner::new(
        prober,
        AlertDispatcher::new(mailer).with_metrics(metrics.clone()),
        targets,
        template,
    )
    .with_metrics(metrics)
}

// ---- Tests ------------------------------------------------------------------

#[tokio::test]
async fn down_site_triggers_single_consolidated_alert() {
    let server = site_server().await;
    let mailer = Arc::new(RecordingMailer::default());
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let urls = vec![
        format!("{}/ok", server.uri()),
        format!("{}/missing", server.uri()),
        format!("{}/broken", server.uri()),
    ];
    let runner = build_runner("mixed", &urls, mailer.clone(), metrics.clone()).await;

    let report = runner.run_cycle().await;

    assert_eq!(report.checked, 3);
    assert_eq!(report.down_entries.len(), 2);
    assert!(report.down_entries[0].starts_with(&format!("{}: 404 Not Found", urls[1])));
    assert!(report.down_entries[1]
        .starts_with(&format!("{}: HTTP error occurred: 500 Internal Server Error", urls[2])));
    assert!(report.dispatched);

    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, format!("Website Down Alert - {}", report.timestamp));
    assert_eq!(
        sent[0].body,
        format!(
            "The following websites are down as of {}:\n\n{}",
            report.timestamp,
            report.down_entries.join("\n")
        )
    );

    assert_eq!(metrics.checks_total.get(), 3);
    assert_eq!(metrics.checks_down_total.get(), 2);
    assert_eq!(metrics.alerts_sent_total.get(), 1);
}

#[tokio::test]
async fn all_sites_up_sends_no_alert() {
    let server = site_server().await;
    let mailer = Arc::new(RecordingMailer::default());
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let urls = vec![format!("{}/ok", server.uri()), format!("{}/ok", server.uri())];
    let runner = build_runner("all-up", &urls, mailer.clone(), metrics.clone()).await;

    let report = runner.run_cycle().await;

    assert!(report.all_up());
    assert!(!report.dispatched);
    assert!(mailer.sent.lock().unwrap().is_empty());
    assert_eq!(metrics.targets_down.get(), 0);
}

#[tokio::test]
async fn unreachable_site_is_reported_and_cycle_continues() {
    let server = site_server().await;
    let mailer = Arc::new(RecordingMailer::default());
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let urls = vec![
        "http://127.0.0.1:1/".to_string(),
        format!("{}/ok", server.uri()),
    ];
    let runner = build_runner("unreachable", &urls, mailer.clone(), metrics).await;

    let report = runner.run_cycle().await;

    assert_eq!(report.checked, 2);
    assert_eq!(report.down_entries.len(), 1);
    assert!(report.down_entries[0].starts_with("http://127.0.0.1:1/: Connection error occurred:"));
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}
