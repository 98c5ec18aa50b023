use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::config::ProbeConfig;
use crate::error::AppError;
use crate::monitor::{ProbeErrorKind, ProbeResult, Prober};

/// Head start the connect phase gets over the overall request timeout, so a
/// host that never answers the handshake is reported as a connection error.
const CONNECT_MARGIN: Duration = Duration::from_millis(50);

/// HTTP GET prober backed by `reqwest`.
///
/// One attempt per probe, bounded by the configured timeout. Redirects
/// follow the client default policy.
#[derive(Clone)]
pub struct HttpProber {
    http: Client,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request_id_header = HeaderName::from_bytes(config.request_id_header.as_bytes())
            .map_err(|err| {
                AppError::config(format!(
                    "Invalid PROBE_REQUEST_ID_HEADER '{}': {}",
                    config.request_id_header, err
                ))
            })?;
        let request_id = HeaderValue::from_str(&config.request_id).map_err(|err| {
            AppError::config(format!("Invalid PROBE_REQUEST_ID: {}", err))
        })?;
        headers.insert(request_id_header, request_id);

        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for probes");
        }

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(connect_timeout(config.timeout()))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| AppError::startup(format!("Failed to build HTTP client: {}", err)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let started = Instant::now();

        let mut response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => return failure(&err, started),
        };

        let status = response.status();
        // Elapsed time covers the full download; chunks are dropped as they arrive.
        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => return ProbeResult::completed(status, started.elapsed()),
                Err(err) => return failure(&err, started),
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn failure(err: &reqwest::Error, started: Instant) -> ProbeResult {
    ProbeResult::Failed {
        kind: error_kind(err),
        detail: err.to_string(),
        elapsed: Some(started.elapsed()),
    }
}

fn connect_timeout(total: Duration) -> Duration {
    total.saturating_sub(CONNECT_MARGIN).max(CONNECT_MARGIN)
}

fn error_kind(err: &reqwest::Error) -> ProbeErrorKind {
    if err.is_connect() || connection_dropped(err) {
        ProbeErrorKind::Connect
    } else if err.is_timeout() {
        ProbeErrorKind::Timeout
    } else {
        ProbeErrorKind::Other
    }
}

/// Whether the peer reset or closed an established connection.
fn connection_dropped(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() {
                return true;
            }
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
