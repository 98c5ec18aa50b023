//! Status classification
//!
//! Maps a raw [`ProbeResult`] to an up/down [`CheckOutcome`] with a
//! human-readable message. Classification is total: every probe result,
//! including transport failures, yields an outcome.

use std::time::Duration;

use reqwest::StatusCode;

use crate::monitor::types::{CheckOutcome, ProbeErrorKind, ProbeResult};

/// Classify one probe result. First matching rule wins:
/// 404, 503, any other status outside 2xx/3xx, connection failure,
/// timeout, other transport failure, and finally success.
pub fn classify(result: &ProbeResult) -> CheckOutcome {
    match result {
        ProbeResult::Completed { status, elapsed } => classify_status(*status, Some(*elapsed)),
        ProbeResult::Failed { kind, detail, .. } => match kind {
            ProbeErrorKind::Connect => {
                CheckOutcome::down(format!("Connection error occurred: {}", detail))
            }
            ProbeErrorKind::Timeout => CheckOutcome::down(format!("Timeout occurred: {}", detail)),
            ProbeErrorKind::Other => CheckOutcome::down(format!("An error occurred: {}", detail)),
        },
    }
}

fn classify_status(status: StatusCode, elapsed: Option<Duration>) -> CheckOutcome {
    let response_time = format_response_time(elapsed);

    match status {
        StatusCode::NOT_FOUND => CheckOutcome::down(format!(
            "404 Not Found - The requested resource was not found on this server. {}",
            response_time
        )),
        StatusCode::SERVICE_UNAVAILABLE => CheckOutcome::down(format!(
            "503 Service Unavailable - The server cannot handle the request. {}",
            response_time
        )),
        s if !(s.is_success() || s.is_redirection()) => CheckOutcome::down(format!(
            "HTTP error occurred: {}. {}",
            describe_status(s),
            response_time
        )),
        s => CheckOutcome::up(format!(
            "Website is up and running. Status code: {}. {}",
            s.as_u16(),
            response_time
        )),
    }
}

/// `"Response time: 0.42 seconds"`, or `"Response time: unavailable"` when
/// timing was not captured.
pub fn format_response_time(elapsed: Option<Duration>) -> String {
    match elapsed {
        Some(elapsed) => format!("Response time: {:.2} seconds", elapsed.as_secs_f64()),
        None => "Response time: unavailable".to_string(),
    }
}

fn describe_status(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
