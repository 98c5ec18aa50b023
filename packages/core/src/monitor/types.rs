//! Core data types for the check-and-alert cycle

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// A single URL under monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub url: String,
}

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Kind of transport-level failure seen while probing a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    /// DNS failure, refused or reset connection.
    Connect,
    /// The request exceeded the probe timeout.
    Timeout,
    /// Anything else the transport reported.
    Other,
}

/// Raw outcome of one probe, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The HTTP exchange completed with a status code.
    Completed { status: StatusCode, elapsed: Duration },
    /// The request failed below the HTTP layer.
    Failed {
        kind: ProbeErrorKind,
        detail: String,
        elapsed: Option<Duration>,
    },
}

impl ProbeResult {
    pub fn completed(status: StatusCode, elapsed: Duration) -> Self {
        Self::Completed { status, elapsed }
    }

    pub fn failed(kind: ProbeErrorKind, detail: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            detail: detail.into(),
            elapsed: None,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::Completed { elapsed, .. } => Some(*elapsed),
            Self::Failed { elapsed, .. } => *elapsed,
        }
    }
}

/// Classified result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub alive: bool,
    pub message: String,
}

impl CheckOutcome {
    pub fn up(message: impl Into<String>) -> Self {
        Self {
            alive: true,
            message: message.into(),
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            alive: false,
            message: message.into(),
        }
    }
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Local time the summary was rendered, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    /// Number of targets probed.
    pub checked: usize,
    /// `"{url}: {message}"` for every down target, in target order.
    pub down_entries: Vec<String>,
    /// Whether an alert was handed to the mail transport and accepted.
    pub dispatched: bool,
}

impl CycleReport {
    pub fn all_up(&self) -> bool {
        self.down_entries.is_empty()
    }
}
