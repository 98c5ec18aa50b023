//! Probe Interface
//!
//! Abstraction over the transport that performs one availability check.

use async_trait::async_trait;

use crate::monitor::types::ProbeResult;

/// Performs a single availability check against a URL.
///
/// Implementations must not retry and must enforce their own timeout: the
/// cycle runner awaits each probe to completion before moving on.
#[async_trait]
pub trait Prober {
    /// Probe `url` once and report what happened.
    async fn probe(&self, url: &str) -> ProbeResult;

    /// Name of this prober for logging/debugging
    fn name(&self) -> &str;
}
