//! Provider Call Timeouts
//!
//! Bounds each provider attempt so a hung upstream cannot stall a
//! generation. An expired attempt becomes an ordinary `ProviderError`
//! (classified `Unknown`) and takes part in fallback like any other failure.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::{TimeoutConfig, with_provider_timeout};
//!
//! let config = TimeoutConfig::from_secs(30);
//! let completion = with_provider_timeout(
//!     "claude",
//!     config.provider_attempt,
//!     provider.generate(&prompt, 1024),
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::ai::provider::ProviderResult;
use crate::constants::network as net_constants;
use crate::types::ProviderError;

/// Timeouts applied by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Whole adapter invocation, model cycling included (default: 30 seconds)
    pub provider_attempt: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_secs(net_constants::DEFAULT_TIMEOUT_SECS)
    }
}

impl TimeoutConfig {
    pub fn from_secs(secs: u64) -> Self {
        Self {
            provider_attempt: Duration::from_secs(secs),
        }
    }
}

/// Execute a provider call with a timeout
///
/// The inner future is dropped on expiry, cancelling its HTTP request.
pub async fn with_provider_timeout<T, F>(
    provider: &str,
    timeout: Duration,
    future: F,
) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(provider, timeout)),
    }
}
