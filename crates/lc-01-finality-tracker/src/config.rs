//! # Tracker Configuration
//!
//! Configuration for the finality tracker.

use crate::domain::{RetryPolicy, TransportCapability};
use serde::{Deserialize, Serialize};

/// Finality tracker configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Retry policy for request/response transports.
    pub polling: RetryPolicy,

    /// Force a tracking mode instead of asking the transport.
    /// `None` uses the transport's advertised capability.
    pub capability_override: Option<TransportCapability>,

    /// Wait for the transport to acknowledge unsubscription before returning.
    /// When `false` the unsubscribe runs on a detached task.
    pub await_unsubscribe: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            polling: RetryPolicy::default(),
            capability_override: None,
            await_unsubscribe: true,
        }
    }
}

impl TrackerConfig {
    /// Create a config for testing (zero-delay polling).
    pub fn for_testing() -> Self {
        Self {
            polling: RetryPolicy::immediate(5),
            capability_override: None,
            await_unsubscribe: true,
        }
    }

    /// Same config with a different polling policy.
    pub fn with_polling(mut self, polling: RetryPolicy) -> Self {
        self.polling = polling;
        self
    }

    /// Same config forced into one tracking mode.
    pub fn with_capability(mut self, capability: TransportCapability) -> Self {
        self.capability_override = Some(capability);
        self
    }

    /// Same config with unsubscription awaited (`true`) or detached (`false`).
    pub fn with_await_unsubscribe(mut self, await_unsubscribe: bool) -> Self {
        self.await_unsubscribe = await_unsubscribe;
        self
    }
}
