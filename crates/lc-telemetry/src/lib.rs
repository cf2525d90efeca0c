//! # lc-telemetry
//!
//! Logging bootstrap shared by the ledger client crates.
//!
//! ## Components
//!
//! - **config**: environment driven [`TelemetryConfig`]
//! - **logging**: [`init_logging`] and the `log_event!` helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lc_telemetry::{init_logging, TelemetryConfig};
//!
//! let _installed = init_logging(&TelemetryConfig::from_env())?;
//! lc_telemetry::log_event!(info, "lc-01", "Tracker started", mode = "subscription");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `LC_SERVICE_NAME` | `ledger-client` | Service name stamped on every event |
//! | `LC_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directives |
//! | `LC_JSON_LOGS` | `false` | JSON output instead of pretty text |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, LogFormat};

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directives could not be parsed
    #[error("Invalid log filter '{directives}': {reason}")]
    InvalidFilter {
        /// Offending directives
        directives: String,
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
