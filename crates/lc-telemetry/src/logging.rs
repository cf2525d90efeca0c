//! Structured logging setup.
//!
//! Events carry consistent fields:
//! - `level`, `target`, `message`
//! - `subsystem` when emitted through [`log_event!`](crate::log_event)
//! - `tx_hash` when emitted through [`log_tx_event!`](crate::log_tx_event)

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format chosen by the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, ANSI colored
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    fn of(config: &TelemetryConfig) -> Self {
        if config.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Parse the configured filter directives.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
        directives: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// Returns `Ok(true)` when this call installed it and `Ok(false)` when a
/// subscriber was already present, so repeated calls are harmless.
pub fn init_logging(config: &TelemetryConfig) -> Result<bool, TelemetryError> {
    config.validate()?;
    let filter = build_filter(config)?;
    let format = LogFormat::of(config);

    let installed = match format {
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(config.with_target)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
                .is_ok()
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(config.with_target)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .is_ok()
        }
    };

    if installed {
        tracing::info!(
            service = %config.service_name,
            format = ?format,
            filter = %config.log_level,
            "Logging initialized"
        );
    } else {
        tracing::debug!("Global subscriber already set, keeping it");
    }
    Ok(installed)
}

/// Structured log entry tagged with a subsystem.
///
/// `log_event!(warn, "lc-02", "Indexer offline", backend = "indexer")`
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction-related event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $subsystem:expr, $msg:expr, $tx_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            tx_hash = %$tx_hash,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_config() {
        assert_eq!(LogFormat::of(&TelemetryConfig::default()), LogFormat::Pretty);
        assert_eq!(
            LogFormat::of(&TelemetryConfig::default().with_json(true)),
            LogFormat::Json
        );
    }

    #[test]
    fn test_build_filter_accepts_directives() {
        let config = TelemetryConfig::default().with_log_level("info,lc_02_pagination=debug");
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let config = TelemetryConfig::default().with_log_level("lc_01=notalevel");
        assert!(matches!(
            build_filter(&config),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = TelemetryConfig::for_testing();
        let first = init_logging(&config).unwrap();
        let second = init_logging(&config).unwrap();
        assert!(!second);
        // Another test in this binary may have installed it first.
        let _ = first;
    }

    #[test]
    fn test_macros_expand() {
        crate::log_event!(info, "lc-01", "Tracker started", mode = "polling");
        crate::log_event!(debug, "lc-02", "Page resolved");
        crate::log_tx_event!(warn, "lc-01", "Rejected", "0xaa", index = 3);
    }
}
