//! Shared logging utilities for consistent tracing across both processes

use crate::types::ProcessRole;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Build the filter directive for a given base level
fn filter_directive(base_level: &str) -> String {
    format!("reconciler={base_level},shared={base_level}")
}

/// Initialize a stdout tracing subscriber for one cooperating process
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing(role: ProcessRole, log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let base_level = log_level.unwrap_or("info");
    let env_filter = filter_directive(base_level);

    let installed = fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        info!(process = %role, timestamp = format_timestamp(), "📊 Log level: {}", env_filter);
    }
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for process-aware info logging
#[macro_export]
macro_rules! process_info {
    ($role:expr, $($arg:tt)*) => {
        tracing::info!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware warning logging
#[macro_export]
macro_rules! process_warn {
    ($role:expr, $($arg:tt)*) => {
        tracing::warn!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware error logging
#[macro_export]
macro_rules! process_error {
    ($role:expr, $($arg:tt)*) => {
        tracing::error!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware debug logging
#[macro_export]
macro_rules! process_debug {
    ($role:expr, $($arg:tt)*) => {
        tracing::debug!(
            process = %$role,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for store startup
pub fn log_startup(role: &ProcessRole, details: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "🚀 Opening {}",
        details
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(role: &ProcessRole, context: &str, error: &dyn std::fmt::Display) {
    error!(
        process = %role,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}
