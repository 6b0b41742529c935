use log::{debug, info};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging once at process startup. `RUST_LOG` still wins over
/// the defaults set here.
pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .filter_module("verity", log::LevelFilter::Debug)
            .filter_module("diesel", log::LevelFilter::Warn)
            .filter_module("reqwest", log::LevelFilter::Warn)
            .filter_module("tokio", log::LevelFilter::Warn)
            .format_timestamp_secs()
            .format_target(false)
            .format_module_path(false)
            .init();

        info!("Logging initialized");
    });
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

/// Uniform log lines for the engine's recurring events, so runs stay
/// greppable by prefix.
pub struct LogContext;

impl LogContext {
    /// One line per upstream request once its outcome is known; a debug
    /// line when it starts.
    pub fn provider_call(provider: &str, endpoint: &str, status: &str, duration_ms: Option<u64>) {
        match duration_ms {
            Some(duration) => info!(
                "Provider: {} {} {} in {}ms",
                provider, endpoint, status, duration
            ),
            None => debug!("Provider: starting {} {}", provider, endpoint),
        }
    }

    /// Progress line emitted before each record of a batch run.
    pub fn batch_progress(current: usize, total: usize, venue: &str) {
        info!("Batch: [{}/{}] processing '{}'", current, total, venue);
    }

    /// End-of-run timing line.
    pub fn performance_metric(operation: &str, duration_ms: u64, detail: Option<&str>) {
        match detail {
            Some(detail) => info!("Performance: {} took {}ms ({})", operation, duration_ms, detail),
            None => info!("Performance: {} took {}ms", operation, duration_ms),
        }
    }
}
