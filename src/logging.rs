use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Initialize structured logging system.
///
/// Console output goes to stderr, as JSON when `json` is set. When a log
/// file is given, a daily-rolling JSON file layer is added; keep the
/// returned guard alive for as long as the file should be written.
pub fn init_logging(log_level: Option<&str>, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    // Set up environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            let level = log_level.unwrap_or("info");
            EnvFilter::try_new(level)
        })
        .map_err(|e| anyhow::anyhow!("Failed to create log filter: {}", e))?;

    let console_layer = if json {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .boxed()
    };

    let registry = Registry::default().with(env_filter).with(console_layer);

    let guard = if let Some(log_path) = log_file {
        let directory = log_path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = log_path
            .file_name()
            .map_or_else(|| "clinic.log".to_string(), |name| name.to_string_lossy().into_owned());
        let file_appender = rolling::daily(directory, file_name);
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false)
            .with_target(true)
            .json();

        registry
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {}", e))?;
        Some(guard)
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {}", e))?;
        None
    };

    info!("Logging system initialized");
    Ok(guard)
}

/// Performance timing utilities
pub struct OperationTimer {
    operation: String,
    start: std::time::Instant,
}

impl OperationTimer {
    /// Start timing `operation`
    #[must_use]
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: std::time::Instant::now(),
        }
    }

    /// Log the elapsed time and return it in milliseconds
    pub fn finish(self) -> u128 {
        let duration = self.start.elapsed().as_millis();
        tracing::info!(
            operation = self.operation,
            duration_ms = duration,
            "Operation completed"
        );
        duration
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let duration = self.start.elapsed().as_millis();
            tracing::debug!(
                operation = self.operation,
                duration_ms = duration,
                "Operation finished"
            );
        }
    }
}
