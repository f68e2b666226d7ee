//! Logging backend.
//!
//! Records from the `log` facade are formatted with a timestamp and handed
//! to a sink callback, which the binary points at stderr and an embedding
//! application can point at its own log view.

use crate::error::AppError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Arc, Mutex};

type Sink = Box<dyn Fn(String) + Send + Sync>;

/// Format a log record into a single line.
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!(
        "{} {:<5} [{}] {}",
        timestamp,
        level_str,
        record.target(),
        record.args()
    )
}

/// Logger forwarding formatted records at or above a level to a sink.
///
pub struct WizardLogger {
    level: LevelFilter,
    sink: Arc<Mutex<Option<Sink>>>,
}

impl WizardLogger {
    pub fn new(level: LevelFilter) -> Self {
        WizardLogger {
            level,
            sink: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_sink(&self, sink: Sink) {
        if let Ok(mut guard) = self.sink.lock() {
            *guard = Some(sink);
        }
    }
}

impl Log for WizardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(sink) = self.sink.lock() {
                if let Some(ref sink) = *sink {
                    sink(format_log(record));
                }
            }
        }
    }

    fn flush(&self) {}
}

/// Install the logger as the global `log` backend.
///
pub fn init(level: LevelFilter, sink: Sink) -> Result<(), AppError> {
    let logger = WizardLogger::new(level);
    logger.set_sink(sink);
    log::set_boxed_logger(Box::new(logger)).map_err(|e| AppError::Logger(e.to_string()))?;
    log::set_max_level(level);
    Ok(())
}
