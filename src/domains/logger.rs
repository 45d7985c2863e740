use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn, LevelFilter};
use std::path::Path;
use std::sync::Arc;

/// Logging port for planning narration and diagnostics.
/// Non-fallible: a logger that cannot write drops the message.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Writes through the `log` facade into a fast_log file appender.
pub struct FileLogger;

impl FileLogger {
    /// Installs fast_log as the global `log` backend. Can only succeed once
    /// per process.
    pub fn init(path: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .file(&path.to_string_lossy())
                .level(level),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Maps a config level name onto the `log` filter; unknown names fall back
/// to `Info`.
pub fn level_filter(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}
