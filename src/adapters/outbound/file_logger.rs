use crate::domains::logger::{level_filter, DomainLogger, FileLogger};
use std::path::Path;
use std::sync::Arc;

/// Installs the fast_log appender for `path` and hands back a logger that
/// writes through it.
pub fn init_file_logger(path: &Path, level: &str) -> Result<Arc<dyn DomainLogger>, String> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create log directory {}: {}", dir.display(), e))?;
    }
    FileLogger::init(path, level_filter(level))
        .map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
