use super::console_logger::init_console_logger;
use super::file_logger::init_file_logger;
use crate::domains::logger::{DomainLogger, DynLogger};
use std::path::Path;
use std::sync::Arc;

/// Forwards every message to each sink in order.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }
}

/// Console logger, plus a file sink when `path` is given and fast_log
/// accepts it. A file sink that fails to start is reported on the console.
pub fn init_combined_logger(path: Option<&Path>, level: &str) -> DynLogger {
    let console = init_console_logger();
    let Some(path) = path else {
        return console;
    };
    match init_file_logger(path, level) {
        Ok(file) => Arc::new(MultiLogger::new(vec![console, file])) as DynLogger,
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
