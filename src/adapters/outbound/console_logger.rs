use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Plain stdout/stderr logger. Narration goes to stdout untouched so that
/// rendered grids stay readable.
struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        println!("warning: {}", msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("error: {}", msg);
    }
}

pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleLogger)
}
