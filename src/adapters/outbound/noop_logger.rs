use crate::domains::logger::DomainLogger;
use std::sync::Arc;

struct QuietNarration;

impl DomainLogger for QuietNarration {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Logger for `run --json`. Solver narration is dropped so stdout holds
/// nothing but the JSON report; tracing still writes to stderr.
pub fn init_noop_logger() -> Arc<dyn DomainLogger> {
    Arc::new(QuietNarration)
}
