pub mod builtin_scenarios;
pub mod console_logger;
pub mod file_logger;
pub mod multi_logger;
pub mod noop_logger;
pub mod plan_renderer;
pub mod scenario_catalog;
pub mod scenario_data;

pub use builtin_scenarios::*;
pub use console_logger::*;
pub use file_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use plan_renderer::*;
pub use scenario_catalog::*;
pub use scenario_data::*;
