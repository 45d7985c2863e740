pub mod logger;
pub mod mapf;

pub use logger::*;
