use super::scenario::Scenario;
use crate::common::DomainResult;

/// Port the planner depends on for problem instances.
/// Adapters provide built-in, filesystem or combined sources.
pub trait ScenarioSource: Send + Sync {
    fn load_scenario(&self, name: &str) -> DomainResult<Scenario>;
    /// Names `load_scenario` accepts, sorted.
    fn list_scenarios(&self) -> DomainResult<Vec<String>>;
}
