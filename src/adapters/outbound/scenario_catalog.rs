use crate::common::{DomainError, DomainResult};
use crate::domains::mapf::{Scenario, ScenarioSource};
use std::sync::Arc;

/// Looks a name up in each source in turn; the first source that has it
/// wins. Sources that fail for other reasons stop the lookup.
pub struct ScenarioCatalog {
    sources: Vec<Arc<dyn ScenarioSource>>,
}

impl ScenarioCatalog {
    pub fn new(sources: Vec<Arc<dyn ScenarioSource>>) -> Self {
        Self { sources }
    }
}

impl ScenarioSource for ScenarioCatalog {
    fn load_scenario(&self, name: &str) -> DomainResult<Scenario> {
        for source in &self.sources {
            match source.load_scenario(name) {
                Err(DomainError::ScenarioNotFound { .. }) => continue,
                found => return found,
            }
        }
        Err(DomainError::ScenarioNotFound {
            name: name.to_string(),
        })
    }

    fn list_scenarios(&self) -> DomainResult<Vec<String>> {
        let mut names = Vec::new();
        for source in &self.sources {
            names.extend(source.list_scenarios()?);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}
