use super::grid::Grid;
use super::types::{Agent, AgentId, Cell};
use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A problem instance: one grid and the agents that share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub grid: Grid,
    pub agents: Vec<Agent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    name: String,
    map: Grid,
    #[serde(default)]
    agents: Vec<AgentEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AgentEntry {
    start: Cell,
    goal: Cell,
}

impl Scenario {
    /// Builds a validated instance. Agents get ids in the order given.
    pub fn new(
        name: impl Into<String>,
        grid: Grid,
        endpoints: impl IntoIterator<Item = (Cell, Cell)>,
    ) -> DomainResult<Self> {
        let agents: Vec<Agent> = endpoints
            .into_iter()
            .enumerate()
            .map(|(i, (start, goal))| Agent::new(AgentId(i), start, goal))
            .collect();
        let scenario = Self {
            name: name.into(),
            grid,
            agents,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_toml_str(content: &str) -> DomainResult<Self> {
        let file: ScenarioFile = toml::from_str(content)?;
        Self::new(
            file.name,
            file.map,
            file.agents.into_iter().map(|a| (a.start, a.goal)),
        )
    }

    pub fn to_toml_string(&self) -> DomainResult<String> {
        let file = ScenarioFile {
            name: self.name.clone(),
            map: self.grid.clone(),
            agents: self
                .agents
                .iter()
                .map(|a| AgentEntry {
                    start: a.start,
                    goal: a.goal,
                })
                .collect(),
        };
        toml::to_string(&file).map_err(|e| DomainError::InfrastructureError(e.to_string()))
    }

    fn validate(&self) -> DomainResult<()> {
        if self.agents.is_empty() {
            return Err(DomainError::invalid(format!(
                "scenario '{}' has no agents",
                self.name
            )));
        }

        let mut starts = HashSet::new();
        for agent in &self.agents {
            for (what, cell) in [("start", agent.start), ("goal", agent.goal)] {
                if !self.grid.in_bounds(cell) {
                    return Err(DomainError::invalid(format!(
                        "agent {} {} {} is outside the {}x{} grid",
                        agent.id,
                        what,
                        cell,
                        self.grid.rows(),
                        self.grid.cols()
                    )));
                }
                if self.grid.is_wall(cell) {
                    return Err(DomainError::invalid(format!(
                        "agent {} {} {} is a wall",
                        agent.id, what, cell
                    )));
                }
            }
            if !starts.insert(agent.start) {
                return Err(DomainError::invalid(format!(
                    "agent {} starts on {}, which is already taken",
                    agent.id, agent.start
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = r#####"
name = "corridor"
map = ["####", "#..#", "####"]

[[agents]]
start = [1, 1]
goal = [1, 2]

[[agents]]
start = [1, 2]
goal = [1, 1]
"#####;

    #[test]
    fn parses_agents_in_file_order() {
        let scenario = Scenario::from_toml_str(CORRIDOR).unwrap();
        assert_eq!(scenario.name, "corridor");
        assert_eq!(scenario.grid.rows(), 3);
        assert_eq!(scenario.agents.len(), 2);
        assert_eq!(scenario.agents[1].id, AgentId(1));
        assert_eq!(scenario.agents[1].start, Cell::new(1, 2));
    }

    #[test]
    fn survives_a_toml_round_trip() {
        let scenario = Scenario::from_toml_str(CORRIDOR).unwrap();
        let text = scenario.to_toml_string().unwrap();
        assert_eq!(Scenario::from_toml_str(&text).unwrap(), scenario);
    }

    #[test]
    fn rejects_walls_and_shared_starts() {
        let grid = Grid::from_rows(&["..#", "..."]).unwrap();
        let on_wall = Scenario::new("w", grid.clone(), [(Cell::new(0, 2), Cell::new(1, 0))]);
        assert!(matches!(on_wall, Err(DomainError::InvalidInstance { .. })));

        let shared = Scenario::new(
            "s",
            grid.clone(),
            [
                (Cell::new(0, 0), Cell::new(1, 2)),
                (Cell::new(0, 0), Cell::new(1, 1)),
            ],
        );
        assert!(matches!(shared, Err(DomainError::InvalidInstance { .. })));

        let outside = Scenario::new("o", grid, [(Cell::new(5, 0), Cell::new(0, 0))]);
        assert!(outside.is_err());
    }

    #[test]
    fn reports_malformed_toml() {
        let result = Scenario::from_toml_str("map = [\"..\", \".\"]");
        assert!(matches!(result, Err(DomainError::ScenarioParse(_))));
    }
}
