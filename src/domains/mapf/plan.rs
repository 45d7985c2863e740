use super::conflict::{self, Conflict};
use super::types::{Agent, AgentId, Cell, Path, Timestep};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanQuality {
    /// Verified free of conflicts over the whole horizon.
    ConflictFree,
    /// Last paths of a failed solve. May contain conflicts.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanViolation {
    Conflict(Conflict),
    GoalIntrusion {
        parked: AgentId,
        intruder: AgentId,
        cell: Cell,
        timestep: Timestep,
    },
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanViolation::Conflict(c) => write!(f, "{}", c),
            PlanViolation::GoalIntrusion {
                parked,
                intruder,
                cell,
                timestep,
            } => write!(
                f,
                "agent {} moves onto agent {}'s finished goal {} at t={}",
                intruder, parked, cell, timestep
            ),
        }
    }
}

/// Joint paths of all agents, ordered by agent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    agents: Vec<Agent>,
    makespan: Timestep,
    quality: PlanQuality,
}

impl Plan {
    pub(crate) fn new(agents: &[Agent], quality: PlanQuality) -> Self {
        let mut agents = agents.to_vec();
        agents.sort_by_key(|a| a.id);
        Self {
            makespan: conflict::horizon(&agents),
            agents,
            quality,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn quality(&self) -> PlanQuality {
        self.quality
    }

    pub fn is_conflict_free(&self) -> bool {
        self.quality == PlanQuality::ConflictFree
    }

    /// Last timestep at which any agent still moves.
    pub fn makespan(&self) -> Timestep {
        self.makespan
    }

    pub fn path(&self, agent: AgentId) -> Option<&Path> {
        self.agent(agent).map(|a| &a.path)
    }

    /// Padded position: parked agents stay on their goal.
    pub fn position_at(&self, agent: AgentId, t: Timestep) -> Option<Cell> {
        self.path(agent).and_then(|p| p.at(t))
    }

    pub fn arrival_time(&self, agent: AgentId) -> Option<Timestep> {
        self.agent(agent).and_then(Agent::arrival)
    }

    pub fn sum_of_costs(&self) -> usize {
        self.agents.iter().filter_map(Agent::arrival).sum()
    }

    /// Conflicts and parked-goal intrusions, earliest first.
    pub fn verify(&self) -> Vec<PlanViolation> {
        let mut violations: Vec<PlanViolation> = conflict::detect_all(&self.agents, self.makespan)
            .into_iter()
            .map(PlanViolation::Conflict)
            .collect();
        violations.extend(self.goal_intrusions());
        violations
    }

    fn goal_intrusions(&self) -> Vec<PlanViolation> {
        let mut found = Vec::new();
        for parked in &self.agents {
            let Some(t_goal) = parked.arrival() else {
                continue;
            };
            for other in self.agents.iter().filter(|o| o.id != parked.id) {
                for t in t_goal..=self.makespan {
                    if other.path.at(t) == Some(parked.goal) {
                        found.push((t, parked.id, other.id, parked.goal));
                    }
                }
            }
        }
        found.sort();
        found
            .into_iter()
            .map(|(timestep, parked, intruder, cell)| PlanViolation::GoalIntrusion {
                parked,
                intruder,
                cell,
                timestep,
            })
            .collect()
    }

    fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|i| &self.agents[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(id: usize, cells: &[(i32, i32)]) -> Agent {
        let cells: Vec<Cell> = cells.iter().map(|&c| c.into()).collect();
        let mut agent = Agent::new(AgentId(id), cells[0], *cells.last().unwrap());
        agent.path = Path::new(cells);
        agent
    }

    #[test]
    fn reports_costs_and_padded_positions() {
        let plan = Plan::new(
            &[
                planned(1, &[(2, 0), (2, 1)]),
                planned(0, &[(0, 0), (0, 1), (0, 2), (0, 3)]),
            ],
            PlanQuality::ConflictFree,
        );
        assert_eq!(plan.agents()[0].id, AgentId(0));
        assert_eq!(plan.makespan(), 3);
        assert_eq!(plan.sum_of_costs(), 4);
        assert_eq!(plan.position_at(AgentId(1), 3), Some(Cell::new(2, 1)));
        assert_eq!(plan.arrival_time(AgentId(0)), Some(3));
        assert!(plan.verify().is_empty());
    }

    #[test]
    fn flags_agents_crossing_a_parked_goal() {
        let plan = Plan::new(
            &[
                planned(0, &[(0, 0), (0, 1)]),
                planned(1, &[(1, 1), (0, 1), (0, 2)]),
            ],
            PlanQuality::BestEffort,
        );
        let violations = plan.verify();
        assert!(violations.contains(&PlanViolation::GoalIntrusion {
            parked: AgentId(0),
            intruder: AgentId(1),
            cell: Cell::new(0, 1),
            timestep: 1,
        }));
        assert!(violations
            .iter()
            .any(|v| matches!(v, PlanViolation::Conflict(c) if c.timestep == 1)));
    }
}
