use super::constraints::Constraint;
use super::types::{Agent, AgentId, Cell, Timestep};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Both agents on `cell` at the conflict timestep.
    Vertex { cell: Cell },
    /// `first` moved `first_from -> first_to` while `second` moved the
    /// opposite way.
    Edge { first_from: Cell, first_to: Cell },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Vertex { cell } => write!(f, "vertex conflict at {}", cell),
            ConflictKind::Edge {
                first_from,
                first_to,
            } => write!(f, "swap conflict between {} and {}", first_from, first_to),
        }
    }
}

/// A pairwise conflict; `first` always has the lower agent index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conflict {
    pub first: AgentId,
    pub second: AgentId,
    pub timestep: Timestep,
    pub kind: ConflictKind,
}

impl Conflict {
    pub fn involves(&self, agent: AgentId) -> bool {
        self.first == agent || self.second == agent
    }

    pub fn other(&self, agent: AgentId) -> AgentId {
        if agent == self.first {
            self.second
        } else {
            self.first
        }
    }

    /// The constraint that removes this conflict from `agent`'s side.
    pub fn constraint_for(&self, agent: AgentId) -> Constraint {
        match self.kind {
            ConflictKind::Vertex { cell } => Constraint::Vertex {
                timestep: self.timestep,
                cell,
            },
            ConflictKind::Edge {
                first_from,
                first_to,
            } if agent == self.first => Constraint::Edge {
                timestep: self.timestep,
                from: first_from,
                to: first_to,
            },
            ConflictKind::Edge {
                first_from,
                first_to,
            } => Constraint::Edge {
                timestep: self.timestep,
                from: first_to,
                to: first_from,
            },
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "agents {} and {}: {} at t={}",
            self.first, self.second, self.kind, self.timestep
        )
    }
}

/// Last timestep any agent explicitly moves; beyond it everyone is parked.
pub fn horizon(agents: &[Agent]) -> Timestep {
    agents
        .iter()
        .map(|a| a.path.last_timestep())
        .max()
        .unwrap_or(0)
}

/// Earliest conflict in (timestep, agent pair) order.
pub fn detect(agents: &[Agent], horizon: Timestep) -> Option<Conflict> {
    conflicts(agents, horizon).next()
}

/// Every conflict, in the same order `detect` would report them.
pub fn detect_all(agents: &[Agent], horizon: Timestep) -> Vec<Conflict> {
    conflicts(agents, horizon).collect()
}

fn conflicts(agents: &[Agent], horizon: Timestep) -> impl Iterator<Item = Conflict> + '_ {
    (1..=horizon).flat_map(move |t| {
        agents.iter().enumerate().flat_map(move |(i, a)| {
            agents[i + 1..]
                .iter()
                .filter_map(move |b| pair_conflict(a, b, t))
        })
    })
}

fn pair_conflict(a: &Agent, b: &Agent, t: Timestep) -> Option<Conflict> {
    let (a_now, b_now) = (a.path.at(t)?, b.path.at(t)?);
    let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };

    if a_now == b_now {
        return Some(Conflict {
            first: first.id,
            second: second.id,
            timestep: t,
            kind: ConflictKind::Vertex { cell: a_now },
        });
    }

    let (a_prev, b_prev) = (a.path.at(t - 1)?, b.path.at(t - 1)?);
    if a_prev == b_now && b_prev == a_now {
        let (first_from, first_to) = if first.id == a.id {
            (a_prev, a_now)
        } else {
            (b_prev, b_now)
        };
        return Some(Conflict {
            first: first.id,
            second: second.id,
            timestep: t,
            kind: ConflictKind::Edge {
                first_from,
                first_to,
            },
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::mapf::types::Path;
    use rstest::rstest;

    fn walker(id: usize, cells: &[(i32, i32)]) -> Agent {
        let cells: Vec<Cell> = cells.iter().map(|&c| c.into()).collect();
        let mut agent = Agent::new(AgentId(id), cells[0], *cells.last().unwrap());
        agent.path = Path::new(cells);
        agent
    }

    #[rstest]
    #[case::same_cell(&[(0, 0), (0, 1)], &[(0, 2), (0, 1)], Some(1))]
    #[case::swap(&[(0, 0), (0, 1)], &[(0, 1), (0, 0)], Some(1))]
    #[case::follow(&[(0, 1), (0, 2)], &[(0, 0), (0, 1)], None)]
    #[case::parked(&[(0, 0), (0, 1)], &[(1, 2), (1, 1), (0, 1)], Some(2))]
    #[case::apart(&[(0, 0), (0, 1)], &[(2, 0), (2, 1)], None)]
    fn detects_first_conflict_timestep(
        #[case] a: &[(i32, i32)],
        #[case] b: &[(i32, i32)],
        #[case] expected: Option<Timestep>,
    ) {
        let agents = vec![walker(0, a), walker(1, b)];
        let found = detect(&agents, horizon(&agents));
        assert_eq!(found.map(|c| c.timestep), expected);
    }

    #[test]
    fn swap_constraints_forbid_each_agents_own_move() {
        let agents = vec![
            walker(0, &[(0, 0), (0, 1)]),
            walker(1, &[(0, 1), (0, 0)]),
        ];
        let conflict = detect(&agents, 1).unwrap();
        assert!(matches!(conflict.kind, ConflictKind::Edge { .. }));
        assert_eq!(
            conflict.constraint_for(AgentId(0)),
            Constraint::Edge {
                timestep: 1,
                from: Cell::new(0, 0),
                to: Cell::new(0, 1)
            }
        );
        assert_eq!(
            conflict.constraint_for(AgentId(1)),
            Constraint::Edge {
                timestep: 1,
                from: Cell::new(0, 1),
                to: Cell::new(0, 0)
            }
        );
    }

    #[test]
    fn earlier_timesteps_win_over_lower_agent_pairs() {
        let agents = vec![
            walker(0, &[(0, 0), (0, 1), (0, 2)]),
            walker(1, &[(0, 4), (0, 3), (0, 2)]),
            walker(2, &[(3, 0), (3, 1)]),
            walker(3, &[(3, 2), (3, 1)]),
        ];
        let first = detect(&agents, horizon(&agents)).unwrap();
        assert_eq!((first.first, first.second, first.timestep), (AgentId(2), AgentId(3), 1));
        assert_eq!(detect_all(&agents, horizon(&agents)).len(), 3);
    }
}
