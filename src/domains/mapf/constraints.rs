use super::types::{AgentId, Cell, Timestep};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A restriction on a single agent. The owning agent is the store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constraint {
    /// May not occupy `cell` at `timestep`.
    Vertex { timestep: Timestep, cell: Cell },
    /// May not move `from -> to` arriving at `timestep`.
    Edge {
        timestep: Timestep,
        from: Cell,
        to: Cell,
    },
}

impl Constraint {
    pub fn timestep(&self) -> Timestep {
        match self {
            Constraint::Vertex { timestep, .. } | Constraint::Edge { timestep, .. } => *timestep,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Vertex { timestep, cell } => write!(f, "not at {} at t={}", cell, timestep),
            Constraint::Edge { timestep, from, to } => {
                write!(f, "not {} -> {} at t={}", from, to, timestep)
            }
        }
    }
}

/// Forbids `agent` from `cell` at every timestep from `from` onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConstraint {
    pub agent: AgentId,
    pub cell: Cell,
    pub from: Timestep,
}

/// Sparse per-agent constraint sets.
///
/// Conflict constraints are added and rolled back one at a time by the
/// resolution loop. Goal-occupation constraints are open-ended in time and
/// are always replaced wholesale, so they live in their own map.
#[derive(Debug, Clone, Default)]
pub struct ConstraintStore {
    vertex: BTreeSet<(AgentId, Timestep, Cell)>,
    edge: BTreeSet<(AgentId, Timestep, Cell, Cell)>,
    goal: BTreeMap<(AgentId, Cell), Timestep>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the constraint was already present.
    pub fn add(&mut self, agent: AgentId, constraint: Constraint) -> bool {
        match constraint {
            Constraint::Vertex { timestep, cell } => self.vertex.insert((agent, timestep, cell)),
            Constraint::Edge { timestep, from, to } => {
                self.edge.insert((agent, timestep, from, to))
            }
        }
    }

    pub fn remove(&mut self, agent: AgentId, constraint: &Constraint) -> bool {
        match *constraint {
            Constraint::Vertex { timestep, cell } => self.vertex.remove(&(agent, timestep, cell)),
            Constraint::Edge { timestep, from, to } => {
                self.edge.remove(&(agent, timestep, from, to))
            }
        }
    }

    /// Drops every goal-occupation constraint and installs `derived`. When
    /// the same (agent, cell) appears twice the earliest start wins.
    pub fn replace_goal_constraints<I>(&mut self, derived: I)
    where
        I: IntoIterator<Item = GoalConstraint>,
    {
        self.goal.clear();
        for gc in derived {
            self.goal
                .entry((gc.agent, gc.cell))
                .and_modify(|from| *from = (*from).min(gc.from))
                .or_insert(gc.from);
        }
    }

    pub fn clear(&mut self) {
        self.vertex.clear();
        self.edge.clear();
        self.goal.clear();
    }

    pub fn conflict_constraint_count(&self) -> usize {
        self.vertex.len() + self.edge.len()
    }

    pub fn goal_constraint_count(&self) -> usize {
        self.goal.len()
    }

    pub fn for_agent(&self, agent: AgentId) -> AgentConstraints<'_> {
        AgentConstraints { store: self, agent }
    }
}

/// Read-only view of one agent's constraints, handed to the search.
#[derive(Debug, Clone, Copy)]
pub struct AgentConstraints<'a> {
    store: &'a ConstraintStore,
    agent: AgentId,
}

impl<'a> AgentConstraints<'a> {
    pub fn forbids_vertex(&self, timestep: Timestep, cell: Cell) -> bool {
        self.store.vertex.contains(&(self.agent, timestep, cell))
            || self
                .store
                .goal
                .get(&(self.agent, cell))
                .is_some_and(|from| timestep >= *from)
    }

    pub fn forbids_edge(&self, timestep: Timestep, from: Cell, to: Cell) -> bool {
        self.store.edge.contains(&(self.agent, timestep, from, to))
    }

    /// True if the agent could not stay on `cell` forever after `timestep`.
    pub fn blocks_parking(&self, cell: Cell, timestep: Timestep) -> bool {
        if self.store.goal.contains_key(&(self.agent, cell)) {
            return true;
        }
        let Some(after) = timestep.checked_add(1) else {
            return false;
        };
        self.store
            .vertex
            .range((self.agent, after, Cell::MIN)..=(self.agent, Timestep::MAX, Cell::MAX))
            .any(|&(_, _, c)| c == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: AgentId = AgentId(0);
    const B: AgentId = AgentId(1);

    #[test]
    fn vertex_constraints_are_per_agent_and_timestep() {
        let mut store = ConstraintStore::new();
        let cell = Cell::new(2, 3);
        assert!(store.add(A, Constraint::Vertex { timestep: 4, cell }));
        assert!(!store.add(A, Constraint::Vertex { timestep: 4, cell }));

        assert!(store.for_agent(A).forbids_vertex(4, cell));
        assert!(!store.for_agent(A).forbids_vertex(5, cell));
        assert!(!store.for_agent(B).forbids_vertex(4, cell));

        assert!(store.remove(A, &Constraint::Vertex { timestep: 4, cell }));
        assert!(!store.for_agent(A).forbids_vertex(4, cell));
    }

    #[test]
    fn edge_constraints_are_directed() {
        let mut store = ConstraintStore::new();
        let (from, to) = (Cell::new(0, 0), Cell::new(0, 1));
        store.add(A, Constraint::Edge { timestep: 2, from, to });
        assert!(store.for_agent(A).forbids_edge(2, from, to));
        assert!(!store.for_agent(A).forbids_edge(2, to, from));
        assert!(!store.for_agent(A).forbids_edge(3, from, to));
    }

    #[test]
    fn goal_constraints_are_open_ended_and_replaced() {
        let mut store = ConstraintStore::new();
        let cell = Cell::new(5, 5);
        store.replace_goal_constraints([GoalConstraint { agent: B, cell, from: 3 }]);
        let view = store.for_agent(B);
        assert!(!view.forbids_vertex(2, cell));
        assert!(view.forbids_vertex(3, cell));
        assert!(view.forbids_vertex(10_000, cell));

        store.replace_goal_constraints(Vec::new());
        assert_eq!(store.goal_constraint_count(), 0);
        assert!(!store.for_agent(B).forbids_vertex(3, cell));
    }

    #[test]
    fn parking_is_blocked_by_later_vertex_constraints() {
        let mut store = ConstraintStore::new();
        let goal = Cell::new(1, 1);
        store.add(A, Constraint::Vertex { timestep: 6, cell: goal });
        let view = store.for_agent(A);
        assert!(view.blocks_parking(goal, 3));
        assert!(!view.blocks_parking(goal, 6));
        assert!(!view.blocks_parking(Cell::new(1, 2), 3));
    }

    #[test]
    fn counts_conflict_and_goal_constraints_apart() {
        let mut store = ConstraintStore::new();
        let c = Cell::new(0, 0);
        store.add(A, Constraint::Vertex { timestep: 5, cell: c });
        store.add(A, Constraint::Edge { timestep: 2, from: c, to: Cell::new(0, 1) });
        store.add(B, Constraint::Vertex { timestep: 1, cell: c });
        store.replace_goal_constraints([
            GoalConstraint { agent: B, cell: c, from: 4 },
            GoalConstraint { agent: B, cell: c, from: 2 },
        ]);
        assert_eq!(store.conflict_constraint_count(), 3);
        assert_eq!(store.goal_constraint_count(), 1);

        store.clear();
        assert_eq!(store.conflict_constraint_count(), 0);
        assert_eq!(store.goal_constraint_count(), 0);
    }
}
