use super::conflict::ConflictKind;
use super::types::{AgentId, Timestep};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcomes of the resolution loop other than a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanningError {
    #[error("Agent {agent} has no path to its goal")]
    NoInitialPath { agent: AgentId },

    #[error("Agent {agent} has no path once parked goals are kept clear")]
    NoPathAfterGoalOccupation { agent: AgentId },

    #[error("Neither agent {first} nor agent {second} can be rerouted around the {kind} at t={timestep}")]
    UnresolvableConflict {
        first: AgentId,
        second: AgentId,
        timestep: Timestep,
        kind: ConflictKind,
    },

    #[error("Replan budget exceeded after {replans} replans; possibly unsolvable under the current model")]
    ReplanBudgetExceeded {
        replans: usize,
        /// Agents that kept giving way to each other, if any did.
        cycle: Option<Vec<AgentId>>,
    },
}

impl PlanningError {
    /// Agents named by the failure.
    pub fn agents(&self) -> Vec<AgentId> {
        match self {
            PlanningError::NoInitialPath { agent }
            | PlanningError::NoPathAfterGoalOccupation { agent } => vec![*agent],
            PlanningError::UnresolvableConflict { first, second, .. } => vec![*first, *second],
            PlanningError::ReplanBudgetExceeded { cycle, .. } => cycle.clone().unwrap_or_default(),
        }
    }
}
