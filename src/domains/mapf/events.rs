use super::conflict::Conflict;
use super::constraints::Constraint;
use super::types::{AgentId, Timestep};
use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SolverEvent {
    InitialPathFound {
        agent: AgentId,
        length: usize,
        timestamp: DateTime<Utc>,
    },
    GoalConstraintsDerived {
        count: usize,
        timestamp: DateTime<Utc>,
    },
    ConflictDetected {
        conflict: Conflict,
        timestamp: DateTime<Utc>,
    },
    ConstraintAdded {
        agent: AgentId,
        constraint: Constraint,
        timestamp: DateTime<Utc>,
    },
    ConstraintRolledBack {
        agent: AgentId,
        constraint: Constraint,
        timestamp: DateTime<Utc>,
    },
    AgentReplanned {
        agent: AgentId,
        length: usize,
        timestamp: DateTime<Utc>,
    },
    PlanFound {
        makespan: Timestep,
        sum_of_costs: usize,
        replans: usize,
        timestamp: DateTime<Utc>,
    },
    SolveFailed {
        reason: String,
        replans: usize,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for SolverEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SolverEvent::InitialPathFound { .. } => "InitialPathFound",
            SolverEvent::GoalConstraintsDerived { .. } => "GoalConstraintsDerived",
            SolverEvent::ConflictDetected { .. } => "ConflictDetected",
            SolverEvent::ConstraintAdded { .. } => "ConstraintAdded",
            SolverEvent::ConstraintRolledBack { .. } => "ConstraintRolledBack",
            SolverEvent::AgentReplanned { .. } => "AgentReplanned",
            SolverEvent::PlanFound { .. } => "PlanFound",
            SolverEvent::SolveFailed { .. } => "SolveFailed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SolverEvent::InitialPathFound { timestamp, .. }
            | SolverEvent::GoalConstraintsDerived { timestamp, .. }
            | SolverEvent::ConflictDetected { timestamp, .. }
            | SolverEvent::ConstraintAdded { timestamp, .. }
            | SolverEvent::ConstraintRolledBack { timestamp, .. }
            | SolverEvent::AgentReplanned { timestamp, .. }
            | SolverEvent::PlanFound { timestamp, .. }
            | SolverEvent::SolveFailed { timestamp, .. } => *timestamp,
        }
    }
}
