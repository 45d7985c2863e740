pub mod conflict;
pub mod constraints;
pub mod error;
pub mod events;
pub mod goal_occupation;
pub mod grid;
pub mod plan;
pub mod ports;
pub mod scenario;
pub mod search;
pub mod solver;
pub mod types;
pub mod wait_for;

pub use conflict::{Conflict, ConflictKind};
pub use constraints::{AgentConstraints, Constraint, ConstraintStore, GoalConstraint};
pub use error::PlanningError;
pub use events::SolverEvent;
pub use grid::Grid;
pub use plan::{Plan, PlanQuality, PlanViolation};
pub use ports::ScenarioSource;
pub use scenario::Scenario;
pub use search::search;
pub use solver::{CbsSolver, SolverStats};
pub use types::{Agent, AgentId, Cell, Path, Timestep};
pub use wait_for::{WaitCycle, WaitForGraph};
