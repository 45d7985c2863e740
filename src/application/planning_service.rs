use crate::common::{ApplicationResult, DomainError, EventEnvelope};
use crate::config::SolverConfig;
use crate::domains::logger::DynLogger;
use crate::domains::mapf::{
    CbsSolver, Plan, PlanningError, Scenario, ScenarioSource, SolverEvent, SolverStats,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Process exit status of a run that ended without a plan.
pub const EXIT_NO_PLAN: u8 = 1;
/// Process exit status for bad configuration, arguments or scenario input.
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    Solved {
        plan: Plan,
    },
    Failed {
        error: PlanningError,
        /// Last computed paths, not conflict free.
        best_effort: Option<Plan>,
    },
}

/// Result of one solver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub run_id: Uuid,
    pub scenario: String,
    pub outcome: SolveOutcome,
    pub replans: usize,
    #[serde(default)]
    pub stats: SolverStats,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventEnvelope>,
}

impl SolveReport {
    pub fn plan(&self) -> Option<&Plan> {
        match &self.outcome {
            SolveOutcome::Solved { plan } => Some(plan),
            SolveOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&PlanningError> {
        match &self.outcome {
            SolveOutcome::Solved { .. } => None,
            SolveOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.plan().is_some()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_solved() {
            0
        } else {
            EXIT_NO_PLAN
        }
    }
}

/// Loads scenarios, runs the solver and reports progress to a logger.
#[derive(Clone)]
pub struct PlanningService {
    scenarios: Arc<dyn ScenarioSource>,
    logger: DynLogger,
    solver: SolverConfig,
}

impl PlanningService {
    pub fn new(scenarios: Arc<dyn ScenarioSource>, logger: DynLogger, solver: SolverConfig) -> Self {
        Self {
            scenarios,
            logger,
            solver,
        }
    }

    pub fn list_scenarios(&self) -> ApplicationResult<Vec<String>> {
        Ok(self.scenarios.list_scenarios()?)
    }

    pub fn load_scenario(&self, name: &str) -> ApplicationResult<Scenario> {
        Ok(self.scenarios.load_scenario(name)?)
    }

    pub fn solve_named(&self, name: &str) -> ApplicationResult<SolveReport> {
        let scenario = self.load_scenario(name)?;
        self.solve(&scenario)
    }

    /// Runs the solver to completion. Planning failures are part of the
    /// report, not errors.
    pub fn solve(&self, scenario: &Scenario) -> ApplicationResult<SolveReport> {
        let run_id = Uuid::new_v4();
        info!(%run_id, scenario = %scenario.name, agents = scenario.agents.len(), "solving");
        self.logger.info(&format!(
            "Solving '{}': {} agents on a {}x{} grid",
            scenario.name,
            scenario.agents.len(),
            scenario.grid.rows(),
            scenario.grid.cols()
        ));

        let started = Instant::now();
        let mut solver = CbsSolver::for_scenario(scenario, self.solver);
        let result = solver.resolve();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let events = self.drain_events(&mut solver, run_id)?;
        let outcome = match result {
            Ok(plan) => SolveOutcome::Solved { plan },
            Err(error) => SolveOutcome::Failed {
                best_effort: solver.best_effort_plan(),
                error,
            },
        };

        Ok(SolveReport {
            run_id,
            scenario: scenario.name.clone(),
            outcome,
            replans: solver.replans(),
            stats: solver.stats(),
            elapsed_ms,
            events,
        })
    }

    fn drain_events(&self, solver: &mut CbsSolver, run_id: Uuid) -> ApplicationResult<Vec<EventEnvelope>> {
        let mut envelopes = Vec::with_capacity(solver.uncommitted_events().len());
        for (sequence, event) in solver.uncommitted_events().iter().enumerate() {
            self.narrate(event);
            envelopes.push(EventEnvelope::new(event, run_id, sequence as u64).map_err(DomainError::from)?);
        }
        solver.mark_events_as_committed();
        Ok(envelopes)
    }

    fn narrate(&self, event: &SolverEvent) {
        match event {
            SolverEvent::InitialPathFound { agent, length, .. } => self
                .logger
                .info(&format!("Agent {} path found ({} steps)", agent, length.saturating_sub(1))),
            SolverEvent::ConflictDetected { conflict, .. } => self.logger.info(&format!(
                "Conflict detected between agent {} and agent {} at step {}",
                conflict.first, conflict.second, conflict.timestep
            )),
            SolverEvent::PlanFound {
                makespan,
                sum_of_costs,
                replans,
                ..
            } => self.logger.info(&format!(
                "Plan found: makespan {}, sum of costs {}, {} replans",
                makespan, sum_of_costs, replans
            )),
            SolverEvent::SolveFailed { reason, .. } => self.logger.error(reason),
            SolverEvent::GoalConstraintsDerived { .. }
            | SolverEvent::ConstraintAdded { .. }
            | SolverEvent::ConstraintRolledBack { .. }
            | SolverEvent::AgentReplanned { .. } => {}
        }
    }
}
