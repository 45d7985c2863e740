use super::conflict::{self, Conflict};
use super::constraints::ConstraintStore;
use super::error::PlanningError;
use super::events::SolverEvent;
use super::goal_occupation::derive_goal_constraints;
use super::grid::Grid;
use super::plan::{Plan, PlanQuality};
use super::scenario::Scenario;
use super::search::search;
use super::types::{Agent, AgentId, Path};
use super::wait_for::{WaitCycle, WaitForGraph};
use crate::config::SolverConfig;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Size of the bookkeeping left behind by the last `resolve` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    pub conflict_constraints: usize,
    pub goal_constraints: usize,
    pub wait_for_edges: usize,
}

/// Everything one `resolve` call mutates. Grid and agent endpoints are
/// fixed; paths, constraints and bookkeeping change as the loop runs.
#[derive(Debug, Clone)]
struct SolverContext {
    grid: Grid,
    agents: Vec<Agent>,
    constraints: ConstraintStore,
    wait_for: WaitForGraph,
    replans: usize,
}

impl SolverContext {
    fn new(grid: Grid, mut agents: Vec<Agent>) -> Self {
        agents.sort_by_key(|a| a.id);
        Self {
            grid,
            agents,
            constraints: ConstraintStore::new(),
            wait_for: WaitForGraph::new(),
            replans: 0,
        }
    }

    fn reset(&mut self) {
        self.constraints.clear();
        self.wait_for.clear();
        self.replans = 0;
        for agent in &mut self.agents {
            agent.path = Path::default();
        }
    }
}

/// Incremental conflict-based search: one agent at a time is constrained
/// around the earliest conflict until the joint plan is conflict free.
#[derive(Debug, Clone)]
pub struct CbsSolver {
    config: SolverConfig,
    context: SolverContext,
    uncommitted_events: Vec<SolverEvent>,
}

impl CbsSolver {
    pub fn new(grid: Grid, agents: Vec<Agent>, config: SolverConfig) -> Self {
        Self {
            config,
            context: SolverContext::new(grid, agents),
            uncommitted_events: Vec::new(),
        }
    }

    pub fn for_scenario(scenario: &Scenario, config: SolverConfig) -> Self {
        Self::new(scenario.grid.clone(), scenario.agents.clone(), config)
    }

    pub fn stats(&self) -> SolverStats {
        SolverStats {
            conflict_constraints: self.context.constraints.conflict_constraint_count(),
            goal_constraints: self.context.constraints.goal_constraint_count(),
            wait_for_edges: self.context.wait_for.edge_count(),
        }
    }

    pub fn replans(&self) -> usize {
        self.context.replans
    }

    pub fn uncommitted_events(&self) -> &[SolverEvent] {
        &self.uncommitted_events
    }

    pub fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    /// Runs the resolution loop from scratch.
    pub fn resolve(&mut self) -> Result<Plan, PlanningError> {
        self.context.reset();
        let outcome = self.run();
        match &outcome {
            Ok(plan) => {
                info!(
                    makespan = plan.makespan(),
                    sum_of_costs = plan.sum_of_costs(),
                    replans = self.context.replans,
                    "conflict-free plan found"
                );
                self.add_event(SolverEvent::PlanFound {
                    makespan: plan.makespan(),
                    sum_of_costs: plan.sum_of_costs(),
                    replans: self.context.replans,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                warn!(replans = self.context.replans, "planning failed: {}", e);
                self.add_event(SolverEvent::SolveFailed {
                    reason: e.to_string(),
                    replans: self.context.replans,
                    timestamp: Utc::now(),
                });
            }
        }
        outcome
    }

    /// Current paths marked as not conflict free, once every agent has one.
    pub fn best_effort_plan(&self) -> Option<Plan> {
        let agents = &self.context.agents;
        if agents.is_empty() || agents.iter().any(|a| a.path.is_empty()) {
            return None;
        }
        Some(Plan::new(agents, PlanQuality::BestEffort))
    }

    fn run(&mut self) -> Result<Plan, PlanningError> {
        for index in 0..self.context.agents.len() {
            let id = self.context.agents[index].id;
            let path = self
                .plan_agent(index)
                .ok_or(PlanningError::NoInitialPath { agent: id })?;
            debug!(agent = %id, length = path.len(), "initial path");
            self.add_event(SolverEvent::InitialPathFound {
                agent: id,
                length: path.len(),
                timestamp: Utc::now(),
            });
            self.context.agents[index].path = path;
        }

        self.apply_goal_occupation()?;

        loop {
            let horizon = conflict::horizon(&self.context.agents);
            let Some(conflict) = conflict::detect(&self.context.agents, horizon) else {
                return Ok(Plan::new(&self.context.agents, PlanQuality::ConflictFree));
            };
            debug!(%conflict, "conflict detected");
            self.add_event(SolverEvent::ConflictDetected {
                conflict,
                timestamp: Utc::now(),
            });

            self.split(&conflict)?;

            self.context.replans += 1;
            if self.context.replans > self.config.replan_limit {
                let cycle = match self.context.wait_for.find_cycle() {
                    WaitCycle::Cycle(agents) => Some(agents),
                    WaitCycle::Acyclic => None,
                };
                return Err(PlanningError::ReplanBudgetExceeded {
                    replans: self.context.replans,
                    cycle,
                });
            }

            self.apply_goal_occupation()?;
        }
    }

    /// Constrains the preferred agent, falling back to the other one.
    fn split(&mut self, conflict: &Conflict) -> Result<(), PlanningError> {
        let preferred = self.preferred_agent(conflict);
        for agent in [preferred, conflict.other(preferred)] {
            if self.try_branch(agent, conflict) {
                self.context.wait_for.record(agent, conflict.other(agent));
                return Ok(());
            }
        }
        Err(PlanningError::UnresolvableConflict {
            first: conflict.first,
            second: conflict.second,
            timestep: conflict.timestep,
            kind: conflict.kind,
        })
    }

    /// The agent with the shorter path gives way; ties go to `first`.
    fn preferred_agent(&self, conflict: &Conflict) -> AgentId {
        let len = |id: AgentId| self.context.agents[self.slot(id)].path.len();
        if len(conflict.second) < len(conflict.first) {
            conflict.second
        } else {
            conflict.first
        }
    }

    fn try_branch(&mut self, agent: AgentId, conflict: &Conflict) -> bool {
        let constraint = conflict.constraint_for(agent);
        let added = self.context.constraints.add(agent, constraint);
        self.add_event(SolverEvent::ConstraintAdded {
            agent,
            constraint,
            timestamp: Utc::now(),
        });

        let slot = self.slot(agent);
        match self.plan_agent(slot) {
            Some(path) => {
                debug!(agent = %agent, %constraint, length = path.len(), "replanned");
                self.add_event(SolverEvent::AgentReplanned {
                    agent,
                    length: path.len(),
                    timestamp: Utc::now(),
                });
                self.context.agents[slot].path = path;
                true
            }
            None => {
                if added {
                    self.context.constraints.remove(agent, &constraint);
                }
                debug!(agent = %agent, %constraint, "no path, rolling back");
                self.add_event(SolverEvent::ConstraintRolledBack {
                    agent,
                    constraint,
                    timestamp: Utc::now(),
                });
                false
            }
        }
    }

    /// Re-derives goal-occupation constraints from the current paths and
    /// replans the whole fleet under them.
    fn apply_goal_occupation(&mut self) -> Result<(), PlanningError> {
        let derived = derive_goal_constraints(&self.context.agents);
        self.add_event(SolverEvent::GoalConstraintsDerived {
            count: derived.len(),
            timestamp: Utc::now(),
        });
        self.context.constraints.replace_goal_constraints(derived);

        for index in 0..self.context.agents.len() {
            let id = self.context.agents[index].id;
            let path = self
                .plan_agent(index)
                .ok_or(PlanningError::NoPathAfterGoalOccupation { agent: id })?;
            self.context.agents[index].path = path;
        }
        Ok(())
    }

    /// Position of `id` in the id-sorted agent list.
    fn slot(&self, id: AgentId) -> usize {
        self.context.agents.partition_point(|a| a.id < id)
    }

    fn plan_agent(&self, index: usize) -> Option<Path> {
        let agent = &self.context.agents[index];
        search(
            &self.context.grid,
            agent,
            self.context.constraints.for_agent(agent.id),
            self.config.max_timesteps,
        )
    }

    fn add_event(&mut self, event: SolverEvent) {
        self.uncommitted_events.push(event);
    }
}
