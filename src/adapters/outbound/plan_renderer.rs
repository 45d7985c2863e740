use crate::domains::logger::DynLogger;
use crate::domains::mapf::grid::{FREE, WALL};
use crate::domains::mapf::{Cell, Grid, Plan, PlanViolation, Timestep};

/// Marks an unoccupied goal cell.
pub const GOAL: char = '+';
/// Agents past `Z`.
pub const UNNAMED_AGENT: char = '*';

/// Text rendering of a plan over its grid, one frame per timestep.
pub struct PlanRenderer<'a> {
    grid: &'a Grid,
}

impl<'a> PlanRenderer<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The grid at `t`, parked agents included. Cells are space separated.
    pub fn render_timestep(&self, plan: &Plan, t: Timestep) -> String {
        let mut out = String::new();
        for row in 0..self.grid.rows() {
            let line: Vec<String> = (0..self.grid.cols())
                .map(|col| self.symbol(plan, Cell::new(row as i32, col as i32), t).to_string())
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// One line per agent: `A: (1, 1) -> (1, 2) -> ...`.
    pub fn describe_paths(&self, plan: &Plan) -> Vec<String> {
        plan.agents()
            .iter()
            .map(|agent| {
                let cells: Vec<String> = agent.path.cells().iter().map(Cell::to_string).collect();
                format!("{}: {}", agent.id, cells.join(" -> "))
            })
            .collect()
    }

    /// Every frame from t=0 to the makespan with arrival notes and
    /// warnings, sent to `logger`.
    pub fn narrate(&self, plan: &Plan, logger: &DynLogger) {
        let violations = plan.verify();
        for t in 0..=plan.makespan() {
            logger.info(&format!("Timestep {}:\n{}", t, self.render_timestep(plan, t)));

            for agent in plan.agents() {
                if plan.arrival_time(agent.id) == Some(t) {
                    logger.info(&format!("Agent {} reached its goal at timestep {}", agent.id, t));
                }
            }

            for violation in violations.iter().filter(|v| violation_timestep(v) == t) {
                logger.warn(&describe_violation(violation));
            }
        }
    }

    fn symbol(&self, plan: &Plan, cell: Cell, t: Timestep) -> char {
        if self.grid.is_wall(cell) {
            return WALL;
        }
        if let Some(agent) = plan
            .agents()
            .iter()
            .rev()
            .find(|a| a.path.at(t) == Some(cell))
        {
            return agent.id.letter().unwrap_or(UNNAMED_AGENT);
        }
        if plan.agents().iter().any(|a| a.goal == cell) {
            return GOAL;
        }
        FREE
    }
}

fn violation_timestep(violation: &PlanViolation) -> Timestep {
    match violation {
        PlanViolation::Conflict(c) => c.timestep,
        PlanViolation::GoalIntrusion { timestep, .. } => *timestep,
    }
}

fn describe_violation(violation: &PlanViolation) -> String {
    match violation {
        PlanViolation::Conflict(c) => format!("Agents {} and {} collide: {}", c.first, c.second, c.kind),
        PlanViolation::GoalIntrusion {
            parked,
            intruder,
            timestep,
            ..
        } => format!(
            "Agent {} moves onto Agent {}'s finished goal at timestep {}",
            intruder, parked, timestep
        ),
    }
}
