use super::constraints::GoalConstraint;
use super::types::Agent;

/// For each agent parked on its goal from `t_goal`, forbid that cell to
/// every other agent from `t_goal` onward. Always derived from the current
/// paths; callers replace the previous set rather than merging.
pub fn derive_goal_constraints(agents: &[Agent]) -> Vec<GoalConstraint> {
    agents
        .iter()
        .filter_map(|parked| parked.arrival().map(|t_goal| (parked, t_goal)))
        .flat_map(|(parked, t_goal)| {
            agents
                .iter()
                .filter(move |other| other.id != parked.id)
                .map(move |other| GoalConstraint {
                    agent: other.id,
                    cell: parked.goal,
                    from: t_goal,
                })
        })
        .collect()
}
