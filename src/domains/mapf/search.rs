use super::constraints::AgentConstraints;
use super::grid::Grid;
use super::types::{Agent, Cell, Path, Timestep};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Arena slot. `parent` indexes into the same arena.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: Cell,
    g: usize,
    timestep: Timestep,
    parent: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
struct OpenEntry {
    f: usize,
    h: usize,
    cell: Cell,
    timestep: Timestep,
    node: usize,
}

// BinaryHeap is a max-heap; reverse everything so the smallest key pops first.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.cell.cmp(&self.cell))
            .then_with(|| other.timestep.cmp(&self.timestep))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path for `agent` through the space-time graph under its
/// constraints, or `None` when the goal cannot be reached by `max_timesteps`.
///
/// Every action (four moves and wait) costs one timestep, so `g` equals the
/// timestep and a (cell, timestep) pair is generated at most once. The goal
/// is only accepted at a timestep from which the agent may stay there.
///
/// Ties on `f` go to the smaller heuristic, then the lowest row and column,
/// then the earliest timestep.
pub fn search(
    grid: &Grid,
    agent: &Agent,
    constraints: AgentConstraints<'_>,
    max_timesteps: Timestep,
) -> Option<Path> {
    let (start, goal) = (agent.start, agent.goal);
    if !grid.is_reachable(start, goal) {
        return None;
    }

    let mut arena: Vec<SearchNode> = Vec::new();
    let mut generated: HashSet<(Cell, Timestep)> = HashSet::new();
    let mut open = BinaryHeap::new();

    arena.push(SearchNode {
        cell: start,
        g: 0,
        timestep: 0,
        parent: None,
    });
    generated.insert((start, 0));
    let h = start.manhattan(goal);
    open.push(OpenEntry {
        f: h,
        h,
        cell: start,
        timestep: 0,
        node: 0,
    });

    while let Some(entry) = open.pop() {
        let current = arena[entry.node];

        if current.cell == goal && !constraints.blocks_parking(goal, current.timestep) {
            return Some(reconstruct(&arena, entry.node));
        }

        let next_t = current.timestep + 1;
        if next_t > max_timesteps {
            continue;
        }

        for next in current.cell.successors() {
            if !grid.passable(next)
                || constraints.forbids_vertex(next_t, next)
                || constraints.forbids_edge(next_t, current.cell, next)
            {
                continue;
            }
            let h = next.manhattan(goal);
            if next_t + h > max_timesteps || !generated.insert((next, next_t)) {
                continue;
            }
            let g = current.g + 1;
            arena.push(SearchNode {
                cell: next,
                g,
                timestep: next_t,
                parent: Some(entry.node),
            });
            open.push(OpenEntry {
                f: g + h,
                h,
                cell: next,
                timestep: next_t,
                node: arena.len() - 1,
            });
        }
    }

    None
}

fn reconstruct(arena: &[SearchNode], mut index: usize) -> Path {
    let mut cells = vec![arena[index].cell];
    while let Some(parent) = arena[index].parent {
        cells.push(arena[parent].cell);
        index = parent;
    }
    cells.reverse();
    Path::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::mapf::constraints::{Constraint, ConstraintStore, GoalConstraint};
    use crate::domains::mapf::types::AgentId;

    fn agent(start: (i32, i32), goal: (i32, i32)) -> Agent {
        Agent::new(AgentId(0), start.into(), goal.into())
    }

    #[test]
    fn finds_a_manhattan_path_on_an_open_grid() {
        let grid = Grid::open(5, 5);
        let store = ConstraintStore::new();
        let a = agent((0, 0), (3, 4));
        let path = search(&grid, &a, store.for_agent(a.id), 50).unwrap();
        assert_eq!(path.len(), 8);
        assert_eq!(path.at(0), Some(a.start));
        assert_eq!(path.at(7), Some(a.goal));
        for w in path.cells().windows(2) {
            assert_eq!(w[0].manhattan(w[1]), 1);
        }
    }

    #[test]
    fn start_on_goal_is_a_single_cell_path() {
        let grid = Grid::open(3, 3);
        let store = ConstraintStore::new();
        let a = agent((1, 1), (1, 1));
        let path = search(&grid, &a, store.for_agent(a.id), 10).unwrap();
        assert_eq!(path.cells(), &[Cell::new(1, 1)]);
    }

    #[test]
    fn waits_out_a_vertex_constraint_in_a_corridor() {
        let grid = Grid::from_rows(&["....."]).unwrap();
        let mut store = ConstraintStore::new();
        let a = agent((0, 0), (0, 4));
        store.add(
            a.id,
            Constraint::Vertex {
                timestep: 2,
                cell: Cell::new(0, 2),
            },
        );
        let path = search(&grid, &a, store.for_agent(a.id), 20).unwrap();
        assert_eq!(path.len(), 6);
        assert_ne!(path.at(2), Some(Cell::new(0, 2)));
    }

    #[test]
    fn respects_edge_constraints() {
        let grid = Grid::from_rows(&["..", ".."]).unwrap();
        let mut store = ConstraintStore::new();
        let a = agent((0, 0), (0, 1));
        store.add(
            a.id,
            Constraint::Edge {
                timestep: 1,
                from: Cell::new(0, 0),
                to: Cell::new(0, 1),
            },
        );
        let path = search(&grid, &a, store.for_agent(a.id), 10).unwrap();
        assert_eq!(path.len(), 3);
        assert_ne!(path.at(1), Some(Cell::new(0, 1)));
    }

    #[test]
    fn does_not_park_before_a_later_goal_constraint() {
        let grid = Grid::open(3, 3);
        let mut store = ConstraintStore::new();
        let a = agent((0, 0), (0, 1));
        store.add(
            a.id,
            Constraint::Vertex {
                timestep: 4,
                cell: Cell::new(0, 1),
            },
        );
        let path = search(&grid, &a, store.for_agent(a.id), 20).unwrap();
        assert_eq!(path.arrival(a.goal), Some(5));
        assert_ne!(path.at(4), Some(a.goal));
    }

    #[test]
    fn permanently_occupied_goal_is_not_found() {
        let grid = Grid::open(3, 3);
        let mut store = ConstraintStore::new();
        let a = agent((0, 0), (2, 2));
        store.replace_goal_constraints([GoalConstraint {
            agent: a.id,
            cell: a.goal,
            from: 3,
        }]);
        assert!(search(&grid, &a, store.for_agent(a.id), 30).is_none());
    }

    #[test]
    fn unreachable_goal_and_short_horizon_are_not_found() {
        let grid = Grid::from_rows(&[".#.", "###", "..."]).unwrap();
        let store = ConstraintStore::new();
        let walled = agent((0, 0), (2, 2));
        assert!(search(&grid, &walled, store.for_agent(walled.id), 50).is_none());

        let open = Grid::open(1, 6);
        let far = agent((0, 0), (0, 5));
        assert!(search(&open, &far, store.for_agent(far.id), 4).is_none());
        assert!(search(&open, &far, store.for_agent(far.id), 5).is_some());
    }

    #[test]
    fn repeated_searches_return_the_same_straight_path() {
        let grid = Grid::open(3, 3);
        let store = ConstraintStore::new();
        let a = agent((1, 0), (1, 2));
        let first = search(&grid, &a, store.for_agent(a.id), 10).unwrap();
        let second = search(&grid, &a, store.for_agent(a.id), 10).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.cells(), &[Cell::new(1, 0), Cell::new(1, 1), Cell::new(1, 2)]);
    }
}
