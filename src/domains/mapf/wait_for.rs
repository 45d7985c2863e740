use super::types::AgentId;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCycle {
    Acyclic,
    /// Agents in cycle order; the last one waits for the first.
    Cycle(Vec<AgentId>),
}

/// Which agent was made to give way to which. An edge `a -> b` means `a`
/// was constrained at least once to resolve a conflict with `b`.
#[derive(Debug, Clone, Default)]
pub struct WaitForGraph {
    graph: DiGraphMap<AgentId, ()>,
}

impl WaitForGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, waiting: AgentId, blocker: AgentId) {
        self.graph.add_edge(waiting, blocker, ());
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }

    /// Depth-first search with an explicit stack. Roots and successors are
    /// visited in agent order so the reported cycle is stable.
    pub fn find_cycle(&self) -> WaitCycle {
        let mut roots: Vec<AgentId> = self.graph.nodes().collect();
        roots.sort();

        let mut visited: HashSet<AgentId> = HashSet::new();
        for root in roots {
            if !visited.insert(root) {
                continue;
            }
            let mut trail = vec![root];
            let mut pending = vec![self.successors(root)];

            while let Some(frame) = pending.last_mut() {
                match frame.pop() {
                    Some(next) => {
                        if let Some(pos) = trail.iter().position(|a| *a == next) {
                            return WaitCycle::Cycle(trail[pos..].to_vec());
                        }
                        if visited.insert(next) {
                            trail.push(next);
                            pending.push(self.successors(next));
                        }
                    }
                    None => {
                        pending.pop();
                        trail.pop();
                    }
                }
            }
        }
        WaitCycle::Acyclic
    }

    // Reverse order so that popping yields ascending ids.
    fn successors(&self, agent: AgentId) -> Vec<AgentId> {
        let mut next: Vec<AgentId> = self.graph.neighbors(agent).collect();
        next.sort_by(|a, b| b.cmp(a));
        next
    }
}
