use serde::{Deserialize, Serialize};
use std::fmt;

pub type Timestep = usize;

/// A grid cell addressed by row and column. Signed so that neighbour
/// arithmetic can step outside the grid; the grid decides validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const MIN: Cell = Cell {
        row: i32::MIN,
        col: i32::MIN,
    };
    pub const MAX: Cell = Cell {
        row: i32::MAX,
        col: i32::MAX,
    };

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(&self, other: Cell) -> usize {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as usize
    }

    /// Up, down, left, right.
    pub fn neighbours(&self) -> [Cell; 4] {
        [
            Cell::new(self.row - 1, self.col),
            Cell::new(self.row + 1, self.col),
            Cell::new(self.row, self.col - 1),
            Cell::new(self.row, self.col + 1),
        ]
    }

    /// The four moves followed by waiting in place.
    pub fn successors(&self) -> [Cell; 5] {
        let [up, down, left, right] = self.neighbours();
        [up, down, left, right, *self]
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Cell::new(row, col)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Agent identity. Agents are numbered in provisioning order and shown as
/// letters (A, B, ...) the way scenarios label them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub usize);

impl AgentId {
    /// Single character label, `None` past `Z`.
    pub fn letter(&self) -> Option<char> {
        u8::try_from(self.0)
            .ok()
            .filter(|n| *n < 26)
            .map(|n| (b'A' + n) as char)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "agent-{}", self.0),
        }
    }
}

/// Cells indexed by timestep. Past its last entry a path is read as
/// staying on its final cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Cell>);

impl Path {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Timestep of the final explicit cell.
    pub fn last_timestep(&self) -> Timestep {
        self.0.len().saturating_sub(1)
    }

    /// Position at `t`, padded with the final cell.
    pub fn at(&self, t: Timestep) -> Option<Cell> {
        self.0.get(t).or_else(|| self.0.last()).copied()
    }

    /// First timestep from which the path stays on `goal` for good.
    pub fn arrival(&self, goal: Cell) -> Option<Timestep> {
        if self.0.last() != Some(&goal) {
            return None;
        }
        let away = self.0.iter().rposition(|c| *c != goal);
        Some(away.map_or(0, |i| i + 1))
    }
}

impl From<Vec<Cell>> for Path {
    fn from(cells: Vec<Cell>) -> Self {
        Path::new(cells)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub start: Cell,
    pub goal: Cell,
    #[serde(default)]
    pub path: Path,
}

impl Agent {
    pub fn new(id: AgentId, start: Cell, goal: Cell) -> Self {
        Self {
            id,
            start,
            goal,
            path: Path::default(),
        }
    }

    pub fn arrival(&self) -> Option<Timestep> {
        self.path.arrival(self.goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_padded_with_its_last_cell() {
        let path = Path::new(vec![Cell::new(0, 0), Cell::new(0, 1)]);
        assert_eq!(path.at(1), Some(Cell::new(0, 1)));
        assert_eq!(path.at(40), Some(Cell::new(0, 1)));
        assert_eq!(Path::default().at(0), None);
    }

    #[test]
    fn arrival_ignores_earlier_visits_to_the_goal() {
        let goal = Cell::new(1, 1);
        let path = Path::new(vec![goal, Cell::new(1, 2), goal, goal]);
        assert_eq!(path.arrival(goal), Some(2));
        assert_eq!(Path::new(vec![goal]).arrival(goal), Some(0));
        assert_eq!(path.arrival(Cell::new(1, 2)), None);
    }

    #[test]
    fn agent_ids_render_as_letters() {
        assert_eq!(AgentId(0).to_string(), "A");
        assert_eq!(AgentId(25).to_string(), "Z");
        assert_eq!(AgentId(26).to_string(), "agent-26");
    }
}
