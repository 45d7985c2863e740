use super::types::Cell;
use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

pub const FREE: char = '.';
pub const WALL: char = '#';

/// Static passability map. Serialized as rows of `.` and `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
}

impl Grid {
    /// A grid without walls.
    pub fn open(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            walls: vec![false; rows * cols],
        }
    }

    pub fn from_rows<S: AsRef<str>>(lines: &[S]) -> DomainResult<Self> {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.as_ref().chars().count());
        if rows == 0 || cols == 0 {
            return Err(DomainError::invalid("grid has no cells"));
        }

        let mut walls = Vec::with_capacity(rows * cols);
        for (r, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != cols {
                return Err(DomainError::invalid(format!(
                    "grid row {} has {} cells, expected {}",
                    r,
                    line.chars().count(),
                    cols
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                match ch {
                    FREE => walls.push(false),
                    WALL => walls.push(true),
                    other => {
                        return Err(DomainError::invalid(format!(
                            "unexpected character '{}' at ({}, {})",
                            other, r, c
                        )))
                    }
                }
            }
        }
        Ok(Self { rows, cols, walls })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < self.rows
            && (cell.col as usize) < self.cols
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.walls[i])
    }

    /// In bounds and not a wall.
    pub fn passable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| !self.walls[i])
    }

    pub fn passable_neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        cell.neighbours().into_iter().filter(|n| self.passable(*n))
    }

    /// 4-connected reachability ignoring time and other agents.
    pub fn is_reachable(&self, from: Cell, to: Cell) -> bool {
        if !self.passable(from) || !self.passable(to) {
            return false;
        }
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(cell) = queue.pop_front() {
            if cell == to {
                return true;
            }
            for next in self.passable_neighbours(cell) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    pub fn to_rows(&self) -> Vec<String> {
        self.walls
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(|w| if *w { WALL } else { FREE }).collect())
            .collect()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.row as usize * self.cols + cell.col as usize)
    }
}

impl TryFrom<Vec<String>> for Grid {
    type Error = DomainError;

    fn try_from(lines: Vec<String>) -> Result<Self, Self::Error> {
        Grid::from_rows(&lines)
    }
}

impl From<Grid> for Vec<String> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_walls_and_bounds() {
        let grid = Grid::from_rows(&["..#", "#.."]).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert!(grid.is_wall(Cell::new(0, 2)));
        assert!(grid.passable(Cell::new(1, 1)));
        assert!(!grid.passable(Cell::new(-1, 0)));
        assert!(!grid.passable(Cell::new(2, 0)));
        assert_eq!(grid.to_rows(), vec!["..#", "#.."]);
    }

    #[test]
    fn rejects_ragged_rows_and_unknown_characters() {
        assert!(Grid::from_rows(&["...", ".."]).is_err());
        assert!(Grid::from_rows(&[".x."]).is_err());
        assert!(Grid::from_rows::<&str>(&[]).is_err());
    }

    #[test]
    fn reachability_respects_walls() {
        let grid = Grid::from_rows(&["...", "###", "..."]).unwrap();
        assert!(grid.is_reachable(Cell::new(0, 0), Cell::new(0, 2)));
        assert!(!grid.is_reachable(Cell::new(0, 0), Cell::new(2, 0)));
    }
}
