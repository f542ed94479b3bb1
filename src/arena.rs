//! Arena: the grid of locked cells. Collision test, merge, line sweep and garbage rows.

use crate::piece::{Cell, Matrix};
use rand::Rng;
use std::collections::VecDeque;

pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 20;

/// Active piece: its matrix plus the arena position of the matrix's top-left cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub matrix: Matrix,
    pub x: i32,
    pub y: i32,
}

impl Player {
    /// Arena coordinates of every block: (column, row, cell).
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.matrix
            .blocks()
            .map(|(px, py, cell)| (self.x + px as i32, self.y + py as i32, cell))
    }
}

/// Grid of locked cells. rows[0] is top; every row has exactly `width` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
}

impl Arena {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: (0..height).map(|_| vec![Cell::Empty; width]).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y), or None outside the grid (including above row 0).
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of non-empty cells.
    #[cfg(test)]
    pub fn filled_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| !c.is_empty()).count())
            .sum()
    }

    /// True if any block of `player` is off the grid or overlaps a locked cell.
    pub fn collides(&self, player: &Player) -> bool {
        player
            .cells()
            .any(|(x, y, _)| !matches!(self.get(x, y), Some(Cell::Empty)))
    }

    /// Write the player's blocks into the grid.
    pub fn merge(&mut self, player: &Player) {
        for (x, y, cell) in player.cells() {
            debug_assert!(
                self.get(x, y).is_some(),
                "merging a block outside the arena at ({x}, {y})"
            );
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
                self.set(x, y, cell);
            }
        }
    }

    /// Remove every full row and refill from the top with empty rows.
    /// Returns the pre-sweep indices of the removed rows, bottom first.
    pub fn sweep(&mut self) -> Vec<usize> {
        let full: Vec<usize> = (0..self.height)
            .rev()
            .filter(|&y| self.rows[y].iter().all(|c| !c.is_empty()))
            .collect();
        if full.is_empty() {
            return full;
        }
        self.rows.retain(|row| row.iter().any(|c| c.is_empty()));
        for _ in 0..full.len() {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        debug_assert_eq!(self.rows.len(), self.height);
        debug_assert!(self.rows.iter().all(|row| row.len() == self.width));
        full
    }

    /// Push up to `count` garbage rows from the bottom, each with one random hole.
    /// The top row is discarded for every row inserted. Returns the rows inserted.
    pub fn push_garbage<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        let count = count.min(self.height);
        for _ in 0..count {
            self.rows.pop_front();
            let mut row = vec![Cell::Garbage; self.width];
            row[rng.random_range(0..self.width)] = Cell::Empty;
            self.rows.push_back(row);
        }
        debug_assert_eq!(self.rows.len(), self.height);
        count
    }

    /// Fill row `y` with `cell`, leaving the listed columns empty.
    #[cfg(test)]
    pub fn fill_row_except(&mut self, y: usize, holes: &[usize], cell: Cell) {
        for x in 0..self.width {
            let value = if holes.contains(&x) { Cell::Empty } else { cell };
            self.set(x, y, value);
        }
    }
}
