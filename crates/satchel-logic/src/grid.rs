//! Occupancy store for the backpack grid.
//!
//! `Grid` holds a fixed `rows × cols` matrix of cell states plus the
//! authoritative map from each placed item to the absolute cells it covers.
//! It performs no validation on writes: `commit_placement` is only called by
//! the placement layer after it has checked bounds and collisions.

use crate::config::PackConfig;
use crate::error::PackError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Engine-assigned handle for an item. Stable for the item's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Absolute grid coordinate. Signed so that anchor + offset arithmetic can
/// land outside the grid and be reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Up, down, left, right. Saturates at the `i32` limits.
    pub fn orthogonal_neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.row.saturating_sub(1), self.col),
            Cell::new(self.row.saturating_add(1), self.col),
            Cell::new(self.row, self.col.saturating_sub(1)),
            Cell::new(self.row, self.col.saturating_add(1)),
        ]
    }

    pub fn is_orthogonal_to(self, other: Cell) -> bool {
        matches!(
            (self.row.abs_diff(other.row), self.col.abs_diff(other.col)),
            (0, 1) | (1, 0)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub unlocked: bool,
    pub occupant: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Cell,
    pub cells: Vec<Cell>,
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell states.
    pub cells: Vec<CellState>,
    pub items: BTreeMap<ItemId, Vec<Cell>>,
}

impl GridSnapshot {
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellState> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
    placements: BTreeMap<ItemId, Placement>,
}

impl Grid {
    /// All cells locked.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellState::default(); rows * cols],
            placements: BTreeMap::new(),
        }
    }

    /// Grid sized by `config` with its initial rectangle unlocked.
    pub fn from_config(config: &PackConfig) -> Self {
        let mut grid = Self::new(config.rows, config.cols);
        let area = config.initial_unlocked;
        for row in area.top..area.top + area.height {
            for col in area.left..area.left + area.width {
                if let Some(state) = grid.state_mut(Cell::new(row as i32, col as i32)) {
                    state.unlocked = true;
                }
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.row as usize * self.cols + cell.col as usize)
        } else {
            None
        }
    }

    fn state_mut(&mut self, cell: Cell) -> Option<&mut CellState> {
        let idx = self.index(cell)?;
        self.cells.get_mut(idx)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < self.rows
            && (cell.col as usize) < self.cols
    }

    /// Occupant recorded in the cell matrix, if any.
    pub fn cell_at(&self, cell: Cell) -> Option<ItemId> {
        self.index(cell).and_then(|i| self.cells[i].occupant)
    }

    /// Out-of-bounds cells count as locked.
    pub fn is_unlocked(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i].unlocked)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.cell_at(cell).is_some()
    }

    /// Reverse lookup through the item→cells map.
    pub fn item_at(&self, cell: Cell) -> Option<ItemId> {
        self.placements
            .iter()
            .find(|(_, p)| p.cells.contains(&cell))
            .map(|(&id, _)| id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.placements.contains_key(&id)
    }

    pub fn occupied_cells(&self, id: ItemId) -> Option<&[Cell]> {
        self.placements.get(&id).map(|p| p.cells.as_slice())
    }

    pub fn anchor_of(&self, id: ItemId) -> Option<Cell> {
        self.placements.get(&id).map(|p| p.anchor)
    }

    pub fn placement(&self, id: ItemId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    pub fn placed_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.placements.keys().copied()
    }

    pub fn item_count(&self) -> usize {
        self.placements.len()
    }

    pub fn unlocked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.unlocked).count()
    }

    /// Every in-bounds cell, row-major.
    pub fn all_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Cell::new(r as i32, c as i32)))
    }

    /// Write `id` into every cell and record the mapping. No checks.
    pub fn commit_placement(&mut self, id: ItemId, anchor: Cell, cells: Vec<Cell>) {
        for &cell in &cells {
            if let Some(state) = self.state_mut(cell) {
                state.occupant = Some(id);
            }
        }
        self.placements.insert(id, Placement { anchor, cells });
    }

    /// Free every cell of `id`. Returns false if it was not placed.
    pub fn release(&mut self, id: ItemId) -> bool {
        let Some(placement) = self.placements.remove(&id) else {
            return false;
        };
        for cell in placement.cells {
            if let Some(state) = self.state_mut(cell) {
                if state.occupant == Some(id) {
                    state.occupant = None;
                }
            }
        }
        true
    }

    /// Unlock exactly `cells`, but only if every one is in bounds and locked.
    pub fn unlock(&mut self, cells: &[Cell]) -> Result<usize, PackError> {
        let all_locked = cells
            .iter()
            .all(|&c| self.in_bounds(c) && !self.is_unlocked(c));
        if !all_locked {
            return Err(PackError::InvalidExpansion);
        }
        let mut count = 0;
        for &cell in cells {
            if let Some(state) = self.state_mut(cell) {
                if !state.unlocked {
                    state.unlocked = true;
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.clone(),
            items: self
                .placements
                .iter()
                .map(|(&id, p)| (id, p.cells.clone()))
                .collect(),
        }
    }

    /// Cross-check the matrix against the item map. Empty when consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut claimed: BTreeMap<Cell, ItemId> = BTreeMap::new();

        for (&id, placement) in &self.placements {
            for &cell in &placement.cells {
                if !self.in_bounds(cell) {
                    problems.push(format!("item {} covers out-of-bounds cell {:?}", id, cell));
                    continue;
                }
                if !self.is_unlocked(cell) {
                    problems.push(format!("item {} covers locked cell {:?}", id, cell));
                }
                if self.cell_at(cell) != Some(id) {
                    problems.push(format!(
                        "cell {:?} records {:?} but item {} claims it",
                        cell,
                        self.cell_at(cell),
                        id
                    ));
                }
                if let Some(other) = claimed.insert(cell, id) {
                    problems.push(format!("items {} and {} overlap at {:?}", other, id, cell));
                }
            }
        }

        for cell in self.all_cells() {
            if let Some(id) = self.cell_at(cell) {
                if claimed.get(&cell) != Some(&id) {
                    problems.push(format!("cell {:?} holds stale occupant {}", cell, id));
                }
            }
        }
        problems
    }
}
