//! Which items physically touch which.
//!
//! Adjacency is derived on demand from the grid; nothing is cached, so a
//! query always reflects the current layout. Results are sets: callers must
//! not rely on iteration order for correctness.

use crate::grid::{Cell, Grid, ItemId};
use std::collections::BTreeSet;

/// Distinct items orthogonally touching any cell of `id`. Empty if `id` is
/// not on the grid.
pub fn adjacent_items(grid: &Grid, id: ItemId) -> BTreeSet<ItemId> {
    let mut out = BTreeSet::new();
    let Some(cells) = grid.occupied_cells(id) else {
        return out;
    };
    for &cell in cells {
        for neighbor in cell.orthogonal_neighbors() {
            if let Some(other) = grid.cell_at(neighbor) {
                if other != id {
                    out.insert(other);
                }
            }
        }
    }
    out
}

pub fn are_adjacent(grid: &Grid, a: ItemId, b: ItemId) -> bool {
    a != b && adjacent_items(grid, a).contains(&b)
}

/// Occupants of the four cells around `cell` (for hover highlighting).
pub fn items_around(grid: &Grid, cell: Cell) -> BTreeSet<ItemId> {
    cell.orthogonal_neighbors()
        .into_iter()
        .filter_map(|n| grid.cell_at(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackConfig;

    fn place(grid: &mut Grid, id: u32, cells: &[(i32, i32)]) -> ItemId {
        let id = ItemId(id);
        let cells: Vec<Cell> = cells.iter().map(|&(r, c)| Cell::new(r, c)).collect();
        grid.commit_placement(id, cells[0], cells);
        id
    }

    #[test]
    fn test_orthogonal_only() {
        let mut grid = Grid::from_config(&PackConfig::default());
        let a = place(&mut grid, 1, &[(2, 3)]);
        let b = place(&mut grid, 2, &[(1, 3)]);
        let diag = place(&mut grid, 3, &[(1, 2)]);

        let adj = adjacent_items(&grid, a);
        assert!(adj.contains(&b));
        assert!(!adj.contains(&diag));
        assert!(!adj.contains(&a));
    }

    #[test]
    fn test_multi_cell_counts_once() {
        let mut grid = Grid::from_config(&PackConfig::default());
        let bar = place(&mut grid, 1, &[(1, 2), (2, 2), (3, 2)]);
        let tall = place(&mut grid, 2, &[(1, 3), (2, 3), (3, 3)]);
        let adj = adjacent_items(&grid, bar);
        assert_eq!(adj.len(), 1);
        assert!(adj.contains(&tall));
    }

    #[test]
    fn test_symmetry() {
        let mut grid = Grid::from_config(&PackConfig::default());
        let a = place(&mut grid, 1, &[(1, 2), (1, 3)]);
        let b = place(&mut grid, 2, &[(2, 3)]);
        assert!(are_adjacent(&grid, a, b));
        assert!(are_adjacent(&grid, b, a));
    }

    #[test]
    fn test_absent_item_empty() {
        let grid = Grid::from_config(&PackConfig::default());
        assert!(adjacent_items(&grid, ItemId(99)).is_empty());
    }

    #[test]
    fn test_items_around_cell() {
        let mut grid = Grid::from_config(&PackConfig::default());
        let a = place(&mut grid, 1, &[(1, 3)]);
        let b = place(&mut grid, 2, &[(2, 2)]);
        let around = items_around(&grid, Cell::new(2, 3));
        assert_eq!(around, [a, b].into_iter().collect());
    }
}
