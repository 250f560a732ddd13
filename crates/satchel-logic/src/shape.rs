//! Footprint calculus: pure functions over an item's relative cells.
//!
//! A footprint is an ordered set of `(dx, dy)` offsets where `dx` is the
//! column offset and `dy` the row offset from the item's anchor. Every
//! footprint is anchored: its smallest `dx` and smallest `dy` are both 0, and
//! clockwise rotation keeps it that way. Footprints are immutable values:
//! rotation returns a new footprint instead of mutating the old one.
//!
//! ```
//! use satchel_logic::shape::Footprint;
//!
//! let hook = Footprint::stem_hook();
//! let turned = hook.rotate_clockwise().rotate_clockwise().rotate_clockwise().rotate_clockwise();
//! assert!(turned.same_cells(&hook));
//! ```

use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// One relative cell of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Reasons a list of offsets cannot form a footprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FootprintError {
    #[error("footprint has no cells")]
    Empty,
    #[error("footprint offset ({dx}, {dy}) is negative")]
    NegativeOffset { dx: i32, dy: i32 },
    #[error("footprint offset ({dx}, {dy}) appears twice")]
    DuplicateOffset { dx: i32, dy: i32 },
    #[error("footprint is not anchored: smallest offset is ({min_dx}, {min_dy})")]
    NotAnchored { min_dx: i32, min_dy: i32 },
}

/// Non-empty, duplicate-free set of non-negative offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Offset>", into = "Vec<Offset>")]
pub struct Footprint {
    offsets: Vec<Offset>,
}

impl TryFrom<Vec<Offset>> for Footprint {
    type Error = FootprintError;

    fn try_from(offsets: Vec<Offset>) -> Result<Self, Self::Error> {
        Self::new(offsets)
    }
}

impl From<Footprint> for Vec<Offset> {
    fn from(footprint: Footprint) -> Self {
        footprint.offsets
    }
}

impl Footprint {
    /// Build a footprint, rejecting empty, negative, repeated, or unanchored
    /// offsets.
    pub fn new(offsets: Vec<Offset>) -> Result<Self, FootprintError> {
        if offsets.is_empty() {
            return Err(FootprintError::Empty);
        }
        let mut seen = BTreeSet::new();
        for o in &offsets {
            if o.dx < 0 || o.dy < 0 {
                return Err(FootprintError::NegativeOffset { dx: o.dx, dy: o.dy });
            }
            if !seen.insert(*o) {
                return Err(FootprintError::DuplicateOffset { dx: o.dx, dy: o.dy });
            }
        }
        let min_dx = offsets.iter().map(|o| o.dx).min().unwrap_or(0);
        let min_dy = offsets.iter().map(|o| o.dy).min().unwrap_or(0);
        if min_dx != 0 || min_dy != 0 {
            return Err(FootprintError::NotAnchored { min_dx, min_dy });
        }
        Ok(Self { offsets })
    }

    /// Build from `(dx, dy)` pairs. Intended for content tables known to be valid.
    pub fn from_pairs(pairs: &[(i32, i32)]) -> Result<Self, FootprintError> {
        Self::new(pairs.iter().map(|&(dx, dy)| Offset::new(dx, dy)).collect())
    }

    fn from_trusted(offsets: Vec<Offset>) -> Self {
        Self { offsets }
    }

    // ── Canonical shapes ────────────────────────────────────────────────

    pub fn single() -> Self {
        Self::from_trusted(vec![Offset::new(0, 0)])
    }

    /// `n`×`n` block.
    pub fn square(n: i32) -> Self {
        let n = n.max(1);
        let mut offsets = Vec::with_capacity((n * n) as usize);
        for dy in 0..n {
            for dx in 0..n {
                offsets.push(Offset::new(dx, dy));
            }
        }
        Self::from_trusted(offsets)
    }

    /// Column of `n` cells (swords, staves, bows).
    pub fn vertical_bar(n: i32) -> Self {
        Self::from_trusted((0..n.max(1)).map(|dy| Offset::new(0, dy)).collect())
    }

    /// Row of `n` cells.
    pub fn horizontal_bar(n: i32) -> Self {
        Self::from_trusted((0..n.max(1)).map(|dx| Offset::new(dx, 0)).collect())
    }

    /// Vertical stem with a hook to the lower right: the default curse shape.
    pub fn stem_hook() -> Self {
        Self::from_trusted(vec![Offset::new(0, 0), Offset::new(0, 1), Offset::new(1, 1)])
    }

    /// Top row of two with a cell hanging under the right end.
    pub fn corner() -> Self {
        Self::from_trusted(vec![Offset::new(0, 0), Offset::new(1, 0), Offset::new(1, 1)])
    }

    /// Two cells touching only at a corner (wands).
    pub fn diagonal() -> Self {
        Self::from_trusted(vec![Offset::new(0, 0), Offset::new(1, 1)])
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false for a constructed footprint.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// 1 + the largest column offset.
    pub fn width(&self) -> i32 {
        self.offsets.iter().map(|o| o.dx).max().unwrap_or(0) + 1
    }

    /// 1 + the largest row offset.
    pub fn height(&self) -> i32 {
        self.offsets.iter().map(|o| o.dy).max().unwrap_or(0) + 1
    }

    /// Rotate 90° clockwise about the footprint's own bounding box.
    ///
    /// Each `(x, y)` becomes `(y, width - 1 - x)` using the width before
    /// rotation. Offset order is preserved.
    pub fn rotate_clockwise(&self) -> Self {
        let width = self.width();
        Self::from_trusted(
            self.offsets
                .iter()
                .map(|o| Offset::new(o.dy, width - 1 - o.dx))
                .collect(),
        )
    }

    /// Apply `rotate_clockwise` `turns % 4` times.
    pub fn rotated(&self, turns: u8) -> Self {
        let mut out = self.clone();
        for _ in 0..(turns % 4) {
            out = out.rotate_clockwise();
        }
        out
    }

    /// Set equality, ignoring order.
    pub fn same_cells(&self, other: &Footprint) -> bool {
        let a: BTreeSet<Offset> = self.offsets.iter().copied().collect();
        let b: BTreeSet<Offset> = other.offsets.iter().copied().collect();
        a == b
    }

    /// Absolute cells covered when the footprint is anchored at `anchor`.
    ///
    /// Saturates at the `i32` limits, so an extreme anchor yields cells that
    /// are simply out of bounds.
    pub fn cells_at(&self, anchor: Cell) -> Vec<Cell> {
        self.offsets
            .iter()
            .map(|o| {
                Cell::new(
                    anchor.row.saturating_add(o.dy),
                    anchor.col.saturating_add(o.dx),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_height() {
        assert_eq!(Footprint::single().width(), 1);
        assert_eq!(Footprint::single().height(), 1);
        assert_eq!(Footprint::vertical_bar(3).width(), 1);
        assert_eq!(Footprint::vertical_bar(3).height(), 3);
        assert_eq!(Footprint::horizontal_bar(4).width(), 4);
        assert_eq!(Footprint::square(2).height(), 2);
        assert_eq!(Footprint::stem_hook().width(), 2);
    }

    #[test]
    fn test_rotate_bar_becomes_row() {
        let bar = Footprint::vertical_bar(3);
        let turned = bar.rotate_clockwise();
        assert_eq!(turned.width(), 3);
        assert_eq!(turned.height(), 1);
        // (0,y) -> (y, 0)
        assert_eq!(
            turned.offsets(),
            &[Offset::new(0, 0), Offset::new(1, 0), Offset::new(2, 0)]
        );
    }

    #[test]
    fn test_rotate_row_uses_prior_width() {
        // (x,0) -> (0, 2 - x)
        let row = Footprint::horizontal_bar(3).rotate_clockwise();
        assert_eq!(
            row.offsets(),
            &[Offset::new(0, 2), Offset::new(0, 1), Offset::new(0, 0)]
        );
    }

    #[test]
    fn test_four_rotations_identity() {
        for shape in [
            Footprint::single(),
            Footprint::square(2),
            Footprint::vertical_bar(4),
            Footprint::horizontal_bar(3),
            Footprint::stem_hook(),
            Footprint::corner(),
            Footprint::diagonal(),
            Footprint::from_pairs(&[(0, 0), (2, 1), (1, 3)]).unwrap(),
        ] {
            let mut turned = shape.clone();
            for _ in 0..4 {
                turned = turned.rotate_clockwise();
                assert_eq!(turned.len(), shape.len());
            }
            assert!(turned.same_cells(&shape), "{:?} became {:?}", shape, turned);
        }
    }

    #[test]
    fn test_rotated_counts_quarter_turns() {
        let hook = Footprint::stem_hook();
        let three = hook.rotate_clockwise().rotate_clockwise().rotate_clockwise();
        assert_eq!(hook.rotated(3), three);
        assert_eq!(hook.rotated(5), hook.rotate_clockwise());
    }

    #[test]
    fn test_rotation_stays_anchored() {
        let mut shape = Footprint::corner();
        for _ in 0..4 {
            shape = shape.rotate_clockwise();
            assert_eq!(shape.offsets().iter().map(|o| o.dx).min(), Some(0));
            assert_eq!(shape.offsets().iter().map(|o| o.dy).min(), Some(0));
        }
    }

    #[test]
    fn test_rotation_keeps_cell_count() {
        let hook = Footprint::stem_hook();
        assert_eq!(hook.rotate_clockwise().len(), 3);
    }

    #[test]
    fn test_rejects_bad_offsets() {
        assert_eq!(Footprint::new(vec![]), Err(FootprintError::Empty));
        assert_eq!(
            Footprint::from_pairs(&[(0, 0), (-1, 0)]),
            Err(FootprintError::NegativeOffset { dx: -1, dy: 0 })
        );
        assert_eq!(
            Footprint::from_pairs(&[(0, 0), (0, 0)]),
            Err(FootprintError::DuplicateOffset { dx: 0, dy: 0 })
        );
    }

    #[test]
    fn test_cells_at_maps_dx_to_columns() {
        let cells = Footprint::horizontal_bar(2).cells_at(Cell::new(1, 3));
        assert_eq!(cells, vec![Cell::new(1, 3), Cell::new(1, 4)]);
    }

    #[test]
    fn test_rejects_unanchored_offsets() {
        assert_eq!(
            Footprint::from_pairs(&[(2, 1), (3, 1)]),
            Err(FootprintError::NotAnchored { min_dx: 2, min_dy: 1 })
        );
        // (0,0) itself is not required, only zero minima
        assert!(Footprint::from_pairs(&[(0, 1), (1, 0)]).is_ok());
    }

    #[test]
    fn test_cells_at_saturates() {
        let cells = Footprint::vertical_bar(2).cells_at(Cell::new(i32::MAX, i32::MAX));
        assert_eq!(cells, vec![Cell::new(i32::MAX, i32::MAX), Cell::new(i32::MAX, i32::MAX)]);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Footprint, _> = serde_json::from_str(r#"[{"dx":0,"dy":0},{"dx":0,"dy":1}]"#);
        assert!(ok.is_ok());
        let empty: Result<Footprint, _> = serde_json::from_str("[]");
        assert!(empty.is_err());
    }
}
