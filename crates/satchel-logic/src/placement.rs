//! Placement policy: the only way items get onto, move around, or leave the grid.
//!
//! `Backpack` owns the grid and the item arena together so every mutation
//! can keep both consistent. All operations are all-or-nothing: a failed
//! call leaves the pack exactly as it was.
//!
//! # Placement modes
//!
//! | Mode | Entry point | Collisions |
//! |------|-------------|------------|
//! | Free | [`Backpack::place`] | fail with `Blocked` |
//! | Currency merge | [`Backpack::place`] on gold | skipped: value folds into the existing pile |
//! | Forced | [`Backpack::force_place`] (curses only) | occupants are evicted |
//!
//! ```
//! use satchel_logic::grid::Cell;
//! use satchel_logic::items::Item;
//! use satchel_logic::placement::Backpack;
//!
//! let mut pack = Backpack::default();
//! let key = pack.register(Item::key());
//! assert!(pack.place(key, Cell::new(2, 3)).is_ok());
//! assert_eq!(pack.grid().item_at(Cell::new(2, 3)), Some(key));
//! ```

use crate::config::{MergeMode, PackConfig};
use crate::error::PackError;
use crate::grid::{Cell, Grid, GridSnapshot, ItemId};
use crate::items::{Item, ItemArena, ItemKind};
use crate::shape::Footprint;
use std::collections::BTreeSet;

/// What a successful `place` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed { id: ItemId, cells: Vec<Cell> },
    /// The incoming gold was folded into `into`, which stays at `anchor`.
    Merged {
        into: ItemId,
        anchor: Cell,
        value: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Backpack {
    pub(crate) config: PackConfig,
    pub(crate) grid: Grid,
    pub(crate) items: ItemArena,
}

impl Default for Backpack {
    fn default() -> Self {
        Self::new(PackConfig::default())
    }
}

impl Backpack {
    pub fn new(config: PackConfig) -> Self {
        Self {
            grid: Grid::from_config(&config),
            items: ItemArena::default(),
            config,
        }
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn items(&self) -> &ItemArena {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot()
    }

    pub fn is_placed(&self, id: ItemId) -> bool {
        self.grid.contains(id)
    }

    /// Hand an item to the engine and get its handle. The item starts unplaced.
    pub fn register(&mut self, item: Item) -> ItemId {
        self.items.insert(item)
    }

    /// The gold pile on the grid, if any.
    pub fn currency(&self) -> Option<(ItemId, u32)> {
        self.currency_excluding(None)
    }

    fn currency_excluding(&self, skip: Option<ItemId>) -> Option<(ItemId, u32)> {
        self.grid
            .placed_items()
            .filter(|&id| Some(id) != skip)
            .find_map(|id| {
                self.items
                    .get(id)
                    .and_then(|item| item.kind.gold_value())
                    .map(|value| (id, value))
            })
    }

    pub(crate) fn currency_mut(&mut self) -> Option<&mut u32> {
        let (id, _) = self.currency()?;
        match self.items.get_mut(id).map(|item| &mut item.kind) {
            Some(ItemKind::Gold { value }) => Some(value),
            _ => None,
        }
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Cells `footprint` would cover at `anchor`, if every one is in bounds,
    /// unlocked, and free (cells held by `ignore` count as free).
    fn check_cells(
        &self,
        footprint: &Footprint,
        anchor: Cell,
        ignore: Option<ItemId>,
    ) -> Result<Vec<Cell>, PackError> {
        let cells = footprint.cells_at(anchor);
        if let Some(c) = cells.iter().find(|&&c| !self.grid.in_bounds(c)) {
            return Err(PackError::OutOfBounds {
                row: c.row,
                col: c.col,
            });
        }
        let blocked = cells.iter().find(|&&c| {
            !self.grid.is_unlocked(c)
                || self
                    .grid
                    .cell_at(c)
                    .is_some_and(|occupant| Some(occupant) != ignore)
        });
        if let Some(c) = blocked {
            return Err(PackError::Blocked {
                row: c.row,
                col: c.col,
            });
        }
        Ok(cells)
    }

    /// Would `id` fit at `anchor` with its current footprint?
    pub fn validate(&self, id: ItemId, anchor: Cell) -> Result<Vec<Cell>, PackError> {
        let item = self.items.get(id).ok_or(PackError::NotPresent(id))?;
        self.check_cells(item.footprint(), anchor, Some(id))
    }

    // ── Placement ───────────────────────────────────────────────────────

    /// Place (or move) `id` with its anchor at `anchor`, merging gold with
    /// the configured merge mode.
    pub fn place(&mut self, id: ItemId, anchor: Cell) -> Result<PlaceOutcome, PackError> {
        let mode = self.config.merge_mode;
        self.place_with_mode(id, anchor, mode)
    }

    pub fn place_with_mode(
        &mut self,
        id: ItemId,
        anchor: Cell,
        mode: MergeMode,
    ) -> Result<PlaceOutcome, PackError> {
        let item = self.items.get(id).ok_or(PackError::NotPresent(id))?;

        if let Some(incoming) = item.kind.gold_value() {
            if let Some((into, _)) = self.currency_excluding(Some(id)) {
                return Ok(self.merge_currency(id, incoming, into, mode));
            }
        }

        let cells = match self.check_cells(item.footprint(), anchor, Some(id)) {
            Ok(cells) => cells,
            Err(e) => {
                log::debug!("rejected placement of {} at {:?}: {}", id, anchor, e);
                return Err(e);
            }
        };
        self.grid.release(id);
        self.grid.commit_placement(id, anchor, cells.clone());
        Ok(PlaceOutcome::Placed { id, cells })
    }

    fn merge_currency(
        &mut self,
        incoming_id: ItemId,
        incoming: u32,
        into: ItemId,
        mode: MergeMode,
    ) -> PlaceOutcome {
        self.grid.release(incoming_id);
        self.items.remove(incoming_id);

        let mut total = 0;
        if let Some(ItemKind::Gold { value }) =
            self.items.get_mut(into).map(|item| &mut item.kind)
        {
            if mode == MergeMode::Accumulate {
                *value = value.saturating_add(incoming);
            }
            total = *value;
        }
        if let Some(item) = self.items.get_mut(into) {
            item.description = format!("A pile of {} gold coins.", total);
        }
        log::info!(
            "merged gold {} ({}) into {} ({:?}), pile now {}",
            incoming_id,
            incoming,
            into,
            mode,
            total
        );

        PlaceOutcome::Merged {
            into,
            // currency_excluding only returns placed items
            anchor: self.grid.anchor_of(into).unwrap_or(Cell::new(0, 0)),
            value: total,
        }
    }

    /// Force a curse in at `anchor`, evicting whatever is in the way.
    ///
    /// Evicted items leave the grid and the arena. Returns their ids.
    pub fn force_place(&mut self, id: ItemId, anchor: Cell) -> Result<Vec<ItemId>, PackError> {
        let item = self.items.get(id).ok_or(PackError::NotPresent(id))?;
        if !item.kind.is_curse() {
            return Err(PackError::NotACurse(id));
        }

        let cells = item.footprint().cells_at(anchor);
        for &c in &cells {
            if !self.grid.in_bounds(c) {
                return Err(PackError::OutOfBounds {
                    row: c.row,
                    col: c.col,
                });
            }
        }
        if let Some(c) = cells.iter().find(|&&c| !self.grid.is_unlocked(c)) {
            return Err(PackError::Blocked {
                row: c.row,
                col: c.col,
            });
        }

        let evicted: BTreeSet<ItemId> = cells
            .iter()
            .filter_map(|&c| self.grid.cell_at(c))
            .filter(|&occupant| occupant != id)
            .collect();
        for &victim in &evicted {
            self.grid.release(victim);
            self.items.remove(victim);
            log::info!("curse {} evicted {}", id, victim);
        }

        self.grid.release(id);
        self.grid.commit_placement(id, anchor, cells);
        Ok(evicted.into_iter().collect())
    }

    // ── Removal ─────────────────────────────────────────────────────────

    /// Pick `id` up off the grid. It stays registered. False if not placed.
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.grid.release(id)
    }

    /// Pick up whatever covers `cell`.
    pub fn remove_at(&mut self, cell: Cell) -> Option<ItemId> {
        let id = self.grid.item_at(cell)?;
        self.grid.release(id);
        Some(id)
    }

    /// Remove `id` from the grid and forget it.
    pub fn discard(&mut self, id: ItemId) -> Option<Item> {
        self.grid.release(id);
        self.items.remove(id)
    }

    // ── Rotation ────────────────────────────────────────────────────────

    /// Turn `id` a quarter clockwise. Placed items turn about their anchor
    /// and stay put if the new shape does not fit. Returns false for curses.
    pub fn rotate(&mut self, id: ItemId) -> Result<bool, PackError> {
        let item = self.items.get(id).ok_or(PackError::NotPresent(id))?;
        let Some(next) = item.next_rotation() else {
            return Ok(false);
        };

        if let Some(anchor) = self.grid.anchor_of(id) {
            let cells = self.check_cells(&next, anchor, Some(id))?;
            self.grid.release(id);
            self.grid.commit_placement(id, anchor, cells);
        }
        if let Some(item) = self.items.get_mut(id) {
            item.set_rotated_footprint(next);
        }
        Ok(true)
    }

    // ── Expansion ───────────────────────────────────────────────────────

    /// Locked cells bordering at least one unlocked cell, row-major.
    pub fn expansion_frontier(&self) -> Vec<Cell> {
        self.grid
            .all_cells()
            .filter(|&c| !self.grid.is_unlocked(c))
            .filter(|&c| {
                c.orthogonal_neighbors()
                    .iter()
                    .any(|&n| self.grid.is_unlocked(n))
            })
            .collect()
    }

    /// Unlock `cells`, at most `expansion_quota` distinct cells at a time.
    ///
    /// Every cell must be locked and must connect to the unlocked area,
    /// either directly or through other requested cells. Repeated cells
    /// count once.
    pub fn expand(&mut self, cells: &[Cell]) -> Result<usize, PackError> {
        let quota = self.config.expansion_quota;
        let requested: BTreeSet<Cell> = cells.iter().copied().collect();
        if requested.len() > quota {
            return Err(PackError::QuotaExceeded {
                requested: requested.len(),
                quota,
            });
        }

        let frontier: BTreeSet<Cell> = self.expansion_frontier().into_iter().collect();
        let mut reached: BTreeSet<Cell> = requested.intersection(&frontier).copied().collect();
        loop {
            let next: Vec<Cell> = requested
                .iter()
                .filter(|c| !reached.contains(c))
                .filter(|c| reached.iter().any(|r| r.is_orthogonal_to(**c)))
                .copied()
                .collect();
            if next.is_empty() {
                break;
            }
            reached.extend(next);
        }
        if reached.len() != requested.len() {
            return Err(PackError::InvalidExpansion);
        }

        let cells: Vec<Cell> = requested.into_iter().collect();
        let unlocked = self.grid.unlock(&cells)?;
        log::info!("expanded pack by {} cells", unlocked);
        Ok(unlocked)
    }

    /// Cross-check grid and arena. Empty when consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = self.grid.check_invariants();
        for id in self.grid.placed_items() {
            match self.items.get(id) {
                None => problems.push(format!("placed item {} missing from arena", id)),
                Some(item) => {
                    let anchor = self.grid.anchor_of(id).unwrap_or(Cell::new(0, 0));
                    let expected: BTreeSet<Cell> =
                        item.footprint().cells_at(anchor).into_iter().collect();
                    let actual: BTreeSet<Cell> = self
                        .grid
                        .occupied_cells(id)
                        .unwrap_or(&[])
                        .iter()
                        .copied()
                        .collect();
                    if expected != actual {
                        problems.push(format!("item {} cells disagree with its footprint", id));
                    }
                }
            }
        }
        let gold_piles = self
            .grid
            .placed_items()
            .filter(|&id| self.items.get(id).is_some_and(|i| i.kind.is_currency()))
            .count();
        if gold_piles > 1 {
            problems.push(format!("{} gold piles on the grid", gold_piles));
        }
        problems
    }
}

/// Player's in-progress choice of cells to unlock, capped at the quota.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionDraft {
    selected: Vec<Cell>,
}

impl ExpansionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect a frontier cell. Returns whether it is now selected.
    ///
    /// Cells outside the frontier and selections past the quota are ignored.
    pub fn toggle(&mut self, pack: &Backpack, cell: Cell) -> bool {
        if let Some(pos) = self.selected.iter().position(|&c| c == cell) {
            self.selected.remove(pos);
            return false;
        }
        if self.selected.len() >= pack.config.expansion_quota {
            return false;
        }
        if !pack.expansion_frontier().contains(&cell) {
            return false;
        }
        self.selected.push(cell);
        true
    }

    pub fn selected(&self) -> &[Cell] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Unlock the selection. The draft is emptied only on success.
    pub fn commit(&mut self, pack: &mut Backpack) -> Result<usize, PackError> {
        let unlocked = pack.expand(&self.selected)?;
        self.selected.clear();
        Ok(unlocked)
    }
}
