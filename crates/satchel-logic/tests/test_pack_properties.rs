//! Property tests for the pack invariants.
//!
//! Random operation sequences are thrown at a `Backpack`; after every step
//! the grid must stay consistent, and failed operations must leave it
//! untouched.

use proptest::prelude::*;
use satchel_logic::actors::Hero;
use satchel_logic::adjacency::are_adjacent;
use satchel_logic::effects::Effect;
use satchel_logic::grid::{Cell, ItemId};
use satchel_logic::items::Item;
use satchel_logic::placement::Backpack;
use satchel_logic::shape::Footprint;
use satchel_logic::trade::funds;
use satchel_logic::turn::{inject_curse, refresh_passives};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Op {
    Place { slot: usize, row: i32, col: i32 },
    Remove { slot: usize },
    Rotate { slot: usize },
    Expand { cells: Vec<(i32, i32)> },
    Curse { row: i32, col: i32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0_usize..6, -1_i32..6, -1_i32..8).prop_map(|(slot, row, col)| Op::Place { slot, row, col }),
        1 => (0_usize..6).prop_map(|slot| Op::Remove { slot }),
        2 => (0_usize..6).prop_map(|slot| Op::Rotate { slot }),
        1 => prop::collection::vec((0_i32..5, 0_i32..7), 1..6).prop_map(|cells| Op::Expand { cells }),
        1 => (0_i32..5, 0_i32..7).prop_map(|(row, col)| Op::Curse { row, col }),
    ]
}

fn stocked_pack() -> (Backpack, Vec<ItemId>) {
    let mut pack = Backpack::default();
    let items = vec![
        Item::key(),
        Item::armor("Tunic", 5, 1),
        Item::melee_weapon("Wooden Sword", 10, 1, Footprint::vertical_bar(3)),
        Item::magic_weapon("Cleansing Wand", 6, 1, Footprint::diagonal()),
        Item::shield("Knight's Shield", 7, 1, Footprint::vertical_bar(2)),
        Item::food("Steak", vec![]),
    ];
    let ids = items.into_iter().map(|item| pack.register(item)).collect();
    (pack, ids)
}

fn apply(pack: &mut Backpack, hero: &mut Hero, slots: &[ItemId], op: &Op) -> bool {
    match op {
        Op::Place { slot, row, col } => pack.place(slots[*slot], Cell::new(*row, *col)).is_ok(),
        Op::Remove { slot } => pack.remove(slots[*slot]),
        Op::Rotate { slot } => pack.rotate(slots[*slot]).is_ok(),
        Op::Expand { cells } => {
            let cells: Vec<Cell> = cells.iter().map(|&(r, c)| Cell::new(r, c)).collect();
            pack.expand(&cells).is_ok()
        }
        Op::Curse { row, col } => {
            inject_curse(pack, Item::curse(2), hero, Cell::new(*row, *col)).is_ok()
        }
    }
}

fn unlocked_cells(pack: &Backpack) -> BTreeSet<Cell> {
    pack.grid()
        .all_cells()
        .filter(|&c| pack.grid().is_unlocked(c))
        .collect()
}

proptest! {
    #[test]
    fn occupancy_stays_exclusive_and_in_bounds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut pack, slots) = stocked_pack();
        let mut hero = Hero::default();
        for op in &ops {
            apply(&mut pack, &mut hero, &slots, op);
            let problems = pack.check_invariants();
            prop_assert!(problems.is_empty(), "{:?} after {:?}", problems, op);
        }
    }

    #[test]
    fn failed_operations_change_nothing(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (mut pack, slots) = stocked_pack();
        let mut hero = Hero::default();
        for op in &ops {
            let before = pack.snapshot();
            let rotations: Vec<u8> = slots
                .iter()
                .map(|&id| pack.item(id).map_or(0, |item| item.rotation()))
                .collect();
            if !apply(&mut pack, &mut hero, &slots, op) && !matches!(op, Op::Remove { .. }) {
                let snapshot = pack.snapshot();
                prop_assert_eq!(&before, &snapshot);
                let after: Vec<u8> = slots
                    .iter()
                    .map(|&id| pack.item(id).map_or(0, |item| item.rotation()))
                    .collect();
                prop_assert_eq!(rotations, after);
            }
        }
    }

    #[test]
    fn unlocked_cells_never_relock(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut pack, slots) = stocked_pack();
        let mut hero = Hero::default();
        let mut unlocked = unlocked_cells(&pack);
        for op in &ops {
            apply(&mut pack, &mut hero, &slots, op);
            let now = unlocked_cells(&pack);
            prop_assert!(now.is_superset(&unlocked));
            unlocked = now;
        }
    }

    #[test]
    fn adjacency_is_symmetric(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut pack, slots) = stocked_pack();
        let mut hero = Hero::default();
        for op in &ops {
            apply(&mut pack, &mut hero, &slots, op);
        }
        let placed: Vec<ItemId> = pack.grid().placed_items().collect();
        for &a in &placed {
            prop_assert!(!are_adjacent(pack.grid(), a, a));
            for &b in &placed {
                prop_assert_eq!(are_adjacent(pack.grid(), a, b), are_adjacent(pack.grid(), b, a));
            }
        }
    }

    #[test]
    fn four_turns_restore_any_footprint(cells in prop::collection::btree_set((0_i32..4, 0_i32..4), 0..8)) {
        let mut cells = cells;
        cells.insert((0, 0));
        let pairs: Vec<(i32, i32)> = cells.into_iter().collect();
        let footprint = Footprint::from_pairs(&pairs).expect("anchored offsets");
        let mut turned = footprint.clone();
        for _ in 0..4 {
            turned = turned.rotate_clockwise();
            prop_assert_eq!(turned.len(), footprint.len());
            prop_assert!(Footprint::new(turned.offsets().to_vec()).is_ok());
        }
        prop_assert!(turned.same_cells(&footprint));
    }

    #[test]
    fn unanchored_offsets_are_rejected(cells in prop::collection::btree_set((0_i32..4, 0_i32..4), 1..8), shift in 1_i32..3) {
        let pairs: Vec<(i32, i32)> = cells.into_iter().map(|(dx, dy)| (dx + shift, dy)).collect();
        prop_assert!(Footprint::from_pairs(&pairs).is_err());
    }

    #[test]
    fn gold_merges_conserve_value(values in prop::collection::vec(0_u32..1_000, 1..12)) {
        let mut pack = Backpack::default();
        for (i, &value) in values.iter().enumerate() {
            let gold = pack.register(Item::gold(value));
            let cell = Cell::new(1 + (i as i32 % 3), 2 + (i as i32 / 3 % 3));
            prop_assert!(pack.place(gold, cell).is_ok());
        }
        prop_assert_eq!(funds(&pack), values.iter().sum::<u32>());
        prop_assert_eq!(pack.grid().item_count(), 1);
        prop_assert_eq!(pack.items().len(), 1);
    }

    #[test]
    fn passive_totals_ignore_order(layout in prop::collection::vec((0_u8..3, 1_i32..4), 9)) {
        let build = |reverse: bool| {
            let mut pack = Backpack::default();
            let mut order: Vec<usize> = (0..layout.len()).collect();
            if reverse {
                order.reverse();
            }
            for i in order {
                let (kind, amount) = layout[i];
                let item = match kind {
                    0 => Item::melee_weapon("Shiv", 10, 1, Footprint::single())
                        .with_effects(vec![Effect::AddDamageToAdjacentWeapons { amount }]),
                    1 => Item::shield("Rough Buckler", 5, 1, Footprint::single())
                        .with_effects(vec![Effect::AddProtectionToAdjacentArmor { amount }]),
                    _ => Item::mana_stone("Crystale", vec![Effect::AddDamageToAdjacentWeapons { amount }]),
                };
                let id = pack.register(item);
                let cell = Cell::new(1 + i as i32 / 3, 2 + i as i32 % 3);
                pack.place(id, cell).expect("centre block is free");
            }
            let mut hero = Hero::default();
            refresh_passives(&mut pack, &mut hero, None).expect("passives need no enemies");
            (0..layout.len())
                .map(|i| {
                    let cell = Cell::new(1 + i as i32 / 3, 2 + i as i32 % 3);
                    let kind = &pack.grid().item_at(cell).and_then(|id| pack.item(id)).expect("placed").kind;
                    (kind.damage(), kind.protection())
                })
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(build(false), build(true));
    }
}
