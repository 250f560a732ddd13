//! Turn protocol: using items, end-of-turn upkeep, and curse injection.
//!
//! These functions are the only code that runs item hooks against a live
//! pack. Each hook runs with its item detached from the arena, so the
//! effect context can hold the grid and every other item at the same time.

use crate::actors::{Enemy, Hero};
use crate::effects::{EffectContext, EffectError};
use crate::error::PackError;
use crate::grid::{Cell, ItemId};
use crate::items::{Item, ItemBehavior, UseOutcome};
use crate::placement::Backpack;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseError {
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error(transparent)]
    Effect(#[from] EffectError),
}

/// Use the placed item `id`. Consumed items are evicted from the pack.
///
/// `target` indexes into `enemies`. On an effect error the use is aborted;
/// effects that already fired keep their results.
pub fn use_item(
    pack: &mut Backpack,
    id: ItemId,
    hero: &mut Hero,
    enemies: Option<&mut Vec<Enemy>>,
    target: Option<usize>,
) -> Result<UseOutcome, UseError> {
    if !pack.grid.contains(id) {
        return Err(PackError::NotPresent(id).into());
    }
    let Backpack { grid, items, .. } = pack;
    let mut item = items.remove(id).ok_or(PackError::NotPresent(id))?;
    let result = {
        let mut ctx = EffectContext {
            hero,
            enemies,
            target,
            grid: &*grid,
            items: &mut *items,
        };
        item.on_use(id, &mut ctx)
    };
    let name = item.name.clone();
    items.restore(id, item);

    match result {
        Ok(UseOutcome::Consumed) => {
            pack.discard(id);
            log::info!("{} {} consumed", name, id);
            Ok(UseOutcome::Consumed)
        }
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            log::warn!("use of {} {} aborted: {}", name, id, e);
            Err(e.into())
        }
    }
}

/// Reset every item to base stats, then fire each placed item's passive
/// effects against the current layout.
///
/// Every placed item gets its passive pass even if an earlier one fails;
/// the first failure is returned.
pub fn refresh_passives(
    pack: &mut Backpack,
    hero: &mut Hero,
    mut enemies: Option<&mut Vec<Enemy>>,
) -> Result<(), EffectError> {
    for (_, item) in pack.items.iter_mut() {
        item.reset_to_base();
    }

    let placed: Vec<ItemId> = pack.grid.placed_items().collect();
    let Backpack { grid, items, .. } = pack;
    let mut first_error = None;

    for id in placed {
        let Some(mut item) = items.remove(id) else {
            continue;
        };
        let result = {
            let mut ctx = EffectContext {
                hero: &mut *hero,
                enemies: enemies.as_deref_mut(),
                target: None,
                grid: &*grid,
                items: &mut *items,
            };
            item.on_passive(id, &mut ctx)
        };
        if let Err(e) = result {
            log::warn!("passive effects of {} {} failed: {}", item.name, id, e);
            first_error.get_or_insert(e);
        }
        items.restore(id, item);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// End-of-turn upkeep. Returns the poison damage the hero took.
///
/// Poison ticks first, then the hero's protection, energy and mana are
/// refreshed, enemy debuffs wear off, and passive bonuses are recomputed.
pub fn end_turn(
    pack: &mut Backpack,
    hero: &mut Hero,
    mut enemies: Option<&mut Vec<Enemy>>,
) -> Result<i32, EffectError> {
    let poison_damage = hero.tick_poison();
    hero.refresh_for_turn();
    if let Some(enemies) = enemies.as_deref_mut() {
        for enemy in enemies.iter_mut() {
            enemy.reset_to_base();
        }
    }
    refresh_passives(pack, hero, enemies)?;
    Ok(poison_damage)
}

/// Force `curse` into the pack at `anchor` and settle it on the hero's
/// curse ledger. Returns the curse's id and the ids of evicted items.
///
/// On failure the curse is not kept.
pub fn inject_curse(
    pack: &mut Backpack,
    curse: Item,
    hero: &mut Hero,
    anchor: Cell,
) -> Result<(ItemId, Vec<ItemId>), PackError> {
    let id = pack.register(curse);
    match pack.force_place(id, anchor) {
        Ok(evicted) => {
            hero.settle_curse();
            log::info!(
                "curse {} placed at {:?}, {} item(s) evicted",
                id,
                anchor,
                evicted.len()
            );
            Ok((id, evicted))
        }
        Err(e) => {
            pack.discard(id);
            Err(e)
        }
    }
}
