//! Item effects and the context they execute in.
//!
//! An `Effect` is a small tagged value carried by an item. Most variants are
//! stateless; `LimitedUses` and `EmpowerSelf` carry counters that tick down
//! each time they fire. Effects never remove their item from the pack: the
//! owning item's hook inspects the counters afterwards and reports whether
//! it was consumed.
//!
//! Adjacency-scoped effects add flat deltas, so applying a set of them in any
//! order yields the same totals. They are not re-applied automatically when
//! the layout changes; see [`crate::turn::refresh_passives`].

use crate::actors::{Enemy, Hero};
use crate::adjacency::adjacent_items;
use crate::grid::{Grid, ItemId};
use crate::items::{ItemArena, ItemKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// When an effect fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// On deliberate use of the owning item.
    Active,
    /// On each passive pass (end of turn, entering combat).
    Passive,
}

/// Whether the effect stays on its item after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    Retain,
    Remove,
}

/// Missing arguments an effect needs. These are caller bugs, not player
/// mistakes: the current use is aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("effect needs the enemy set but none was supplied")]
    MissingEnemySet,
    #[error("effect needs a target enemy but none was supplied")]
    MissingTarget,
    #[error("target enemy index {0} is out of range")]
    UnknownTarget(usize),
    #[error("effect needs its source item")]
    MissingSourceItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Effect {
    Heal { amount: i32 },
    AddEnergy { amount: i32 },
    AddMana { amount: i32 },
    /// Adds poison stacks to the hero.
    PoisonHero { stacks: i32 },
    /// Clears the hero's poison.
    Cleanse,
    /// Flat damage to every enemy, ignoring defense.
    PoisonEnemies { damage: i32 },
    /// Item attack against every enemy (defense applies).
    AttackAllEnemies { damage: i32 },
    HealAllEnemies { amount: i32 },
    /// Lower the target enemy's attack.
    WeakenTarget { amount: i32 },
    AddDamageToAdjacentWeapons { amount: i32 },
    AddProtectionToAdjacentArmor { amount: i32 },
    /// Charge the source weapon: its next `turns` attacks deal a flat
    /// `damage` more. Firing again while charged does not stack.
    EmpowerSelf { damage: i32, turns: i32 },
    /// Remaining uses before the owning item is consumed.
    LimitedUses { remaining: u32 },
}

/// The item whose effect is firing. It is detached from the arena while its
/// hook runs, so its own stats are reached through here.
pub struct SourceItem<'a> {
    pub id: ItemId,
    pub kind: &'a mut ItemKind,
}

/// Everything an effect may read or mutate.
pub struct EffectContext<'a> {
    pub hero: &'a mut Hero,
    pub enemies: Option<&'a mut Vec<Enemy>>,
    /// Index into `enemies` of the enemy being acted on.
    pub target: Option<usize>,
    pub grid: &'a Grid,
    /// Every item except the one whose hook is running.
    pub items: &'a mut ItemArena,
}

impl<'a> EffectContext<'a> {
    pub fn enemies_mut(&mut self) -> Result<&mut Vec<Enemy>, EffectError> {
        self.enemies.as_deref_mut().ok_or(EffectError::MissingEnemySet)
    }

    pub fn target_mut(&mut self) -> Result<&mut Enemy, EffectError> {
        let index = self.target.ok_or(EffectError::MissingTarget)?;
        let enemies = self.enemies_mut()?;
        enemies
            .get_mut(index)
            .ok_or(EffectError::UnknownTarget(index))
    }
}

impl Effect {
    pub fn trigger(&self) -> Trigger {
        match self {
            Effect::AddDamageToAdjacentWeapons { .. }
            | Effect::AddProtectionToAdjacentArmor { .. } => Trigger::Passive,
            _ => Trigger::Active,
        }
    }

    /// True for a use counter that has run out.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Effect::LimitedUses { remaining } if *remaining == 0)
    }

    pub fn apply(
        &mut self,
        ctx: &mut EffectContext<'_>,
        source: Option<SourceItem<'_>>,
    ) -> Result<EffectOutcome, EffectError> {
        match self {
            Effect::Heal { amount } => {
                ctx.hero.heal(*amount);
            }
            Effect::AddEnergy { amount } => {
                let energy = ctx.hero.energy + *amount;
                ctx.hero.set_energy(energy);
            }
            Effect::AddMana { amount } => {
                let mana = ctx.hero.mana + *amount;
                ctx.hero.set_mana(mana);
            }
            Effect::PoisonHero { stacks } => ctx.hero.add_poison(*stacks),
            Effect::Cleanse => ctx.hero.cleanse(),
            Effect::PoisonEnemies { damage } => {
                for enemy in ctx.enemies_mut()?.iter_mut() {
                    enemy.hp = (enemy.hp - *damage).max(0);
                }
            }
            Effect::AttackAllEnemies { damage } => {
                for enemy in ctx.enemies_mut()?.iter_mut() {
                    enemy.receive_attack(*damage);
                }
            }
            Effect::HealAllEnemies { amount } => {
                for enemy in ctx.enemies_mut()?.iter_mut() {
                    enemy.heal(*amount);
                }
            }
            Effect::WeakenTarget { amount } => ctx.target_mut()?.weaken(*amount),
            Effect::AddDamageToAdjacentWeapons { amount } => {
                let source = source.ok_or(EffectError::MissingSourceItem)?;
                for neighbor in adjacent_items(ctx.grid, source.id) {
                    if let Some(item) = ctx.items.get_mut(neighbor) {
                        if item.kind.is_weapon() {
                            item.kind.add_damage(*amount);
                        }
                    }
                }
            }
            Effect::AddProtectionToAdjacentArmor { amount } => {
                let source = source.ok_or(EffectError::MissingSourceItem)?;
                for neighbor in adjacent_items(ctx.grid, source.id) {
                    if let Some(item) = ctx.items.get_mut(neighbor) {
                        if item.kind.is_armor() {
                            item.kind.add_protection(*amount);
                        }
                    }
                }
            }
            Effect::EmpowerSelf { damage, turns } => {
                let source = source.ok_or(EffectError::MissingSourceItem)?;
                if *damage == 0 || !source.kind.is_weapon() {
                    return Ok(EffectOutcome::Remove);
                }
                // fires after the attack: a charged weapon just spent a turn
                if source.kind.empower() != 0 {
                    *turns -= 1;
                }
                if *turns <= 0 {
                    source.kind.set_empower(0);
                    return Ok(EffectOutcome::Remove);
                }
                source.kind.set_empower(*damage);
            }
            Effect::LimitedUses { remaining } => {
                *remaining = remaining.saturating_sub(1);
            }
        }
        Ok(EffectOutcome::Retain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackConfig;
    use crate::grid::Cell;
    use crate::items::Item;
    use crate::shape::Footprint;

    struct Fixture {
        hero: Hero,
        enemies: Vec<Enemy>,
        grid: Grid,
        items: ItemArena,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                hero: Hero::default(),
                enemies: vec![
                    Enemy::new("Ratwolf", 20, 6, 2, 10),
                    Enemy::new("Queen Bee", 30, 9, 0, 20),
                ],
                grid: Grid::from_config(&PackConfig::default()),
                items: ItemArena::default(),
            }
        }

        fn put(&mut self, item: Item, anchor: Cell) -> ItemId {
            let cells = item.footprint().cells_at(anchor);
            let id = self.items.insert(item);
            self.grid.commit_placement(id, anchor, cells);
            id
        }

        fn ctx(&mut self, with_enemies: bool, target: Option<usize>) -> EffectContext<'_> {
            EffectContext {
                hero: &mut self.hero,
                enemies: if with_enemies { Some(&mut self.enemies) } else { None },
                target,
                grid: &self.grid,
                items: &mut self.items,
            }
        }
    }

    #[test]
    fn test_hero_effects() {
        let mut fx = Fixture::new();
        fx.hero.hp = 30;
        fx.hero.energy = 0;
        let mut ctx = fx.ctx(false, None);
        Effect::Heal { amount: 5 }.apply(&mut ctx, None).unwrap();
        Effect::AddEnergy { amount: 9 }.apply(&mut ctx, None).unwrap();
        Effect::PoisonHero { stacks: 2 }.apply(&mut ctx, None).unwrap();
        assert_eq!(fx.hero.hp, 35);
        assert_eq!(fx.hero.energy, 3);
        assert_eq!(fx.hero.poison, 2);

        let mut ctx = fx.ctx(false, None);
        Effect::Cleanse.apply(&mut ctx, None).unwrap();
        assert_eq!(fx.hero.poison, 0);
    }

    #[test]
    fn test_enemy_set_required() {
        let mut fx = Fixture::new();
        let mut ctx = fx.ctx(false, None);
        assert_eq!(
            Effect::PoisonEnemies { damage: 3 }.apply(&mut ctx, None),
            Err(EffectError::MissingEnemySet)
        );
        let mut ctx = fx.ctx(true, None);
        Effect::PoisonEnemies { damage: 3 }.apply(&mut ctx, None).unwrap();
        assert_eq!(fx.enemies[0].hp, 17);
        assert_eq!(fx.enemies[1].hp, 27);
    }

    #[test]
    fn test_weaken_target() {
        let mut fx = Fixture::new();
        let mut ctx = fx.ctx(true, None);
        assert_eq!(
            Effect::WeakenTarget { amount: 2 }.apply(&mut ctx, None),
            Err(EffectError::MissingTarget)
        );
        let mut ctx = fx.ctx(true, Some(7));
        assert_eq!(
            Effect::WeakenTarget { amount: 2 }.apply(&mut ctx, None),
            Err(EffectError::UnknownTarget(7))
        );
        let mut ctx = fx.ctx(true, Some(1));
        Effect::WeakenTarget { amount: 2 }.apply(&mut ctx, None).unwrap();
        assert_eq!(fx.enemies[1].attack, 7);
    }

    #[test]
    fn test_adjacent_weapon_bonus_filters_capability() {
        let mut fx = Fixture::new();
        let mut staff = Item::magic_weapon("Wizard Staff", 15, 1, Footprint::vertical_bar(2));
        staff.effects.push(Effect::AddDamageToAdjacentWeapons { amount: 2 });
        let mut staff_kind = staff.kind.clone();
        let source = fx.put(staff, Cell::new(1, 3));
        let sword = fx.put(Item::melee_weapon("Wooden Sword", 10, 1, Footprint::single()), Cell::new(1, 2));
        let apple = fx.put(Item::food("Apple", vec![]), Cell::new(1, 4));

        let mut effect = Effect::AddDamageToAdjacentWeapons { amount: 2 };
        let mut ctx = fx.ctx(false, None);
        assert_eq!(
            effect.apply(&mut ctx, None),
            Err(EffectError::MissingSourceItem)
        );
        effect
            .apply(&mut ctx, Some(SourceItem { id: source, kind: &mut staff_kind }))
            .unwrap();
        assert_eq!(fx.items.get(sword).unwrap().kind.damage(), Some(12));
        assert_eq!(fx.items.get(apple).unwrap().kind.damage(), None);
    }

    #[test]
    fn test_limited_uses_never_negative() {
        let mut fx = Fixture::new();
        let mut uses = Effect::LimitedUses { remaining: 1 };
        let mut ctx = fx.ctx(false, None);
        uses.apply(&mut ctx, None).unwrap();
        assert!(uses.is_exhausted());
        uses.apply(&mut ctx, None).unwrap();
        assert_eq!(uses, Effect::LimitedUses { remaining: 0 });
    }

    #[test]
    fn test_empower_self_is_flat_and_drops_off() {
        let mut fx = Fixture::new();
        let mut kind = Item::melee_weapon("Bowblade", 15, 1, Footprint::single()).kind;
        let mut boost = Effect::EmpowerSelf { damage: 4, turns: 2 };
        let mut ctx = fx.ctx(false, None);
        let mut fire = |boost: &mut Effect, kind: &mut ItemKind| {
            boost
                .apply(&mut ctx, Some(SourceItem { id: ItemId(1), kind }))
                .unwrap()
        };

        // charge
        assert_eq!(fire(&mut boost, &mut kind), EffectOutcome::Retain);
        assert_eq!(kind.damage(), Some(19));
        // first charged attack spent, still +4 rather than +8
        assert_eq!(fire(&mut boost, &mut kind), EffectOutcome::Retain);
        assert_eq!(kind.damage(), Some(19));
        assert_eq!(boost, Effect::EmpowerSelf { damage: 4, turns: 1 });
        // second charged attack spent
        assert_eq!(fire(&mut boost, &mut kind), EffectOutcome::Remove);
        assert_eq!(kind.damage(), Some(15));
    }

    #[test]
    fn test_empower_survives_bonus_reset() {
        let mut fx = Fixture::new();
        let mut kind = Item::melee_weapon("Bowblade", 15, 1, Footprint::single()).kind;
        kind.add_damage(2);
        let mut ctx = fx.ctx(false, None);
        Effect::EmpowerSelf { damage: 4, turns: 2 }
            .apply(&mut ctx, Some(SourceItem { id: ItemId(1), kind: &mut kind }))
            .unwrap();
        assert_eq!(kind.damage(), Some(21));
        kind.reset_bonuses();
        assert_eq!(kind.damage(), Some(19));
    }

    #[test]
    fn test_triggers() {
        assert_eq!(
            Effect::AddProtectionToAdjacentArmor { amount: 1 }.trigger(),
            Trigger::Passive
        );
        assert_eq!(Effect::Heal { amount: 1 }.trigger(), Trigger::Active);
    }

    #[test]
    fn test_effect_json_tagging() {
        let effect: Effect = serde_json::from_str(r#"{"type":"PoisonEnemies","damage":6}"#).unwrap();
        assert_eq!(effect, Effect::PoisonEnemies { damage: 6 });
        let cleanse: Effect = serde_json::from_str(r#"{"type":"Cleanse"}"#).unwrap();
        assert_eq!(cleanse, Effect::Cleanse);
    }
}
