//! Item model: a tagged kind, a footprint, and the three behavior hooks.
//!
//! Items are plain data owned by an [`ItemArena`] and referred to everywhere
//! else by [`ItemId`]. Kind-specific behavior is dispatched through the
//! [`ItemBehavior`] trait:
//!
//! - `on_use`: deliberate activation (attack, block, eat, drink...)
//! - `on_passive`: fire the item's passive effects (adjacency bonuses)
//! - `reset_to_base`: drop every bonus accumulated since the last reset

use crate::effects::{Effect, EffectContext, EffectError, EffectOutcome, SourceItem, Trigger};
use crate::grid::ItemId;
use crate::shape::Footprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attack stats shared by melee, ranged, and magic weapons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub base_damage: i32,
    /// Energy for melee/ranged, mana for magic.
    pub cost: i32,
    /// Accumulated adjacency bonuses; cleared by `reset_to_base`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub bonus: i32,
    /// Timed self boost from `EmpowerSelf`. Survives `reset_to_base`; the
    /// effect clears it when its turns run out.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub empower: i32,
}

/// Block stats shared by armor and shields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardStats {
    pub base_protection: i32,
    pub energy_cost: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub bonus: i32,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ItemKind {
    MeleeWeapon(WeaponStats),
    RangedWeapon(WeaponStats),
    MagicWeapon(WeaponStats),
    Armor(GuardStats),
    Shield(GuardStats),
    Food,
    Potion,
    ManaStone,
    /// The pack's currency accumulator.
    Gold { value: u32 },
    Key,
    /// Imposed on the hero; hurts when used and cannot be rotated.
    Curse { damage: i32 },
}

impl ItemKind {
    pub fn is_weapon(&self) -> bool {
        matches!(
            self,
            ItemKind::MeleeWeapon(_) | ItemKind::RangedWeapon(_) | ItemKind::MagicWeapon(_)
        )
    }

    /// Armor and shields both count as armor for adjacency bonuses.
    pub fn is_armor(&self) -> bool {
        matches!(self, ItemKind::Armor(_) | ItemKind::Shield(_))
    }

    pub fn is_currency(&self) -> bool {
        matches!(self, ItemKind::Gold { .. })
    }

    pub fn is_curse(&self) -> bool {
        matches!(self, ItemKind::Curse { .. })
    }

    pub fn is_consumable(&self) -> bool {
        matches!(self, ItemKind::Food | ItemKind::Potion | ItemKind::ManaStone)
    }

    /// Current damage, for weapons.
    pub fn damage(&self) -> Option<i32> {
        self.weapon().map(|w| w.base_damage + w.bonus + w.empower)
    }

    /// Current protection, for armor and shields.
    pub fn protection(&self) -> Option<i32> {
        self.guard().map(|g| g.base_protection + g.bonus)
    }

    pub fn gold_value(&self) -> Option<u32> {
        match self {
            ItemKind::Gold { value } => Some(*value),
            _ => None,
        }
    }

    fn weapon(&self) -> Option<&WeaponStats> {
        match self {
            ItemKind::MeleeWeapon(w) | ItemKind::RangedWeapon(w) | ItemKind::MagicWeapon(w) => {
                Some(w)
            }
            _ => None,
        }
    }

    fn weapon_mut(&mut self) -> Option<&mut WeaponStats> {
        match self {
            ItemKind::MeleeWeapon(w) | ItemKind::RangedWeapon(w) | ItemKind::MagicWeapon(w) => {
                Some(w)
            }
            _ => None,
        }
    }

    fn guard(&self) -> Option<&GuardStats> {
        match self {
            ItemKind::Armor(g) | ItemKind::Shield(g) => Some(g),
            _ => None,
        }
    }

    fn guard_mut(&mut self) -> Option<&mut GuardStats> {
        match self {
            ItemKind::Armor(g) | ItemKind::Shield(g) => Some(g),
            _ => None,
        }
    }

    /// No-op for non-weapons.
    pub fn add_damage(&mut self, delta: i32) {
        if let Some(w) = self.weapon_mut() {
            w.bonus += delta;
        }
    }

    /// Active timed boost, 0 for non-weapons.
    pub fn empower(&self) -> i32 {
        self.weapon().map_or(0, |w| w.empower)
    }

    /// Set (not add) the timed boost. No-op for non-weapons.
    pub fn set_empower(&mut self, amount: i32) {
        if let Some(w) = self.weapon_mut() {
            w.empower = amount;
        }
    }

    /// No-op for non-armor.
    pub fn add_protection(&mut self, delta: i32) {
        if let Some(g) = self.guard_mut() {
            g.bonus += delta;
        }
    }

    pub fn reset_bonuses(&mut self) {
        if let Some(w) = self.weapon_mut() {
            w.bonus = 0;
        }
        if let Some(g) = self.guard_mut() {
            g.bonus = 0;
        }
    }
}

/// Result of an active use, telling the engine what to do with the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseOutcome {
    /// Fired; the item stays in the pack.
    Used,
    /// Fired and spent; the engine must evict it.
    Consumed,
    /// Not enough energy or mana; nothing happened.
    Unaffordable,
    /// The item has no active behavior (gold, keys).
    Inert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Also the purchase price.
    #[serde(default)]
    pub rarity: u32,
    footprint: Footprint,
    /// Quarter turns applied since creation, 0..=3.
    #[serde(default)]
    rotation: u8,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind, footprint: Footprint) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rarity: 0,
            footprint,
            rotation: 0,
            effects: Vec::new(),
            kind,
        }
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_rarity(mut self, rarity: u32) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn melee_weapon(name: &str, damage: i32, energy_cost: i32, footprint: Footprint) -> Self {
        Self::new(
            name,
            ItemKind::MeleeWeapon(WeaponStats {
                base_damage: damage,
                cost: energy_cost,
                bonus: 0,
                empower: 0,
            }),
            footprint,
        )
    }

    pub fn ranged_weapon(name: &str, damage: i32, energy_cost: i32, footprint: Footprint) -> Self {
        Self::new(
            name,
            ItemKind::RangedWeapon(WeaponStats {
                base_damage: damage,
                cost: energy_cost,
                bonus: 0,
                empower: 0,
            }),
            footprint,
        )
    }

    pub fn magic_weapon(name: &str, damage: i32, mana_cost: i32, footprint: Footprint) -> Self {
        Self::new(
            name,
            ItemKind::MagicWeapon(WeaponStats {
                base_damage: damage,
                cost: mana_cost,
                bonus: 0,
                empower: 0,
            }),
            footprint,
        )
    }

    pub fn armor(name: &str, protection: i32, energy_cost: i32) -> Self {
        Self::new(
            name,
            ItemKind::Armor(GuardStats {
                base_protection: protection,
                energy_cost,
                bonus: 0,
            }),
            Footprint::square(2),
        )
    }

    pub fn shield(name: &str, protection: i32, energy_cost: i32, footprint: Footprint) -> Self {
        Self::new(
            name,
            ItemKind::Shield(GuardStats {
                base_protection: protection,
                energy_cost,
                bonus: 0,
            }),
            footprint,
        )
    }

    /// Single-use 1×1 food unless effects say otherwise.
    pub fn food(name: &str, effects: Vec<Effect>) -> Self {
        Self::new(name, ItemKind::Food, Footprint::single()).with_effects(effects)
    }

    pub fn potion(name: &str, effects: Vec<Effect>) -> Self {
        Self::new(name, ItemKind::Potion, Footprint::single()).with_effects(effects)
    }

    pub fn mana_stone(name: &str, effects: Vec<Effect>) -> Self {
        Self::new(name, ItemKind::ManaStone, Footprint::single()).with_effects(effects)
    }

    pub fn gold(value: u32) -> Self {
        Self::new("Gold", ItemKind::Gold { value }, Footprint::single())
            .with_description(format!("A pile of {} gold coins.", value))
    }

    pub fn key() -> Self {
        Self::new("Key", ItemKind::Key, Footprint::single()).with_rarity(1)
    }

    /// The default stem-and-hook curse.
    pub fn curse(damage: i32) -> Self {
        Self::new(
            crate::constants::curse::DEFAULT_NAME,
            ItemKind::Curse { damage },
            Footprint::stem_hook(),
        )
        .with_description("A dark energy taking the shape of an L.")
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn price(&self) -> u32 {
        match self.kind {
            ItemKind::Curse { .. } => 0,
            _ => self.rarity,
        }
    }

    pub fn can_rotate(&self) -> bool {
        !self.kind.is_curse()
    }

    /// Footprint after one more clockwise turn, or `None` for curses.
    pub fn next_rotation(&self) -> Option<Footprint> {
        self.can_rotate().then(|| self.footprint.rotate_clockwise())
    }

    /// Turn the item a quarter clockwise. Returns false for curses.
    pub fn rotate(&mut self) -> bool {
        match self.next_rotation() {
            Some(next) => {
                self.set_rotated_footprint(next);
                true
            }
            None => false,
        }
    }

    /// Replace the footprint with `next_rotation()`'s result.
    pub(crate) fn set_rotated_footprint(&mut self, footprint: Footprint) {
        self.footprint = footprint;
        self.rotation = (self.rotation + 1) % 4;
    }

    /// True once any use counter has run out.
    pub fn is_exhausted(&self) -> bool {
        self.effects.iter().any(Effect::is_exhausted)
    }

    fn spent_or_used(&self) -> UseOutcome {
        if self.is_exhausted() {
            UseOutcome::Consumed
        } else {
            UseOutcome::Used
        }
    }

    /// Fire every effect with `trigger`, dropping those that ask to be removed.
    ///
    /// Stops at the first error; effects already fired keep their results.
    fn run_effects(
        &mut self,
        id: ItemId,
        ctx: &mut EffectContext<'_>,
        trigger: Trigger,
    ) -> Result<(), EffectError> {
        let effects = std::mem::take(&mut self.effects);
        let mut kept = Vec::with_capacity(effects.len());
        let mut result = Ok(());

        for mut effect in effects {
            if result.is_ok() && effect.trigger() == trigger {
                let source = SourceItem {
                    id,
                    kind: &mut self.kind,
                };
                match effect.apply(ctx, Some(source)) {
                    Ok(EffectOutcome::Remove) => continue,
                    Ok(EffectOutcome::Retain) => {}
                    Err(e) => result = Err(e),
                }
            }
            kept.push(effect);
        }

        self.effects = kept;
        result
    }
}

/// The three hooks every item kind implements.
pub trait ItemBehavior {
    fn on_use(&mut self, id: ItemId, ctx: &mut EffectContext<'_>)
        -> Result<UseOutcome, EffectError>;

    fn on_passive(&mut self, id: ItemId, ctx: &mut EffectContext<'_>) -> Result<(), EffectError>;

    fn reset_to_base(&mut self);
}

impl ItemBehavior for Item {
    fn on_use(
        &mut self,
        id: ItemId,
        ctx: &mut EffectContext<'_>,
    ) -> Result<UseOutcome, EffectError> {
        match &self.kind {
            ItemKind::MeleeWeapon(w) | ItemKind::RangedWeapon(w) => {
                let (damage, cost) = (w.base_damage + w.bonus + w.empower, w.cost);
                // Resolve the target before paying so a bad call costs nothing.
                ctx.target_mut()?;
                if !ctx.hero.try_spend_energy(cost) {
                    return Ok(UseOutcome::Unaffordable);
                }
                ctx.target_mut()?.receive_attack(damage);
                self.run_effects(id, ctx, Trigger::Active)?;
                Ok(self.spent_or_used())
            }
            ItemKind::MagicWeapon(w) => {
                let (damage, cost) = (w.base_damage + w.bonus + w.empower, w.cost);
                ctx.target_mut()?;
                if !ctx.hero.try_spend_mana(cost) {
                    return Ok(UseOutcome::Unaffordable);
                }
                ctx.target_mut()?.receive_attack(damage);
                self.run_effects(id, ctx, Trigger::Active)?;
                Ok(self.spent_or_used())
            }
            ItemKind::Armor(g) | ItemKind::Shield(g) => {
                let (protection, cost) = (g.base_protection + g.bonus, g.energy_cost);
                if !ctx.hero.try_spend_energy(cost) {
                    return Ok(UseOutcome::Unaffordable);
                }
                ctx.hero.protection += protection;
                self.run_effects(id, ctx, Trigger::Active)?;
                Ok(self.spent_or_used())
            }
            ItemKind::Food | ItemKind::Potion | ItemKind::ManaStone => {
                self.run_effects(id, ctx, Trigger::Active)?;
                Ok(self.spent_or_used())
            }
            ItemKind::Curse { damage } => {
                ctx.hero.lose_hp(*damage);
                Ok(UseOutcome::Consumed)
            }
            ItemKind::Gold { .. } | ItemKind::Key => Ok(UseOutcome::Inert),
        }
    }

    fn on_passive(&mut self, id: ItemId, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        self.run_effects(id, ctx, Trigger::Passive)
    }

    fn reset_to_base(&mut self) {
        self.kind.reset_bonuses();
    }
}

/// Owner of every item the engine knows about, placed or not.
#[derive(Debug, Clone, Default)]
pub struct ItemArena {
    next_id: u32,
    items: BTreeMap<ItemId, Item>,
}

impl ItemArena {
    /// Store `item` under a fresh id. Ids are never reused.
    pub fn insert(&mut self, item: Item) -> ItemId {
        self.next_id += 1;
        let id = ItemId(self.next_id);
        self.items.insert(id, item);
        id
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        self.items.remove(&id)
    }

    /// Put back an item detached with `remove`, keeping its id.
    pub(crate) fn restore(&mut self, id: ItemId, item: Item) {
        self.items.insert(id, item);
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter().map(|(&id, item)| (id, item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ItemId, &mut Item)> {
        self.items.iter_mut().map(|(&id, item)| (id, item))
    }
}
