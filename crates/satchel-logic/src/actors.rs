//! Hero and enemy state that item effects read and mutate.
//!
//! Only the stat rules items depend on live here (caps, damage mitigation,
//! poison, levelling, the curse ledger). Choosing enemy actions and running
//! the combat loop belongs to the caller.

use crate::config::HeroConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub hp_max: i32,
    pub hp: i32,
    pub energy: i32,
    pub mana: i32,
    pub max_energy: i32,
    pub max_mana: i32,
    pub level: i32,
    pub xp: i32,
    pub xp_per_level: i32,
    /// Protection restored at the start of each turn.
    pub defence: i32,
    /// Damage absorbed per enemy hit this turn.
    pub protection: i32,
    /// Poison stacks: lose this much HP at end of turn, then one stack wears off.
    pub poison: i32,
    pending_curses: u32,
    curses_received_in_battle: u32,
}

impl Hero {
    pub fn new(config: &HeroConfig) -> Self {
        Self {
            name: config.name.clone(),
            hp_max: config.hp,
            hp: config.hp,
            energy: config.max_energy,
            mana: config.max_mana,
            max_energy: config.max_energy,
            max_mana: config.max_mana,
            level: 0,
            xp: 0,
            xp_per_level: config.xp_per_level,
            defence: config.defence,
            protection: config.defence,
            poison: 0,
            pending_curses: 0,
            curses_received_in_battle: 0,
        }
    }

    /// Clamp into `0..=hp_max`. Returns true if HP went up.
    pub fn set_hp(&mut self, amount: i32) -> bool {
        let healing = amount > self.hp;
        self.hp = amount.clamp(0, self.hp_max);
        healing
    }

    pub fn heal(&mut self, amount: i32) -> bool {
        self.set_hp(self.hp + amount)
    }

    /// Energy never exceeds the cap; it may go negative only through
    /// content that charges more than is held, which callers should prevent.
    pub fn set_energy(&mut self, amount: i32) {
        self.energy = amount.min(self.max_energy);
    }

    pub fn set_mana(&mut self, amount: i32) {
        self.mana = amount.min(self.max_mana);
    }

    /// Spend `cost` energy if available.
    pub fn try_spend_energy(&mut self, cost: i32) -> bool {
        if self.energy >= cost {
            self.energy -= cost;
            true
        } else {
            false
        }
    }

    pub fn try_spend_mana(&mut self, cost: i32) -> bool {
        if self.mana >= cost {
            self.mana -= cost;
            true
        } else {
            false
        }
    }

    /// Take an enemy hit mitigated by protection. Returns damage dealt.
    pub fn take_hit(&mut self, attack: i32) -> i32 {
        let dealt = (attack - self.protection).max(0);
        self.set_hp(self.hp - dealt);
        dealt
    }

    /// Unmitigated damage (curses, poison).
    pub fn lose_hp(&mut self, amount: i32) {
        self.set_hp(self.hp - amount.max(0));
    }

    pub fn add_poison(&mut self, stacks: i32) {
        self.poison = (self.poison + stacks).max(0);
    }

    pub fn cleanse(&mut self) {
        self.poison = 0;
    }

    /// Apply one end-of-turn poison tick. Returns damage dealt.
    pub fn tick_poison(&mut self) -> i32 {
        if self.poison <= 0 {
            return 0;
        }
        let dealt = self.poison;
        self.lose_hp(dealt);
        self.poison -= 1;
        dealt
    }

    /// Start-of-turn refresh: protection back to defence, energy and mana full.
    pub fn refresh_for_turn(&mut self) {
        self.protection = self.defence;
        self.energy = self.max_energy;
        self.mana = self.max_mana;
    }

    pub fn gain_xp(&mut self, value: i32) {
        self.xp += value.max(0);
    }

    /// Convert banked XP into levels. Returns levels gained.
    pub fn level_up(&mut self) -> i32 {
        let mut gained = 0;
        loop {
            let threshold = self.level.max(1) * self.xp_per_level;
            if threshold <= 0 || self.xp < threshold {
                break;
            }
            self.xp -= threshold;
            self.level += 1;
            self.hp_max += crate::constants::hero::HP_PER_LEVEL;
            self.max_energy += crate::constants::hero::ENERGY_PER_LEVEL;
            self.max_mana += crate::constants::hero::MANA_PER_LEVEL;
            gained += 1;
        }
        gained
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Record that an enemy cursed the hero.
    pub fn apply_curse(&mut self) {
        self.pending_curses += 1;
        self.curses_received_in_battle += 1;
    }

    /// Take one pending curse, if any.
    pub fn pop_curse(&mut self) -> bool {
        if self.pending_curses > 0 {
            self.pending_curses -= 1;
            true
        } else {
            false
        }
    }

    /// Settle a curse that was placed in the pack: consumes a pending
    /// curse if there is one, otherwise counts it as received.
    pub fn settle_curse(&mut self) {
        if !self.pop_curse() {
            self.curses_received_in_battle += 1;
        }
    }

    pub fn pending_curses(&self) -> u32 {
        self.pending_curses
    }

    pub fn curses_received_in_battle(&self) -> u32 {
        self.curses_received_in_battle
    }

    pub fn reset_curses_received_in_battle(&mut self) {
        self.curses_received_in_battle = 0;
    }
}

impl Default for Hero {
    fn default() -> Self {
        Self::new(&HeroConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub hp_max: i32,
    pub hp: i32,
    pub attack: i32,
    pub base_attack: i32,
    pub defense: i32,
    pub xp: i32,
    /// Set by the combat layer when the enemy chose to defend this turn.
    pub defending: bool,
}

impl Enemy {
    pub fn new(name: impl Into<String>, hp: i32, attack: i32, defense: i32, xp: i32) -> Self {
        Self {
            name: name.into(),
            hp_max: hp,
            hp,
            attack,
            base_attack: attack,
            defense,
            xp,
            defending: false,
        }
    }

    /// Apply an item attack. Defense only counts while defending.
    pub fn receive_attack(&mut self, damage: i32) -> i32 {
        let dealt = if self.defending {
            (damage - self.defense).max(0)
        } else {
            damage.max(0)
        };
        self.hp = (self.hp - dealt).max(0);
        dealt
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.hp_max);
    }

    /// Attack can be debuffed down to zero, never below.
    pub fn weaken(&mut self, amount: i32) {
        self.attack = (self.attack - amount).max(0);
    }

    pub fn reset_to_base(&mut self) {
        self.attack = self.base_attack;
        self.defending = false;
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}
