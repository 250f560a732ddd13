//! Pack and hero configuration.
//!
//! Defaults reproduce the reference game: a 5×7 backpack with the centre
//! 3×3 block open, four cells unlocked per expansion, and a hero starting
//! at 40 HP. Configurations are plain serde data so a caller can load them
//! from whatever file format it uses.
//!
//! ```
//! use satchel_logic::config::{validate_config, PackConfig};
//!
//! let config = PackConfig::default();
//! assert!(validate_config(&config).is_empty());
//! ```

use crate::constants::{grid, hero};
use serde::{Deserialize, Serialize};

/// What happens to the incoming value when a second currency item is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeMode {
    /// Add the incoming value to the existing pile.
    #[default]
    Accumulate,
    /// Drop the incoming value; the existing pile is only relocated to.
    Relocate,
}

/// Rectangle of cells unlocked when the pack is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    pub rows: usize,
    pub cols: usize,
    pub initial_unlocked: CellRect,
    /// Maximum cells per expansion commit.
    pub expansion_quota: usize,
    pub merge_mode: MergeMode,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            rows: grid::ROWS,
            cols: grid::COLS,
            initial_unlocked: CellRect {
                top: grid::INITIAL_TOP,
                left: grid::INITIAL_LEFT,
                height: grid::INITIAL_HEIGHT,
                width: grid::INITIAL_WIDTH,
            },
            expansion_quota: grid::EXPANSION_QUOTA,
            merge_mode: MergeMode::Accumulate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub name: String,
    pub hp: i32,
    pub max_energy: i32,
    pub max_mana: i32,
    pub defence: i32,
    pub xp_per_level: i32,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            name: "Hero".to_string(),
            hp: hero::START_HP,
            max_energy: hero::MAX_ENERGY,
            max_mana: hero::MAX_MANA,
            defence: 0,
            xp_per_level: hero::XP_PER_LEVEL,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Rows or columns is zero.
    EmptyGrid { rows: usize, cols: usize },
    /// Initial unlocked rectangle is empty or spills past the grid.
    InitialAreaOutOfGrid(CellRect),
    /// Quota of zero would make expansion impossible.
    ZeroExpansionQuota,
    NonPositiveHeroHp(i32),
    NegativeCap { field: &'static str, value: i32 },
    NonPositiveXpPerLevel(i32),
    EmptyHeroName,
}

/// Validate a pack configuration, returning all errors found.
pub fn validate_config(config: &PackConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.rows == 0 || config.cols == 0 {
        errors.push(ConfigError::EmptyGrid {
            rows: config.rows,
            cols: config.cols,
        });
    }

    let area = config.initial_unlocked;
    if area.height == 0
        || area.width == 0
        || area.top + area.height > config.rows
        || area.left + area.width > config.cols
    {
        errors.push(ConfigError::InitialAreaOutOfGrid(area));
    }

    if config.expansion_quota == 0 {
        errors.push(ConfigError::ZeroExpansionQuota);
    }

    errors
}

/// Validate a hero configuration, returning all errors found.
pub fn validate_hero_config(config: &HeroConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.hp <= 0 {
        errors.push(ConfigError::NonPositiveHeroHp(config.hp));
    }
    for (field, value) in [
        ("max_energy", config.max_energy),
        ("max_mana", config.max_mana),
        ("defence", config.defence),
    ] {
        if value < 0 {
            errors.push(ConfigError::NegativeCap { field, value });
        }
    }
    if config.xp_per_level <= 0 {
        errors.push(ConfigError::NonPositiveXpPerLevel(config.xp_per_level));
    }
    if config.name.trim().is_empty() {
        errors.push(ConfigError::EmptyHeroName);
    }

    errors
}
