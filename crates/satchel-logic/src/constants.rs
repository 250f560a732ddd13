//! Game constants: reference grid dimensions, expansion quota and hero caps.
//!
//! Plain constants with no runtime dependency. `PackConfig::default()` and
//! `HeroConfig::default()` are built from these.

pub mod grid {
    /// Rows in the reference backpack.
    pub const ROWS: usize = 5;
    /// Columns in the reference backpack.
    pub const COLS: usize = 7;

    // Initially unlocked block: the 3×3 centre of the 5×7 grid.
    pub const INITIAL_TOP: usize = 1;
    pub const INITIAL_LEFT: usize = 2;
    pub const INITIAL_HEIGHT: usize = 3;
    pub const INITIAL_WIDTH: usize = 3;

    /// Cells the player may unlock per expansion commit.
    pub const EXPANSION_QUOTA: usize = 4;
}

pub mod hero {
    pub const START_HP: i32 = 40;
    pub const MAX_ENERGY: i32 = 3;
    pub const MAX_MANA: i32 = 2;
    /// XP needed per level (scaled by current level, minimum one level's worth).
    pub const XP_PER_LEVEL: i32 = 50;
    pub const HP_PER_LEVEL: i32 = 10;
    pub const ENERGY_PER_LEVEL: i32 = 2;
    pub const MANA_PER_LEVEL: i32 = 2;
}

pub mod curse {
    pub const DEFAULT_NAME: &str = "Curse";
    /// Damage range rolled by content generators when a curse is created.
    pub const MIN_DAMAGE: i32 = 1;
    pub const MAX_DAMAGE: i32 = 9;
}
