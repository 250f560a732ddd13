//! Pure backpack-grid logic for Satchel.
//!
//! This crate contains the inventory engine of a grid-based bag-building
//! roguelike, independent of any renderer, input layer, or dungeon
//! generator. Functions take plain data and return results, so every rule
//! is unit-testable and the same engine can back a desktop client, a
//! headless harness, or a server.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actors`] | Hero and enemy stats, damage mitigation, poison, levelling |
//! | [`adjacency`] | Which items orthogonally touch which |
//! | [`catalog`] | Item templates, weighted drop tables, content validation |
//! | [`config`] | Pack and hero configuration with validation |
//! | [`constants`] | Reference grid size, initial block, quotas, hero caps |
//! | [`effects`] | Effect sum type and the context effects execute in |
//! | [`error`] | Recoverable pack errors |
//! | [`grid`] | Occupancy matrix, item→cells map, snapshots |
//! | [`items`] | Item kinds, behavior hooks, the item arena |
//! | [`placement`] | `Backpack`: placement, merging, forcing, rotation, expansion |
//! | [`shape`] | Footprints and rotation |
//! | [`trade`] | Buying and selling against the gold pile |
//! | [`turn`] | Item use, end-of-turn upkeep, curse injection |

pub mod actors;
pub mod adjacency;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod grid;
pub mod items;
pub mod placement;
pub mod shape;
pub mod trade;
pub mod turn;
