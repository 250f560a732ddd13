//! Recoverable failures of pack operations.
//!
//! Every mutating call on the pack returns one of these instead of
//! panicking; the caller decides whether to revert speculative UI state.

use crate::grid::ItemId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// A target cell lies outside the grid.
    #[error("cell ({row}, {col}) is outside the pack")]
    OutOfBounds { row: i32, col: i32 },
    /// A target cell is locked or already holds another item.
    #[error("cell ({row}, {col}) is locked or occupied")]
    Blocked { row: i32, col: i32 },
    /// The item is unknown to the engine or not on the grid.
    #[error("item {0} is not present")]
    NotPresent(ItemId),
    /// The unlock request touches an unlocked cell or is not reachable from the unlocked area.
    #[error("expansion must target locked cells bordering the unlocked area")]
    InvalidExpansion,
    #[error("expansion of {requested} cells exceeds the quota of {quota}")]
    QuotaExceeded { requested: usize, quota: usize },
    /// Forced placement was requested for something other than a curse.
    #[error("item {0} is not a curse and cannot be forced into the pack")]
    NotACurse(ItemId),
    #[error("no currency item in the pack")]
    NoCurrency,
    #[error("price {price} exceeds the {available} gold available")]
    InsufficientFunds { price: u32, available: u32 },
    #[error("item {0} is the currency pile and cannot be sold")]
    CurrencyNotSellable(ItemId),
}
