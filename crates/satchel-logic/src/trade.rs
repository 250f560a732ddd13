//! Buying and selling against the pack's gold pile.

use crate::error::PackError;
use crate::grid::ItemId;
use crate::placement::Backpack;

/// Gold currently held, or 0 with no pile on the grid.
pub fn funds(pack: &Backpack) -> u32 {
    pack.currency().map_or(0, |(_, value)| value)
}

/// Pay `price` from the gold pile. Returns the gold left.
pub fn purchase(pack: &mut Backpack, price: u32) -> Result<u32, PackError> {
    let pile = pack.currency_mut().ok_or(PackError::NoCurrency)?;
    if *pile < price {
        return Err(PackError::InsufficientFunds {
            price,
            available: *pile,
        });
    }
    *pile -= price;
    let left = *pile;
    log::info!("paid {} gold, {} left", price, left);
    Ok(left)
}

/// Discard `id` and credit its price to the gold pile. Returns the price.
///
/// The pile must exist; the item is kept when it does not.
pub fn sell(pack: &mut Backpack, id: ItemId) -> Result<u32, PackError> {
    let item = pack.item(id).ok_or(PackError::NotPresent(id))?;
    if item.kind.is_currency() {
        return Err(PackError::CurrencyNotSellable(id));
    }
    let price = item.price();
    let pile = pack.currency_mut().ok_or(PackError::NoCurrency)?;
    *pile = pile.saturating_add(price);
    if let Some(sold) = pack.discard(id) {
        log::info!("sold {} {} for {} gold", sold.name, id, price);
    }
    Ok(price)
}
