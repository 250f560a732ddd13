//! Content templates and weighted drop tables.
//!
//! The catalog is static content data: which items exist, their stats, their
//! shapes, and how often each one drops. The engine never owns a catalog; a
//! caller deserializes one (see `data/item_catalog.json`) and stamps fresh
//! items out of it. Randomness also stays with the caller: `pick` takes an
//! already-rolled number so drops are reproducible from a seed.

use crate::items::{Item, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Drop-table grouping, mirroring the loot categories rooms roll on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Weapon,
    Magic,
    Armor,
    Shield,
    Food,
    Potion,
    ManaStone,
    Gold,
    Key,
}

impl Category {
    /// The category an item kind belongs to. Curses have none.
    pub fn of(kind: &ItemKind) -> Option<Category> {
        match kind {
            ItemKind::MeleeWeapon(_) | ItemKind::RangedWeapon(_) => Some(Category::Weapon),
            ItemKind::MagicWeapon(_) => Some(Category::Magic),
            ItemKind::Armor(_) => Some(Category::Armor),
            ItemKind::Shield(_) => Some(Category::Shield),
            ItemKind::Food => Some(Category::Food),
            ItemKind::Potion => Some(Category::Potion),
            ItemKind::ManaStone => Some(Category::ManaStone),
            ItemKind::Gold { .. } => Some(Category::Gold),
            ItemKind::Key => Some(Category::Key),
            ItemKind::Curse { .. } => None,
        }
    }
}

fn default_weight() -> u32 {
    1
}

/// One catalog entry: a prototype item plus its relative drop weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    /// Stable content key, e.g. `"wooden_sword"`.
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(flatten)]
    pub item: Item,
}

impl ItemTemplate {
    pub fn category(&self) -> Option<Category> {
        Category::of(&self.item.kind)
    }

    /// A fresh copy of the prototype, ready to register with a pack.
    pub fn instantiate(&self) -> Item {
        self.item.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<ItemTemplate>,
}

impl Catalog {
    pub fn find(&self, id: &str) -> Option<&ItemTemplate> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn instantiate(&self, id: &str) -> Option<Item> {
        self.find(id).map(ItemTemplate::instantiate)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &ItemTemplate> + '_ {
        self.items
            .iter()
            .filter(move |t| t.category() == Some(category))
    }

    /// Sum of weights in `category`, or of the whole catalog for `None`.
    pub fn total_weight(&self, category: Option<Category>) -> u32 {
        self.items
            .iter()
            .filter(|t| category.is_none() || t.category() == category)
            .map(|t| t.weight)
            .sum()
    }

    /// Weighted pick. `roll` is reduced modulo the total weight, so any
    /// uniformly random `u32` works. `None` if nothing has weight.
    pub fn pick(&self, category: Option<Category>, roll: u32) -> Option<&ItemTemplate> {
        let total = self.total_weight(category);
        if total == 0 {
            return None;
        }
        let mut remaining = roll % total;
        for template in self
            .items
            .iter()
            .filter(|t| category.is_none() || t.category() == category)
        {
            if remaining < template.weight {
                return Some(template);
            }
            remaining -= template.weight;
        }
        None
    }
}

/// Catalog validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Empty,
    DuplicateId(String),
    EmptyName(String),
    /// Curses are imposed by enemies, never dropped.
    CurseInCatalog(String),
    /// Weapon or guard with a non-positive base stat or negative cost.
    BadStats(String),
    /// Consumable without a use counter would never leave the pack.
    ConsumableWithoutUses(String),
}

/// Validate a catalog, returning all errors found.
pub fn validate_catalog(catalog: &Catalog) -> Vec<CatalogError> {
    let mut errors = Vec::new();
    if catalog.items.is_empty() {
        errors.push(CatalogError::Empty);
    }

    let mut seen = BTreeSet::new();
    for template in &catalog.items {
        if !seen.insert(template.id.as_str()) {
            errors.push(CatalogError::DuplicateId(template.id.clone()));
        }
        let item = &template.item;
        if item.name.trim().is_empty() {
            errors.push(CatalogError::EmptyName(template.id.clone()));
        }
        if item.kind.is_curse() {
            errors.push(CatalogError::CurseInCatalog(template.id.clone()));
        }
        let bad_weapon = item.kind.damage().is_some_and(|d| d <= 0);
        let bad_guard = item.kind.protection().is_some_and(|p| p <= 0);
        let bad_cost = match &item.kind {
            ItemKind::MeleeWeapon(w) | ItemKind::RangedWeapon(w) | ItemKind::MagicWeapon(w) => {
                w.cost < 0
            }
            ItemKind::Armor(g) | ItemKind::Shield(g) => g.energy_cost < 0,
            _ => false,
        };
        if bad_weapon || bad_guard || bad_cost {
            errors.push(CatalogError::BadStats(template.id.clone()));
        }
        let has_counter = item
            .effects
            .iter()
            .any(|e| matches!(e, crate::effects::Effect::LimitedUses { .. }));
        if item.kind.is_consumable() && !has_counter {
            errors.push(CatalogError::ConsumableWithoutUses(template.id.clone()));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::shape::Footprint;

    fn template(id: &str, weight: u32, item: Item) -> ItemTemplate {
        ItemTemplate {
            id: id.to_string(),
            weight,
            item,
        }
    }

    fn small_catalog() -> Catalog {
        Catalog {
            items: vec![
                template(
                    "wooden_sword",
                    70,
                    Item::melee_weapon("Wooden Sword", 10, 1, Footprint::vertical_bar(3)),
                ),
                template(
                    "hatchet",
                    30,
                    Item::melee_weapon("Hatchet", 20, 1, Footprint::vertical_bar(4)),
                ),
                template(
                    "apple",
                    1,
                    Item::food(
                        "Apple",
                        vec![Effect::Heal { amount: 2 }, Effect::LimitedUses { remaining: 1 }],
                    ),
                ),
            ],
        }
    }

    #[test]
    fn test_find_and_instantiate() {
        let catalog = small_catalog();
        let sword = catalog.instantiate("hatchet").unwrap();
        assert_eq!(sword.kind.damage(), Some(20));
        assert!(catalog.instantiate("excalibur").is_none());
    }

    #[test]
    fn test_weighted_pick() {
        let catalog = small_catalog();
        let pick = |roll| catalog.pick(Some(Category::Weapon), roll).map(|t| t.id.as_str());
        assert_eq!(pick(0), Some("wooden_sword"));
        assert_eq!(pick(69), Some("wooden_sword"));
        assert_eq!(pick(70), Some("hatchet"));
        assert_eq!(pick(100), Some("wooden_sword")); // wraps
        assert_eq!(catalog.pick(Some(Category::Key), 3), None);
        assert_eq!(catalog.total_weight(None), 101);
    }

    #[test]
    fn test_validation() {
        let mut catalog = small_catalog();
        assert!(validate_catalog(&catalog).is_empty());

        catalog.items.push(template("apple", 1, Item::food("Apple", vec![])));
        catalog.items.push(template("curse", 1, Item::curse(3)));
        let errs = validate_catalog(&catalog);
        assert!(errs.contains(&CatalogError::DuplicateId("apple".into())));
        assert!(errs.contains(&CatalogError::ConsumableWithoutUses("apple".into())));
        assert!(errs.contains(&CatalogError::CurseInCatalog("curse".into())));
        assert!(validate_catalog(&Catalog::default()).contains(&CatalogError::Empty));
    }

    #[test]
    fn test_template_json() {
        let json = r#"{
            "id": "rough_buckler",
            "weight": 70,
            "name": "Rough Buckler",
            "rarity": 2,
            "footprint": [{"dx": 0, "dy": 0}],
            "kind": "Shield",
            "base_protection": 7,
            "energy_cost": 1
        }"#;
        let template: ItemTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.category(), Some(Category::Shield));
        assert_eq!(template.instantiate().kind.protection(), Some(7));
    }
}
