//! Builds the working price table: policy filter, recipe join, display names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::entities::{ItemRow, PriceRow, PriceTable, ReagentSlot, Recipe, UnitPrice};
use super::resolution::DEFAULT_MAX_PASSES;

/// The standard vendor-stock policy: `(class, subclass, display name)` for
/// every item kind that belongs in the price table. Quest items, junk,
/// permanent items and lockpicks stay out.
pub const VENDOR_STOCK_CLASSES: &[(i32, i32, &str)] = &[
    // Consumables
    (0, 0, "Consumable"),
    (0, 1, "Potion"),
    (0, 2, "Elixir"),
    (0, 3, "Flask"),
    (0, 4, "Scroll"),
    (0, 5, "Food & Drink"),
    (0, 6, "Item Enhancement"),
    (0, 7, "Bandage"),
    (0, 8, "Other"),
    // Containers
    (1, 0, "Bag"),
    (1, 1, "Soul Bag"),
    (1, 2, "Herb Bag"),
    (1, 3, "Enchanting Bag"),
    (1, 4, "Engineering Bag"),
    (1, 5, "Gem Bag"),
    (1, 6, "Mining Bag"),
    (1, 7, "Leatherworking Bag"),
    (1, 8, "Inscription Bag"),
    // Weapons
    (2, 0, "One-Handed Axe"),
    (2, 1, "Two-Handed Axe"),
    (2, 2, "Bow"),
    (2, 3, "Gun"),
    (2, 4, "One-Handed Mace"),
    (2, 5, "Two-Handed Mace"),
    (2, 6, "Polearm"),
    (2, 7, "One-Handed Sword"),
    (2, 8, "Two-Handed Sword"),
    (2, 10, "Staff"),
    (2, 13, "Fist Weapon"),
    (2, 14, "Miscellaneous Weapon"),
    (2, 15, "Dagger"),
    (2, 16, "Thrown"),
    (2, 18, "Crossbow"),
    (2, 19, "Wand"),
    (2, 20, "Fishing Pole"),
    // Gems
    (3, 0, "Red Gem"),
    (3, 1, "Blue Gem"),
    (3, 2, "Yellow Gem"),
    (3, 3, "Purple Gem"),
    (3, 4, "Green Gem"),
    (3, 5, "Orange Gem"),
    (3, 6, "Meta Gem"),
    (3, 7, "Simple Gem"),
    (3, 8, "Prismatic Gem"),
    // Armor
    (4, 0, "Miscellaneous Armor"),
    (4, 1, "Cloth"),
    (4, 2, "Leather"),
    (4, 3, "Mail"),
    (4, 4, "Plate"),
    (4, 6, "Shield"),
    (4, 7, "Libram"),
    (4, 8, "Idol"),
    (4, 9, "Totem"),
    (4, 10, "Sigil"),
    // Reagents
    (5, 0, "Reagent"),
    // Projectiles
    (6, 2, "Arrow"),
    (6, 3, "Bullet"),
    // Trade goods
    (7, 1, "Parts"),
    (7, 2, "Explosives"),
    (7, 3, "Devices"),
    (7, 4, "Jewelcrafting"),
    (7, 5, "Cloth Material"),
    (7, 6, "Leather Material"),
    (7, 7, "Metal & Stone"),
    (7, 8, "Meat"),
    (7, 9, "Herb"),
    (7, 10, "Elemental"),
    (7, 11, "Other Trade Goods"),
    (7, 12, "Enchanting Material"),
    (7, 13, "Materials"),
    (7, 14, "Armor Enchantment"),
    (7, 15, "Weapon Enchantment"),
    // Recipes
    (9, 0, "Book"),
    (9, 1, "Leatherworking Pattern"),
    (9, 2, "Tailoring Pattern"),
    (9, 3, "Engineering Schematic"),
    (9, 4, "Blacksmithing Plans"),
    (9, 5, "Cooking Recipe"),
    (9, 6, "Alchemy Recipe"),
    (9, 7, "First Aid Manual"),
    (9, 8, "Enchanting Formula"),
    (9, 9, "Fishing Book"),
    (9, 10, "Jewelcrafting Design"),
    // Quivers
    (11, 2, "Quiver"),
    (11, 3, "Ammo Pouch"),
    // Keys
    (13, 0, "Key"),
    // Miscellaneous
    (15, 1, "Spell Reagent"),
    (15, 2, "Companion Pet"),
    (15, 3, "Holiday Item"),
    (15, 4, "Other Miscellaneous"),
    (15, 5, "Mount"),
    // Glyphs
    (16, 1, "Warrior Glyph"),
    (16, 2, "Paladin Glyph"),
    (16, 3, "Hunter Glyph"),
    (16, 4, "Rogue Glyph"),
    (16, 5, "Priest Glyph"),
    (16, 6, "Death Knight Glyph"),
    (16, 7, "Shaman Glyph"),
    (16, 8, "Mage Glyph"),
    (16, 9, "Warlock Glyph"),
    (16, 11, "Druid Glyph"),
];

/// Which items belong in the price table at all, plus the solver's pass cap.
///
/// External policy rather than business logic: the defaults match the
/// standard vendor-stock policy, and a JSON config file swaps the whole
/// policy without a code change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Allowed `(class, subclass)` pairs.
    pub item_classes: Vec<(i32, i32)>,
    /// Allowed quality tiers. Poor and the unobtainable tiers above
    /// Legendary are out by default.
    pub qualities: Vec<i32>,
    /// Relaxation pass cap for the resolution engine.
    pub max_passes: usize,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            item_classes: VENDOR_STOCK_CLASSES
                .iter()
                .map(|(class, subclass, _)| (*class, *subclass))
                .collect(),
            qualities: vec![1, 2, 3, 4, 5],
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl PricingPolicy {
    pub fn allows(&self, item: &ItemRow) -> bool {
        self.item_classes.contains(&(item.class, item.subclass))
            && self.qualities.contains(&item.quality)
    }
}

/// Display names for the coded attribute columns. Unknown codes fall back to
/// the numeric code so the table stays readable with a partial lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lookup {
    pub classes: HashMap<i32, String>,
    /// Keyed `"class-subclass"`.
    pub subclasses: HashMap<String, String>,
    pub qualities: HashMap<i32, String>,
    pub bindings: HashMap<i32, String>,
}

impl Default for Lookup {
    fn default() -> Self {
        let classes = [
            (0, "Consumable"),
            (1, "Container"),
            (2, "Weapon"),
            (3, "Gem"),
            (4, "Armor"),
            (5, "Reagent"),
            (6, "Projectile"),
            (7, "Trade Goods"),
            (8, "Generic"),
            (9, "Recipe"),
            (10, "Money"),
            (11, "Quiver"),
            (12, "Quest"),
            (13, "Key"),
            (14, "Permanent"),
            (15, "Miscellaneous"),
            (16, "Glyph"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

        let subclasses = VENDOR_STOCK_CLASSES
            .iter()
            .map(|(class, subclass, name)| (format!("{class}-{subclass}"), name.to_string()))
            .collect();

        let qualities = [
            (0, "Poor"),
            (1, "Common"),
            (2, "Uncommon"),
            (3, "Rare"),
            (4, "Epic"),
            (5, "Legendary"),
            (6, "Artifact"),
            (7, "Heirloom"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

        let bindings = [
            (0, "None"),
            (1, "Bind on Pickup"),
            (2, "Bind on Equip"),
            (3, "Bind on Use"),
            (4, "Quest Item"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

        Self {
            classes,
            subclasses,
            qualities,
            bindings,
        }
    }
}

impl Lookup {
    pub fn class_name(&self, class: i32) -> String {
        self.classes
            .get(&class)
            .cloned()
            .unwrap_or_else(|| class.to_string())
    }

    pub fn subclass_name(&self, class: i32, subclass: i32) -> String {
        let key = format!("{class}-{subclass}");
        self.subclasses.get(&key).cloned().unwrap_or(key)
    }

    pub fn quality_name(&self, quality: i32) -> String {
        self.qualities
            .get(&quality)
            .cloned()
            .unwrap_or_else(|| quality.to_string())
    }

    pub fn binding_name(&self, binding: i32) -> String {
        self.bindings
            .get(&binding)
            .cloned()
            .unwrap_or_else(|| binding.to_string())
    }
}

/// Joins item attributes with the recipe set into the working table.
///
/// Items pass the policy filter, then left-join recipes on the output item
/// id: items without a recipe keep empty reagent slots. Reagent display
/// names resolve against the full item set, so reagents that are not
/// themselves sellable still show up by name. Every row starts unresolved
/// with a neutral markup and an unknown purchasable flag.
pub fn build_price_table(
    items: &[ItemRow],
    recipes: &[Recipe],
    policy: &PricingPolicy,
    lookup: &Lookup,
) -> PriceTable {
    let names: HashMap<u32, &str> = items
        .iter()
        .map(|item| (item.entry, item.name.as_str()))
        .collect();
    let recipes_by_output: HashMap<u32, &Recipe> = recipes
        .iter()
        .map(|recipe| (recipe.item_id, recipe))
        .collect();

    let mut table = PriceTable::new();
    for item in items {
        if !policy.allows(item) {
            continue;
        }
        let recipe = recipes_by_output.get(&item.entry);
        let reagents = recipe
            .map(|recipe| {
                recipe
                    .reagents
                    .iter()
                    .map(|reagent| ReagentSlot {
                        item_id: reagent.item_id,
                        name: names.get(&reagent.item_id).map(|name| name.to_string()),
                        count: reagent.count,
                    })
                    .collect()
            })
            .unwrap_or_default();
        table.insert(PriceRow {
            item_id: item.entry,
            name: item.name.clone(),
            unit_price: UnitPrice::Unresolved,
            markup: 1.0,
            purchasable: None,
            category: lookup.class_name(item.class),
            subcategory: lookup.subclass_name(item.class, item.subclass),
            quality: lookup.quality_name(item.quality),
            binding: lookup.binding_name(item.binding),
            item_level: item.item_level,
            required_level: item.required_level,
            produced_count: recipe.map(|recipe| recipe.count),
            reagents,
        });
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Reagent;

    fn item(entry: u32, name: &str, class: i32, subclass: i32, quality: i32) -> ItemRow {
        ItemRow {
            entry,
            name: name.to_string(),
            class,
            subclass,
            quality,
            binding: 0,
            item_level: 10,
            required_level: 5,
        }
    }

    fn narrow_policy() -> PricingPolicy {
        PricingPolicy {
            item_classes: vec![(7, 5)],
            qualities: vec![1],
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    #[test]
    fn policy_filters_class_and_quality() {
        let items = [
            item(1, "bolt of cloth", 7, 5, 1),
            item(2, "wrong subclass", 7, 6, 1),
            item(3, "wrong quality", 7, 5, 0),
        ];
        let table = build_price_table(&items, &[], &narrow_policy(), &Lookup::default());
        assert_eq!(table.len(), 1);
        assert!(table.get(1).is_some());
    }

    #[test]
    fn rows_without_recipes_keep_empty_slots() {
        let items = [item(1, "bolt of cloth", 7, 5, 1)];
        let table = build_price_table(&items, &[], &narrow_policy(), &Lookup::default());
        let row = table.get(1).unwrap();
        assert_eq!(row.unit_price, UnitPrice::Unresolved);
        assert_eq!(row.markup, 1.0);
        assert_eq!(row.purchasable, None);
        assert_eq!(row.produced_count, None);
        assert!(row.reagents.is_empty());
    }

    #[test]
    fn join_fills_reagent_slots_and_names() {
        let items = [
            item(1, "bolt of cloth", 7, 5, 1),
            // Outside the policy, but still a valid name source for reagents.
            item(10, "linen cloth", 7, 11, 1),
        ];
        let recipes = [Recipe {
            item_id: 1,
            count: 1,
            reagents: vec![
                Reagent {
                    item_id: 10,
                    count: 3,
                },
                Reagent {
                    item_id: 99,
                    count: 1,
                },
            ],
        }];
        let table = build_price_table(&items, &recipes, &narrow_policy(), &Lookup::default());
        let row = table.get(1).unwrap();
        assert_eq!(row.produced_count, Some(1));
        assert_eq!(row.reagents.len(), 2);
        assert_eq!(row.reagents[0].name.as_deref(), Some("linen cloth"));
        // Unknown reagent id keeps its id and count but no name.
        assert_eq!(row.reagents[1].item_id, 99);
        assert_eq!(row.reagents[1].name, None);
        assert_eq!(row.reagents[1].count, 1);
    }

    #[test]
    fn lookup_renders_codes_with_fallback() {
        let lookup = Lookup::default();
        assert_eq!(lookup.class_name(7), "Trade Goods");
        assert_eq!(lookup.subclass_name(7, 5), "Cloth Material");
        assert_eq!(lookup.quality_name(2), "Uncommon");
        assert_eq!(lookup.binding_name(1), "Bind on Pickup");
        // Codes outside the lookup fall back to the code itself.
        assert_eq!(lookup.class_name(42), "42");
        assert_eq!(lookup.subclass_name(42, 7), "42-7");
    }

    #[test]
    fn default_policy_round_trips_as_json() {
        let policy = PricingPolicy::default();
        let json = serde_json::to_string(&policy).unwrap();
        let back: PricingPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(policy, back);
    }

    #[test]
    fn partial_policy_config_fills_defaults() {
        let policy: PricingPolicy = serde_json::from_str(r#"{"qualities": [3, 4]}"#).unwrap();
        assert_eq!(policy.qualities, vec![3, 4]);
        assert_eq!(policy.max_passes, DEFAULT_MAX_PASSES);
        assert!(!policy.item_classes.is_empty());
    }
}
