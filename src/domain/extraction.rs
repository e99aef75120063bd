//! Mines create-item recipes out of the raw spell-effect dataset.
//!
//! Most dataset rows are combat or aura effects and fall through the filter;
//! that is expected behavior, not an error.

use std::collections::HashMap;

use super::entities::{Reagent, Recipe, MAX_REAGENTS};

/// Effect kind for "create item" in the spell dataset.
pub const EFFECT_CREATE_ITEM: i32 = 24;

/// Number of reagent field pairs a spell record carries. Recipes keep at
/// most [`MAX_REAGENTS`] of them.
pub const REAGENT_FIELDS: usize = 8;

/// One spell row narrowed to the fields recipe extraction reads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpellEffectRecord {
    pub spell_id: u32,
    /// Effect kind of the primary effect slot.
    pub effect: i32,
    /// Produced-quantity roll: a die with this many sides. One side means
    /// the quantity is deterministic.
    pub die_sides: i32,
    /// Produced-quantity roll: base added to the die result.
    pub base_points: i32,
    /// Item created by the primary effect slot.
    pub created_item: u32,
    /// Created-item type fields of the two other effect slots. Non-zero
    /// means the spell creates more than one kind of item.
    pub secondary_item_type: u64,
    pub tertiary_item_type: u64,
    pub reagent_ids: [u32; REAGENT_FIELDS],
    pub reagent_counts: [u32; REAGENT_FIELDS],
}

impl SpellEffectRecord {
    /// True when the spell deterministically creates exactly one kind of
    /// item: a create-item effect whose quantity roll collapses to a single
    /// value and whose other effect slots create nothing.
    fn is_deterministic_craft(&self) -> bool {
        self.effect == EFFECT_CREATE_ITEM
            && self.die_sides == 1
            && self.secondary_item_type == 0
            && self.tertiary_item_type == 0
    }

    /// Quantity produced per craft: the collapsed roll range.
    fn produced_count(&self) -> i32 {
        self.die_sides + self.base_points
    }

    /// The reagent field pairs with a real item id, in field order.
    fn reagents(&self) -> Vec<Reagent> {
        self.reagent_ids
            .iter()
            .zip(self.reagent_counts.iter())
            .filter(|(id, _)| **id != 0)
            .map(|(id, count)| Reagent {
                item_id: *id,
                count: *count,
            })
            .collect()
    }
}

/// Filters the raw dataset down to unambiguous create-item recipes.
///
/// A pure function of the input sequence: output order follows input order
/// and identical input yields identical output. Items crafted by more than
/// one surviving spell are dropped entirely rather than disambiguated.
pub fn extract_recipes(records: &[SpellEffectRecord]) -> Vec<Recipe> {
    let mut candidates = Vec::new();
    for record in records {
        if !record.is_deterministic_craft() {
            continue;
        }
        let produced = record.produced_count();
        if produced < 1 {
            continue;
        }
        let reagents = record.reagents();
        if reagents.is_empty() || reagents.len() > MAX_REAGENTS {
            continue;
        }
        candidates.push(Recipe {
            item_id: record.created_item,
            count: produced as u32,
            reagents,
        });
    }

    let mut candidates_per_item: HashMap<u32, usize> = HashMap::new();
    for recipe in &candidates {
        *candidates_per_item.entry(recipe.item_id).or_insert(0) += 1;
    }
    candidates.retain(|recipe| candidates_per_item[&recipe.item_id] == 1);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn craft_record(created_item: u32, reagents: &[(u32, u32)]) -> SpellEffectRecord {
        let mut record = SpellEffectRecord {
            effect: EFFECT_CREATE_ITEM,
            die_sides: 1,
            created_item,
            ..SpellEffectRecord::default()
        };
        for (slot, (id, count)) in reagents.iter().enumerate() {
            record.reagent_ids[slot] = *id;
            record.reagent_counts[slot] = *count;
        }
        record
    }

    #[test]
    fn accepts_a_deterministic_craft() {
        let record = craft_record(100, &[(10, 2)]);
        let recipes = extract_recipes(&[record]);
        assert_eq!(
            recipes,
            vec![Recipe {
                item_id: 100,
                count: 1,
                reagents: vec![Reagent {
                    item_id: 10,
                    count: 2
                }],
            }]
        );
    }

    #[test]
    fn skips_zero_id_reagent_pairs() {
        let mut record = craft_record(100, &[(10, 2)]);
        // Leave a hole: field 1 is empty, field 2 holds the second reagent.
        record.reagent_ids[2] = 11;
        record.reagent_counts[2] = 4;
        let recipes = extract_recipes(&[record]);
        assert_eq!(
            recipes[0].reagents,
            vec![
                Reagent {
                    item_id: 10,
                    count: 2
                },
                Reagent {
                    item_id: 11,
                    count: 4
                },
            ]
        );
    }

    #[test]
    fn rejects_non_craft_effects() {
        let mut record = craft_record(100, &[(10, 2)]);
        record.effect = 3;
        assert!(extract_recipes(&[record]).is_empty());
    }

    #[test]
    fn rejects_random_output_quantities() {
        let mut record = craft_record(100, &[(10, 2)]);
        record.die_sides = 5;
        assert!(extract_recipes(&[record]).is_empty());
    }

    #[test]
    fn rejects_spells_creating_extra_items() {
        let mut record = craft_record(100, &[(10, 2)]);
        record.secondary_item_type = 0x4000;
        assert!(extract_recipes(&[record]).is_empty());

        let mut record = craft_record(100, &[(10, 2)]);
        record.tertiary_item_type = 1;
        assert!(extract_recipes(&[record]).is_empty());
    }

    #[test]
    fn rejects_reagent_lists_outside_bounds() {
        let no_reagents = craft_record(100, &[]);
        assert!(extract_recipes(&[no_reagents]).is_empty());

        let seven = craft_record(
            101,
            &[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 1), (7, 1)],
        );
        assert!(extract_recipes(&[seven]).is_empty());
    }

    #[test]
    fn rejects_non_positive_produced_counts() {
        let mut record = craft_record(100, &[(10, 2)]);
        record.base_points = -1;
        assert!(extract_recipes(&[record]).is_empty());
    }

    #[test]
    fn produced_count_is_the_collapsed_roll() {
        let mut record = craft_record(100, &[(10, 2)]);
        record.base_points = 4;
        let recipes = extract_recipes(&[record]);
        assert_eq!(recipes[0].count, 5);
    }

    #[test]
    fn drops_items_with_competing_recipes() {
        let records = [
            craft_record(500, &[(10, 2)]),
            craft_record(600, &[(10, 1)]),
            craft_record(500, &[(11, 3)]),
        ];
        let recipes = extract_recipes(&records);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].item_id, 600);
    }

    #[test]
    fn preserves_input_order() {
        let records = [
            craft_record(300, &[(1, 1)]),
            craft_record(100, &[(2, 1)]),
            craft_record(200, &[(3, 1)]),
        ];
        let ids: Vec<u32> = extract_recipes(&records)
            .iter()
            .map(|recipe| recipe.item_id)
            .collect();
        assert_eq!(ids, vec![300, 100, 200]);
    }
}
