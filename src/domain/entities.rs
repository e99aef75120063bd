use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Hard cap on reagents per recipe; the price table reserves this many slots.
pub const MAX_REAGENTS: usize = 6;

/// Copper per price unit; final-table prices are stored in copper.
pub const COPPER_PER_UNIT: f64 = 10_000.0;

/// One ingredient of a recipe: the consumed item and how many of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reagent {
    #[serde(rename = "id")]
    pub item_id: u32,
    pub count: u32,
}

/// A crafting rule: `count` units of `item_id` made from a fixed reagent list.
///
/// A valid recipe set holds at most one recipe per output item. Items crafted
/// by more than one rule in the raw data are excluded during extraction, so
/// ambiguity is unrepresentable here rather than resolved downstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "id")]
    pub item_id: u32,
    pub count: u32,
    pub reagents: Vec<Reagent>,
}

/// One row of the item dump: the attribute columns the price table needs.
///
/// The serde aliases accept the upstream `item_template` column names, so the
/// dump produced by the database layer deserializes without a mapping step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub entry: u32,
    #[serde(alias = "name_cn")]
    pub name: String,
    pub class: i32,
    pub subclass: i32,
    #[serde(alias = "Quality")]
    pub quality: i32,
    #[serde(alias = "bonding")]
    pub binding: i32,
    #[serde(alias = "ItemLevel")]
    pub item_level: i32,
    #[serde(alias = "RequiredLevel")]
    pub required_level: i32,
}

/// Price state of a table row.
///
/// Rows start `Unresolved`; the operator seeds atomic items and the solver
/// derives the rest. The transition to `Resolved` is one-way, and resolved
/// values are finite and non-negative. Only the TSV exchange format uses a
/// numeric sentinel (`-1`) for the unresolved state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum UnitPrice {
    #[default]
    Unresolved,
    Resolved(f64),
}

impl UnitPrice {
    pub fn is_resolved(&self) -> bool {
        matches!(self, UnitPrice::Resolved(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            UnitPrice::Resolved(value) => Some(*value),
            UnitPrice::Unresolved => None,
        }
    }
}

/// A recipe ingredient as carried in the price table, with the display name
/// filled in where the item dump knows the item.
#[derive(Clone, Debug, PartialEq)]
pub struct ReagentSlot {
    pub item_id: u32,
    pub name: Option<String>,
    pub count: u32,
}

/// One row of the working price table.
///
/// Built once by the table builder; `unit_price` is the only field that
/// mutates afterwards, and only the solver mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRow {
    pub item_id: u32,
    pub name: String,
    pub unit_price: UnitPrice,
    pub markup: f64,
    /// Whether vendors should stock the item; unknown until the operator
    /// decides.
    pub purchasable: Option<bool>,
    pub category: String,
    pub subcategory: String,
    pub quality: String,
    pub binding: String,
    pub item_level: i32,
    pub required_level: i32,
    /// Units produced per craft; `None` for items without a recipe.
    pub produced_count: Option<u32>,
    /// Up to [`MAX_REAGENTS`] ingredients; empty for items without a recipe.
    pub reagents: Vec<ReagentSlot>,
}

impl PriceRow {
    /// True when the row can in principle be derived from reagent prices.
    pub fn has_recipe(&self) -> bool {
        self.produced_count.is_some() && !self.reagents.is_empty()
    }
}

/// A resolved row converted for downstream export: price in copper,
/// truncated. The conversion is one-way.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalPriceRow {
    pub item_id: u32,
    pub name: String,
    pub price_copper: i64,
    pub markup: f64,
    pub purchasable: Option<bool>,
}

/// The working price table: insertion-ordered rows with O(1) lookup by item
/// id, which the solver needs for reagent price reads during a pass.
///
/// Membership is fixed once built; resolution only flips `unit_price`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceTable {
    rows: IndexMap<u32, PriceRow>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = PriceRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(row);
        }
        table
    }

    /// Insert a row, keyed by its item id. A duplicate id replaces the
    /// earlier row in place, keeping the original position.
    pub fn insert(&mut self, row: PriceRow) {
        self.rows.insert(row.item_id, row);
    }

    pub fn get(&self, item_id: u32) -> Option<&PriceRow> {
        self.rows.get(&item_id)
    }

    pub fn get_mut(&mut self, item_id: u32) -> Option<&mut PriceRow> {
        self.rows.get_mut(&item_id)
    }

    pub fn get_index(&self, index: usize) -> Option<&PriceRow> {
        self.rows.get_index(index).map(|(_, row)| row)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut PriceRow> {
        self.rows.get_index_mut(index).map(|(_, row)| row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &PriceRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.rows
            .values()
            .filter(|row| row.unit_price.is_resolved())
            .count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.rows.len() - self.resolved_count()
    }
}
