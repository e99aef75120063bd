//! Domain logic for recipe mining and price resolution lives here.

pub mod entities;
pub mod extraction;
pub mod resolution;
pub mod table;

pub use entities::{
    FinalPriceRow, ItemRow, PriceRow, PriceTable, Reagent, ReagentSlot, Recipe, UnitPrice,
    COPPER_PER_UNIT, MAX_REAGENTS,
};
pub use extraction::{
    extract_recipes, SpellEffectRecord, EFFECT_CREATE_ITEM, REAGENT_FIELDS,
};
pub use resolution::{
    finalize, relaxation_pass, resolve_prices, ResolutionOutcome, DEFAULT_MAX_PASSES,
};
pub use table::{build_price_table, Lookup, PricingPolicy, VENDOR_STOCK_CLASSES};
