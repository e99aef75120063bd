//! The price solver: bounded relaxation over the recipe dependency graph.
//!
//! Reagent references are neither guaranteed acyclic nor guaranteed to point
//! at items present in the table, so the solver never recurses. It rescans
//! the whole table until a pass resolves nothing new or the pass cap is hit;
//! rows caught in a cycle or depending on absent items simply stay
//! unresolved, which is a reported outcome rather than an error.

use tracing::debug;

use super::entities::{FinalPriceRow, PriceRow, PriceTable, UnitPrice, COPPER_PER_UNIT};

/// Pass cap when the policy does not override it. High enough for every
/// real crafting chain; the cap only bites on cyclic or incomplete data.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// What a resolution run did to the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolutionOutcome {
    /// Passes actually run, including the final zero-progress pass.
    pub passes: usize,
    /// Rows newly resolved by this run.
    pub resolved: usize,
    /// Rows still unresolved when the run stopped.
    pub unresolved: usize,
}

/// Runs relaxation passes until a fixed point or `max_passes`.
///
/// Re-running on an already-settled table resolves nothing and stops after a
/// single zero-progress pass, so the operation is idempotent.
pub fn resolve_prices(table: &mut PriceTable, max_passes: usize) -> ResolutionOutcome {
    let mut passes = 0;
    let mut resolved = 0;
    while passes < max_passes {
        passes += 1;
        let newly_resolved = relaxation_pass(table);
        debug!(pass = passes, resolved = newly_resolved, "relaxation pass");
        resolved += newly_resolved;
        if newly_resolved == 0 {
            break;
        }
    }
    ResolutionOutcome {
        passes,
        resolved,
        unresolved: table.unresolved_count(),
    }
}

/// One scan over the whole table; returns how many rows it resolved.
///
/// A row resolved here is visible to rows scanned later in the same pass.
/// The relation is monotone, so this only changes how early a dependent
/// resolves, never whether it does.
pub fn relaxation_pass(table: &mut PriceTable) -> usize {
    let mut resolved = 0;
    for index in 0..table.len() {
        let price = match table.get_index(index) {
            Some(row) if !row.unit_price.is_resolved() && row.has_recipe() => {
                reagent_cost(table, row)
            }
            _ => None,
        };
        if let (Some(price), Some(row)) = (price, table.get_index_mut(index)) {
            row.unit_price = UnitPrice::Resolved(price);
            resolved += 1;
        }
    }
    resolved
}

/// Unit cost of crafting `row` once, if every reagent is present in the
/// table and already priced.
fn reagent_cost(table: &PriceTable, row: &PriceRow) -> Option<f64> {
    let produced = row.produced_count.filter(|count| *count > 0)?;
    let mut total = 0.0;
    for slot in &row.reagents {
        let price = table.get(slot.item_id)?.unit_price.value()?;
        total += price * f64::from(slot.count);
    }
    Some(total / f64::from(produced))
}

/// Drops rows still unresolved and converts the rest to copper prices,
/// truncating. The conversion is one-way; it is not expected to round-trip.
pub fn finalize(table: &PriceTable) -> Vec<FinalPriceRow> {
    table
        .rows()
        .filter_map(|row| {
            let price = row.unit_price.value()?;
            Some(FinalPriceRow {
                item_id: row.item_id,
                name: row.name.clone(),
                price_copper: (price * COPPER_PER_UNIT) as i64,
                markup: row.markup,
                purchasable: row.purchasable,
            })
        })
        .collect()
}
