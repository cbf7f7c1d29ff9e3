use serde::Serialize;

use blendcraft_catalog::Recipe;
use blendcraft_core::{DomainResult, IngredientId};
use blendcraft_inventory::StockLedger;

/// Result of evaluating one recipe against a stock snapshot.
///
/// `craftable == unmet.is_empty()` always. Advisory only: the snapshot may be
/// stale by the time a craft is attempted, and the craft transaction re-checks
/// under its own critical section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Craftability {
    pub craftable: bool,
    pub unmet: Vec<IngredientId>,
}

/// Evaluate whether `recipe` could be crafted from current stock.
///
/// Read-only and lock-free beyond the ledger's own read primitive. An
/// ingredient absent from the ledger reads as quantity 0 (unmet, not an
/// error). Requirement lines naming the same ingredient are summed, so the
/// answer agrees with what the craft transaction would decide; a sum that
/// overflows u64 can never be met by u64 stock and reads as unmet. A recipe
/// with zero requirements is trivially craftable.
pub fn evaluate<L>(recipe: &Recipe, stock: &L) -> DomainResult<Craftability>
where
    L: StockLedger + ?Sized,
{
    // Sum per ingredient, first-seen order.
    let mut totals: Vec<(IngredientId, u64, bool)> = Vec::with_capacity(recipe.requirements.len());
    for req in &recipe.requirements {
        match totals.iter_mut().find(|(id, _, _)| *id == req.ingredient_id) {
            Some((_, total, overflowed)) => match total.checked_add(req.amount_needed) {
                Some(sum) => *total = sum,
                None => *overflowed = true,
            },
            None => totals.push((req.ingredient_id, req.amount_needed, false)),
        }
    }

    let mut unmet = Vec::new();
    for (id, needed, overflowed) in totals {
        if overflowed || stock.quantity(&id)? < needed {
            unmet.push(id);
        }
    }

    Ok(Craftability {
        craftable: unmet.is_empty(),
        unmet,
    })
}
