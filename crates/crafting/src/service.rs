use serde::Serialize;
use tracing::{error, info, warn};

use blendcraft_catalog::{Recipe, RecipeStore};
use blendcraft_core::{DomainError, DomainResult, IngredientId, RecipeId};
use blendcraft_inventory::StockLedger;

use crate::error::CraftError;
use crate::evaluate::{evaluate, Craftability};

/// Successful craft: one unit produced, stock already debited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CraftOutcome {
    pub recipe_id: RecipeId,
    pub name: String,
    pub produced_count: u64,
}

/// One catalog entry with its advisory craftability.
///
/// `evaluation_error` is set when this recipe's stock data could not be
/// resolved; other entries in the same listing are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeStatus {
    pub recipe: Recipe,
    pub craftable: bool,
    pub unmet: Vec<IngredientId>,
    pub evaluation_error: Option<String>,
}

/// The crafting core: catalog listing with craftability, and the atomic
/// craft transaction.
///
/// Constructed with explicit store handles before the service accepts
/// requests; there is no ambient global state.
#[derive(Debug, Clone)]
pub struct CraftService<L, R> {
    ledger: L,
    recipes: R,
}

impl<L, R> CraftService<L, R>
where
    L: StockLedger,
    R: RecipeStore,
{
    pub fn new(ledger: L, recipes: R) -> Self {
        Self { ledger, recipes }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn recipes(&self) -> &R {
        &self.recipes
    }

    /// Advisory craftability for one recipe. `Ok(None)` if the recipe does
    /// not exist.
    pub fn status(&self, id: &RecipeId) -> DomainResult<Option<RecipeStatus>> {
        let Some(recipe) = self.recipes.get(id)? else {
            return Ok(None);
        };
        Ok(Some(self.status_of(recipe)))
    }

    /// Advisory craftability for the whole catalog.
    ///
    /// Each recipe is evaluated independently against a point-in-time read;
    /// a failure to resolve one recipe's stock is reported on that entry and
    /// never aborts the rest of the listing.
    pub fn list_with_craftability(&self) -> DomainResult<Vec<RecipeStatus>> {
        let recipes = self.recipes.list()?;
        Ok(recipes.into_iter().map(|r| self.status_of(r)).collect())
    }

    fn status_of(&self, recipe: Recipe) -> RecipeStatus {
        match evaluate(&recipe, &self.ledger) {
            Ok(Craftability { craftable, unmet }) => RecipeStatus {
                recipe,
                craftable,
                unmet,
                evaluation_error: None,
            },
            Err(e) => {
                warn!(recipe_id = %recipe.id, error = %e, "craftability evaluation failed");
                RecipeStatus {
                    recipe,
                    craftable: false,
                    unmet: Vec::new(),
                    evaluation_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Produce one unit of the recipe.
    ///
    /// Craftability is re-checked against *current* stock and the debits are
    /// applied inside the ledger's critical section, so two overlapping
    /// crafts can never jointly overdraw an ingredient. Either every debit
    /// plus the produced-count increment lands, or nothing does.
    pub fn craft(&self, id: &RecipeId) -> Result<CraftOutcome, CraftError> {
        let recipe = self.recipes.get(id)?.ok_or(CraftError::NotFound)?;

        let batch: Vec<(IngredientId, u64)> = recipe
            .requirements
            .iter()
            .map(|r| (r.ingredient_id, r.amount_needed))
            .collect();

        if let Err(unmet) = self.ledger.try_debit_all(&batch)? {
            return Err(CraftError::InsufficientStock { unmet });
        }

        match self.recipes.increment_produced(id) {
            Ok(produced_count) => {
                info!(recipe_id = %id, name = %recipe.name, produced_count, "crafted one unit");
                Ok(CraftOutcome {
                    recipe_id: *id,
                    name: recipe.name,
                    produced_count,
                })
            }
            Err(e) => {
                // The recipe vanished (or the store failed) after the debit
                // committed. Compensate by crediting every line back so the
                // craft is observed as never having happened.
                self.rollback_debits(&batch);
                match e {
                    DomainError::NotFound => Err(CraftError::NotFound),
                    other => Err(CraftError::Storage(other)),
                }
            }
        }
    }

    fn rollback_debits(&self, batch: &[(IngredientId, u64)]) {
        for (ingredient_id, amount) in batch {
            if let Err(e) = self.ledger.credit(ingredient_id, *amount) {
                // Unrecoverable: stock was consumed with no produced unit.
                error!(
                    ingredient_id = %ingredient_id,
                    amount,
                    error = %e,
                    "failed to roll back debit after aborted craft"
                );
            }
        }
    }
}
