use std::sync::Arc;

use blendcraft_catalog::InMemoryRecipeStore;
use blendcraft_crafting::CraftService;
use blendcraft_inventory::InMemoryStockLedger;

type Crafting = CraftService<Arc<InMemoryStockLedger>, Arc<InMemoryRecipeStore>>;

/// Application services: explicitly constructed store handles, built before
/// the router starts accepting requests and dropped on shutdown. No ambient
/// global connection.
#[derive(Debug)]
pub struct AppServices {
    ledger: Arc<InMemoryStockLedger>,
    recipes: Arc<InMemoryRecipeStore>,
    crafting: Crafting,
}

impl AppServices {
    pub fn new() -> Self {
        let ledger = Arc::new(InMemoryStockLedger::new());
        let recipes = Arc::new(InMemoryRecipeStore::new());
        let crafting = CraftService::new(ledger.clone(), recipes.clone());
        Self {
            ledger,
            recipes,
            crafting,
        }
    }

    pub fn ledger(&self) -> &Arc<InMemoryStockLedger> {
        &self.ledger
    }

    pub fn recipes(&self) -> &Arc<InMemoryRecipeStore> {
        &self.recipes
    }

    pub fn crafting(&self) -> &Crafting {
        &self.crafting
    }
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}
