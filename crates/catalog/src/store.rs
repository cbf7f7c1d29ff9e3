use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use blendcraft_core::{DomainError, DomainResult, RecipeId};

use crate::recipe::Recipe;

/// Store of recipe definitions.
///
/// `increment_produced` is the only mutation a craft performs here; it is
/// atomic per recipe and monotonic.
pub trait RecipeStore: Send + Sync {
    fn get(&self, id: &RecipeId) -> DomainResult<Option<Recipe>>;

    fn list(&self) -> DomainResult<Vec<Recipe>>;

    fn upsert(&self, recipe: Recipe) -> DomainResult<()>;

    fn remove(&self, id: &RecipeId) -> DomainResult<bool>;

    /// Bump `produced_count` by exactly 1, returning the new count.
    /// `NotFound` if the recipe does not exist.
    fn increment_produced(&self, id: &RecipeId) -> DomainResult<u64>;
}

impl<S> RecipeStore for Arc<S>
where
    S: RecipeStore + ?Sized,
{
    fn get(&self, id: &RecipeId) -> DomainResult<Option<Recipe>> {
        (**self).get(id)
    }

    fn list(&self) -> DomainResult<Vec<Recipe>> {
        (**self).list()
    }

    fn upsert(&self, recipe: Recipe) -> DomainResult<()> {
        (**self).upsert(recipe)
    }

    fn remove(&self, id: &RecipeId) -> DomainResult<bool> {
        (**self).remove(id)
    }

    fn increment_produced(&self, id: &RecipeId) -> DomainResult<u64> {
        (**self).increment_produced(id)
    }
}

/// In-memory recipe store.
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    inner: RwLock<HashMap<RecipeId, Recipe>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read_map(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<RecipeId, Recipe>>> {
        self.inner
            .read()
            .map_err(|_| DomainError::storage("recipe store lock poisoned"))
    }

    fn write_map(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<RecipeId, Recipe>>> {
        self.inner
            .write()
            .map_err(|_| DomainError::storage("recipe store lock poisoned"))
    }
}

impl RecipeStore for InMemoryRecipeStore {
    fn get(&self, id: &RecipeId) -> DomainResult<Option<Recipe>> {
        Ok(self.read_map()?.get(id).cloned())
    }

    fn list(&self) -> DomainResult<Vec<Recipe>> {
        let map = self.read_map()?;
        let mut all: Vec<Recipe> = map.values().cloned().collect();
        all.sort_by_key(|r| r.id);
        Ok(all)
    }

    fn upsert(&self, recipe: Recipe) -> DomainResult<()> {
        self.write_map()?.insert(recipe.id, recipe);
        Ok(())
    }

    fn remove(&self, id: &RecipeId) -> DomainResult<bool> {
        Ok(self.write_map()?.remove(id).is_some())
    }

    fn increment_produced(&self, id: &RecipeId) -> DomainResult<u64> {
        let mut map = self.write_map()?;
        let recipe = map.get_mut(id).ok_or(DomainError::NotFound)?;
        recipe.produced_count = recipe
            .produced_count
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("produced_count overflows u64"))?;
        recipe.updated_at = Utc::now();
        Ok(recipe.produced_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeRequirement;
    use blendcraft_core::IngredientId;

    fn recipe(name: &str) -> Recipe {
        let req = RecipeRequirement::new(IngredientId::new(), 2).unwrap();
        Recipe::new(RecipeId::new(), name, "", None, vec![req], Utc::now()).unwrap()
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let store = InMemoryRecipeStore::new();
        let r = recipe("Earl Grey Crème");
        store.upsert(r.clone()).unwrap();
        assert_eq!(store.get(&r.id).unwrap(), Some(r));
    }

    #[test]
    fn increment_produced_is_monotonic() {
        let store = InMemoryRecipeStore::new();
        let r = recipe("Masala Chai");
        let id = r.id;
        store.upsert(r).unwrap();

        assert_eq!(store.increment_produced(&id).unwrap(), 1);
        assert_eq!(store.increment_produced(&id).unwrap(), 2);
        assert_eq!(store.get(&id).unwrap().unwrap().produced_count, 2);
    }

    #[test]
    fn increment_produced_on_absent_recipe_is_not_found() {
        let store = InMemoryRecipeStore::new();
        let err = store.increment_produced(&RecipeId::new()).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let store = InMemoryRecipeStore::new();
        let r = recipe("Genmaicha");
        let id = r.id;
        store.upsert(r).unwrap();

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert_eq!(store.get(&id).unwrap(), None);
    }
}
