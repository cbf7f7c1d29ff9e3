use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::error;

use blendcraft_core::{DomainError, DomainResult, IngredientId};

use crate::ingredient::Ingredient;

/// Keyed store of ingredient records and their non-negative quantities.
///
/// All stock mutations flow through this interface. `try_debit_all` is the
/// atomic commit primitive for crafting: every debit in the batch is applied,
/// or none is.
pub trait StockLedger: Send + Sync {
    fn get(&self, id: &IngredientId) -> DomainResult<Option<Ingredient>>;

    fn list(&self) -> DomainResult<Vec<Ingredient>>;

    fn upsert(&self, ingredient: Ingredient) -> DomainResult<()>;

    fn remove(&self, id: &IngredientId) -> DomainResult<bool>;

    /// Read-modify-write one record inside the ledger's critical section.
    ///
    /// The closure observes and mutates the live record; no other ledger
    /// mutation can interleave, so a concurrent debit is never reverted by a
    /// stale snapshot written back. Returns `Ok(false)` if the record does
    /// not exist.
    fn update(
        &self,
        id: &IngredientId,
        apply: &mut dyn FnMut(&mut Ingredient),
    ) -> DomainResult<bool>;

    /// Current quantity. An absent ingredient reads as 0, not as an error.
    fn quantity(&self, id: &IngredientId) -> DomainResult<u64>;

    /// Decrement `id` by `amount` only if the result stays >= 0.
    ///
    /// Returns `Ok(false)` (no mutation) when stock is insufficient. Atomic
    /// with respect to every other mutation on the same ingredient.
    fn try_debit(&self, id: &IngredientId, amount: u64) -> DomainResult<bool>;

    /// Increase `id` by `amount` (restocking). `NotFound` if the record does
    /// not exist; restocking does not create ingredients.
    fn credit(&self, id: &IngredientId, amount: u64) -> DomainResult<()>;

    /// Check-and-debit a whole batch as one atomic unit.
    ///
    /// Under a single critical section: if every `(ingredient, amount)` pair
    /// is satisfiable from current stock, apply every debit and return
    /// `Ok(Ok(()))`; otherwise mutate nothing and return the unmet ingredient
    /// ids in requirement order. Duplicate ids in the batch are summed.
    fn try_debit_all(
        &self,
        requirements: &[(IngredientId, u64)],
    ) -> DomainResult<Result<(), Vec<IngredientId>>>;
}

impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    fn get(&self, id: &IngredientId) -> DomainResult<Option<Ingredient>> {
        (**self).get(id)
    }

    fn list(&self) -> DomainResult<Vec<Ingredient>> {
        (**self).list()
    }

    fn upsert(&self, ingredient: Ingredient) -> DomainResult<()> {
        (**self).upsert(ingredient)
    }

    fn remove(&self, id: &IngredientId) -> DomainResult<bool> {
        (**self).remove(id)
    }

    fn update(
        &self,
        id: &IngredientId,
        apply: &mut dyn FnMut(&mut Ingredient),
    ) -> DomainResult<bool> {
        (**self).update(id, apply)
    }

    fn quantity(&self, id: &IngredientId) -> DomainResult<u64> {
        (**self).quantity(id)
    }

    fn try_debit(&self, id: &IngredientId, amount: u64) -> DomainResult<bool> {
        (**self).try_debit(id, amount)
    }

    fn credit(&self, id: &IngredientId, amount: u64) -> DomainResult<()> {
        (**self).credit(id, amount)
    }

    fn try_debit_all(
        &self,
        requirements: &[(IngredientId, u64)],
    ) -> DomainResult<Result<(), Vec<IngredientId>>> {
        (**self).try_debit_all(requirements)
    }
}

/// In-memory stock ledger.
///
/// The single `RwLock` doubles as the crafting serialization point: the write
/// lock taken by `try_debit_all` is the critical section that keeps two
/// overlapping check-and-debit phases from interleaving.
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
    inner: RwLock<HashMap<IngredientId, Ingredient>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read_map(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<IngredientId, Ingredient>>> {
        self.inner
            .read()
            .map_err(|_| DomainError::storage("stock ledger lock poisoned"))
    }

    fn write_map(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<IngredientId, Ingredient>>> {
        self.inner
            .write()
            .map_err(|_| DomainError::storage("stock ledger lock poisoned"))
    }
}

/// Sum duplicate ingredient ids, preserving first-seen order.
///
/// A sum that overflows u64 is flagged: no u64 stock can satisfy it, so the
/// caller treats that ingredient as unmet rather than as an error.
fn aggregate(requirements: &[(IngredientId, u64)]) -> Vec<(IngredientId, u64, bool)> {
    let mut totals: Vec<(IngredientId, u64, bool)> = Vec::with_capacity(requirements.len());
    for (id, amount) in requirements {
        match totals.iter_mut().find(|(seen, _, _)| seen == id) {
            Some((_, total, overflowed)) => match total.checked_add(*amount) {
                Some(sum) => *total = sum,
                None => *overflowed = true,
            },
            None => totals.push((*id, *amount, false)),
        }
    }
    totals
}

impl StockLedger for InMemoryStockLedger {
    fn get(&self, id: &IngredientId) -> DomainResult<Option<Ingredient>> {
        Ok(self.read_map()?.get(id).cloned())
    }

    fn list(&self) -> DomainResult<Vec<Ingredient>> {
        let map = self.read_map()?;
        let mut all: Vec<Ingredient> = map.values().cloned().collect();
        all.sort_by_key(|i| i.id);
        Ok(all)
    }

    fn upsert(&self, ingredient: Ingredient) -> DomainResult<()> {
        self.write_map()?.insert(ingredient.id, ingredient);
        Ok(())
    }

    fn remove(&self, id: &IngredientId) -> DomainResult<bool> {
        Ok(self.write_map()?.remove(id).is_some())
    }

    fn update(
        &self,
        id: &IngredientId,
        apply: &mut dyn FnMut(&mut Ingredient),
    ) -> DomainResult<bool> {
        let mut map = self.write_map()?;
        match map.get_mut(id) {
            Some(record) => {
                apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn quantity(&self, id: &IngredientId) -> DomainResult<u64> {
        Ok(self.read_map()?.get(id).map(|i| i.quantity).unwrap_or(0))
    }

    fn try_debit(&self, id: &IngredientId, amount: u64) -> DomainResult<bool> {
        let mut map = self.write_map()?;
        let Some(record) = map.get_mut(id) else {
            // Absent reads as quantity 0.
            return Ok(amount == 0);
        };
        match record.quantity.checked_sub(amount) {
            Some(rest) => {
                record.quantity = rest;
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn credit(&self, id: &IngredientId, amount: u64) -> DomainResult<()> {
        let mut map = self.write_map()?;
        let record = map.get_mut(id).ok_or(DomainError::NotFound)?;
        record.quantity = record
            .quantity
            .checked_add(amount)
            .ok_or_else(|| DomainError::invariant("credit overflows u64"))?;
        record.updated_at = Utc::now();
        Ok(())
    }

    fn try_debit_all(
        &self,
        requirements: &[(IngredientId, u64)],
    ) -> DomainResult<Result<(), Vec<IngredientId>>> {
        let totals = aggregate(requirements);
        let mut map = self.write_map()?;

        let unmet: Vec<IngredientId> = totals
            .iter()
            .filter(|(id, total, overflowed)| {
                *overflowed || map.get(id).map(|i| i.quantity).unwrap_or(0) < *total
            })
            .map(|(id, _, _)| *id)
            .collect();
        if !unmet.is_empty() {
            return Ok(Err(unmet));
        }

        // Checks passed under this same write lock; a failing subtraction here
        // would be a partial-application defect.
        for (id, total, _) in &totals {
            let Some(record) = map.get_mut(id) else {
                error!(ingredient_id = %id, "ingredient vanished inside debit critical section");
                return Err(DomainError::invariant("partial debit prevented"));
            };
            let Some(rest) = record.quantity.checked_sub(*total) else {
                error!(ingredient_id = %id, "debit would underflow inside critical section");
                return Err(DomainError::invariant("partial debit prevented"));
            };
            record.quantity = rest;
            record.updated_at = Utc::now();
        }
        Ok(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ingredient(id: IngredientId, name: &str, quantity: u64) -> Ingredient {
        Ingredient::new(id, name, "tea", "", None, quantity, Utc::now()).unwrap()
    }

    #[test]
    fn quantity_of_absent_ingredient_is_zero() {
        let ledger = InMemoryStockLedger::new();
        assert_eq!(ledger.quantity(&IngredientId::new()).unwrap(), 0);
    }

    #[test]
    fn try_debit_refuses_to_go_negative() {
        let ledger = InMemoryStockLedger::new();
        let id = IngredientId::new();
        ledger.upsert(ingredient(id, "Assam", 5)).unwrap();

        assert!(!ledger.try_debit(&id, 6).unwrap());
        assert_eq!(ledger.quantity(&id).unwrap(), 5);

        assert!(ledger.try_debit(&id, 5).unwrap());
        assert_eq!(ledger.quantity(&id).unwrap(), 0);
    }

    #[test]
    fn credit_on_absent_ingredient_is_not_found() {
        let ledger = InMemoryStockLedger::new();
        let err = ledger.credit(&IngredientId::new(), 3).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn debit_all_applies_every_debit_or_none() {
        let ledger = InMemoryStockLedger::new();
        let a = IngredientId::new();
        let b = IngredientId::new();
        ledger.upsert(ingredient(a, "A", 40)).unwrap();
        ledger.upsert(ingredient(b, "B", 60)).unwrap();

        ledger
            .try_debit_all(&[(a, 30), (b, 55)])
            .unwrap()
            .unwrap();
        assert_eq!(ledger.quantity(&a).unwrap(), 10);
        assert_eq!(ledger.quantity(&b).unwrap(), 5);

        let unmet = ledger.try_debit_all(&[(a, 5), (b, 55)]).unwrap().unwrap_err();
        assert_eq!(unmet, vec![b]);
        // Failed batch left both quantities untouched, including the satisfiable one.
        assert_eq!(ledger.quantity(&a).unwrap(), 10);
        assert_eq!(ledger.quantity(&b).unwrap(), 5);
    }

    #[test]
    fn debit_all_sums_duplicate_ids() {
        let ledger = InMemoryStockLedger::new();
        let a = IngredientId::new();
        ledger.upsert(ingredient(a, "A", 10)).unwrap();

        let unmet = ledger.try_debit_all(&[(a, 6), (a, 6)]).unwrap().unwrap_err();
        assert_eq!(unmet, vec![a]);
        assert_eq!(ledger.quantity(&a).unwrap(), 10);

        ledger.try_debit_all(&[(a, 6), (a, 4)]).unwrap().unwrap();
        assert_eq!(ledger.quantity(&a).unwrap(), 0);
    }

    #[test]
    fn update_mutates_in_place_and_reports_absent_records() {
        let ledger = InMemoryStockLedger::new();
        let id = IngredientId::new();
        ledger.upsert(ingredient(id, "Ceylon", 7)).unwrap();

        let found = ledger
            .update(&id, &mut |ing| ing.description = "high grown".to_string())
            .unwrap();
        assert!(found);
        let record = ledger.get(&id).unwrap().unwrap();
        assert_eq!(record.description, "high grown");
        assert_eq!(record.quantity, 7);

        let found = ledger
            .update(&IngredientId::new(), &mut |ing| ing.quantity = 99)
            .unwrap();
        assert!(!found);
    }

    // A metadata write racing a debit must never resurrect consumed stock:
    // both run under the same write lock, so no stale snapshot can be
    // written back over a committed debit.
    #[test]
    fn metadata_updates_never_resurrect_debited_stock() {
        let ledger = Arc::new(InMemoryStockLedger::new());
        let id = IngredientId::new();
        ledger.upsert(ingredient(id, "Shared", 100)).unwrap();

        let mut handles = Vec::new();
        for pass in 0..10 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                assert!(ledger.try_debit(&id, 1).unwrap());
                ledger
                    .update(&id, &mut |ing| ing.description = format!("pass {pass}"))
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.quantity(&id).unwrap(), 90);
    }

    #[test]
    fn overflowing_batch_total_is_unmet_not_an_error() {
        let ledger = InMemoryStockLedger::new();
        let a = IngredientId::new();
        ledger.upsert(ingredient(a, "A", u64::MAX)).unwrap();

        let unmet = ledger
            .try_debit_all(&[(a, u64::MAX), (a, 1)])
            .unwrap()
            .unwrap_err();
        assert_eq!(unmet, vec![a]);
        assert_eq!(ledger.quantity(&a).unwrap(), u64::MAX);
    }

    #[test]
    fn debit_all_treats_absent_ingredient_as_unmet() {
        let ledger = InMemoryStockLedger::new();
        let a = IngredientId::new();
        let ghost = IngredientId::new();
        ledger.upsert(ingredient(a, "A", 10)).unwrap();

        let unmet = ledger
            .try_debit_all(&[(a, 1), (ghost, 1)])
            .unwrap()
            .unwrap_err();
        assert_eq!(unmet, vec![ghost]);
        assert_eq!(ledger.quantity(&a).unwrap(), 10);
    }

    proptest! {
        /// Property: any sequence of debit attempts leaves quantities exact —
        /// each success subtracts exactly the requested amount, each failure
        /// subtracts nothing, and stock never underflows.
        #[test]
        fn debit_sequence_is_exact(
            start in 0u64..1_000,
            amounts in proptest::collection::vec(0u64..200, 0..32)
        ) {
            let ledger = InMemoryStockLedger::new();
            let id = IngredientId::new();
            ledger.upsert(ingredient(id, "P", start)).unwrap();

            let mut expected = start;
            for amount in amounts {
                let before = ledger.quantity(&id).unwrap();
                let ok = ledger.try_debit(&id, amount).unwrap();
                let after = ledger.quantity(&id).unwrap();
                if ok {
                    prop_assert_eq!(after, before - amount);
                    expected -= amount;
                } else {
                    prop_assert_eq!(after, before);
                    prop_assert!(amount > before);
                }
                prop_assert_eq!(after, expected);
            }
        }

        /// Property: a batch debit is all-or-nothing.
        #[test]
        fn batch_debit_is_atomic(
            stock_a in 0u64..100,
            stock_b in 0u64..100,
            need_a in 0u64..100,
            need_b in 0u64..100,
        ) {
            let ledger = InMemoryStockLedger::new();
            let a = IngredientId::new();
            let b = IngredientId::new();
            ledger.upsert(ingredient(a, "A", stock_a)).unwrap();
            ledger.upsert(ingredient(b, "B", stock_b)).unwrap();

            let outcome = ledger.try_debit_all(&[(a, need_a), (b, need_b)]).unwrap();
            match outcome {
                Ok(()) => {
                    prop_assert!(stock_a >= need_a && stock_b >= need_b);
                    prop_assert_eq!(ledger.quantity(&a).unwrap(), stock_a - need_a);
                    prop_assert_eq!(ledger.quantity(&b).unwrap(), stock_b - need_b);
                }
                Err(unmet) => {
                    prop_assert!(stock_a < need_a || stock_b < need_b);
                    prop_assert!(!unmet.is_empty());
                    prop_assert_eq!(ledger.quantity(&a).unwrap(), stock_a);
                    prop_assert_eq!(ledger.quantity(&b).unwrap(), stock_b);
                }
            }
        }
    }
}
