//! `blendcraft-inventory` — ingredient records and the stock ledger.
//!
//! The ledger owns every ingredient quantity. All stock mutations go through
//! `try_debit`/`credit`/`try_debit_all` so the non-negativity invariant holds
//! under any interleaving.

pub mod ingredient;
pub mod ledger;

pub use ingredient::Ingredient;
pub use ledger::{InMemoryStockLedger, StockLedger};
