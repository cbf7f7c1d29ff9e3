//! `blendcraft-crafting` — the recipe-crafting core.
//!
//! Two entry points: the pure, snapshot-based craftability evaluator
//! (advisory, lock-free) and the craft transaction (atomic check-and-debit
//! plus produced-count increment).

pub mod error;
pub mod evaluate;
pub mod service;

pub use error::CraftError;
pub use evaluate::{evaluate, Craftability};
pub use service::{CraftOutcome, CraftService, RecipeStatus};
