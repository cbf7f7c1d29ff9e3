use thiserror::Error;

use blendcraft_core::{DomainError, IngredientId};

/// Craft transaction failure.
///
/// Every variant guarantees that no mutation is visible: an insufficient
/// batch never debits, and storage failures surface before or instead of the
/// commit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CraftError {
    /// The requested recipe does not exist.
    #[error("recipe not found")]
    NotFound,

    /// Commit-time craftability check failed.
    #[error("insufficient stock for {} ingredient(s)", unmet.len())]
    InsufficientStock { unmet: Vec<IngredientId> },

    /// Ledger or catalog backend failure.
    #[error(transparent)]
    Storage(DomainError),
}

impl From<DomainError> for CraftError {
    fn from(err: DomainError) -> Self {
        Self::Storage(err)
    }
}
