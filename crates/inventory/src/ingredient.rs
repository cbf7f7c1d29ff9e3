use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blendcraft_core::{DomainError, DomainResult, IngredientId};

/// A tracked stock item.
///
/// `quantity` is a `u64`: non-negativity holds by construction. It is mutated
/// only through the ledger's debit/credit operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image_url: Option<String>,
    pub quantity: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    pub fn new(
        id: IngredientId,
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        image_url: Option<String>,
        quantity: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("ingredient name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            category: category.into(),
            description: description.into(),
            image_url,
            quantity,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let err = Ingredient::new(
            IngredientId::new(),
            "   ",
            "tea",
            "",
            None,
            10,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn creates_with_metadata() {
        let id = IngredientId::new();
        let ing = Ingredient::new(
            id,
            "Rooibos",
            "tea",
            "South African red bush",
            Some("https://img.example/rooibos.png".to_string()),
            40,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ing.id, id);
        assert_eq!(ing.quantity, 40);
        assert_eq!(ing.category, "tea");
    }
}
