//! Credit pack price catalog.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A purchasable credit pack: charge amount (smallest currency unit),
/// credits granted on settlement, and the label shown at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub id: String,
    pub amount: i64,
    pub credits: i32,
    pub label: String,
}

/// The price catalog, injected into application state.
///
/// An explicit value rather than a module-level constant so deployments can
/// swap catalogs and tests can construct their own without process-wide
/// mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    tiers: Vec<PriceTier>,
}

impl PriceTable {
    pub fn new(tiers: Vec<PriceTier>) -> Self {
        Self { tiers }
    }

    /// Resolves a price tier key; unknown keys are a validation failure.
    pub fn resolve(&self, price_id: &str) -> Result<&PriceTier, AppError> {
        self.tiers
            .iter()
            .find(|tier| tier.id == price_id)
            .ok_or_else(|| AppError::Validation(format!("Unknown price tier: {}", price_id)))
    }

    /// All tiers, in catalog order.
    pub fn tiers(&self) -> &[PriceTier] {
        &self.tiers
    }
}

impl Default for PriceTable {
    /// The standard Clipper catalog.
    fn default() -> Self {
        Self::new(vec![
            PriceTier {
                id: "small".to_string(),
                amount: 150_000,
                credits: 50,
                label: "Small Credit Pack (50)".to_string(),
            },
            PriceTier {
                id: "medium".to_string(),
                amount: 399_000,
                credits: 150,
                label: "Medium Credit Pack (150)".to_string(),
            },
            PriceTier {
                id: "large".to_string(),
                amount: 1_199_000,
                credits: 500,
                label: "Large Credit Pack (500)".to_string(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let table = PriceTable::default();

        let small = table.resolve("small").unwrap();
        assert_eq!(small.amount, 150_000);
        assert_eq!(small.credits, 50);

        let medium = table.resolve("medium").unwrap();
        assert_eq!(medium.amount, 399_000);
        assert_eq!(medium.credits, 150);

        let large = table.resolve("large").unwrap();
        assert_eq!(large.amount, 1_199_000);
        assert_eq!(large.credits, 500);
    }

    #[test]
    fn test_unknown_tier_is_validation_error() {
        let table = PriceTable::default();
        let err = table.resolve("enterprise").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_custom_catalog_is_injectable() {
        let table = PriceTable::new(vec![PriceTier {
            id: "test".to_string(),
            amount: 1_000,
            credits: 1,
            label: "Test Pack".to_string(),
        }]);

        assert_eq!(table.tiers().len(), 1);
        assert_eq!(table.resolve("test").unwrap().credits, 1);
        assert!(table.resolve("small").is_err());
    }
}
