//! Product records and their composite identity.

use std::fmt;

use kasir_core::error::PosError;
use serde::{Deserialize, Serialize};

/// Composite product identity: uniqueness is enforced over
/// `(name, category)`, never over the name alone — the same name may exist
/// in several categories.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
}

impl ProductKey {
    /// Creates a key from name and category.
    #[must_use]
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.name, self.category)
    }
}

/// A sellable product and its current stock level.
///
/// Prices are whole rupiah. Stock is unsigned, so a negative stock level is
/// unrepresentable; decrements are validated before they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Units currently in stock.
    pub stock: u32,
    /// Selling price per unit.
    pub unit_price: i64,
    /// Acquisition cost per unit.
    pub cost_price: i64,
}

impl Product {
    /// Creates a validated product record.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Validation`] if the name or category is empty,
    /// the unit price is not positive, or the cost price is negative.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        stock: u32,
        unit_price: i64,
        cost_price: i64,
    ) -> Result<Self, PosError> {
        let name = name.into();
        let category = category.into();
        if name.trim().is_empty() || category.trim().is_empty() {
            return Err(PosError::Validation(
                "product name and category are required".to_owned(),
            ));
        }
        if unit_price <= 0 {
            return Err(PosError::Validation(format!(
                "unit price for \"{name}\" must be positive"
            )));
        }
        if cost_price < 0 {
            return Err(PosError::Validation(format!(
                "cost price for \"{name}\" must not be negative"
            )));
        }
        Ok(Self {
            name,
            category,
            stock,
            unit_price,
            cost_price,
        })
    }

    /// The composite identity of this product.
    #[must_use]
    pub fn key(&self) -> ProductKey {
        ProductKey::new(self.name.clone(), self.category.clone())
    }
}
