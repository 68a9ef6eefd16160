//! Kasir POS — per-actor shopping cart.
//!
//! A cart is the private, in-memory working set of one actor: building it
//! never touches shared state and never blocks another cashier. Lines hold
//! price *copies* taken when the line was first added, so later catalog
//! edits do not change what the cart displays; checkout re-validates
//! against live stock before anything commits.

use kasir_catalog::{Product, ProductKey};
use kasir_core::actor::ActorId;
use kasir_core::error::PosError;
use serde::{Deserialize, Serialize};

/// One selected product in a cart, with quantity and price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Units selected.
    pub quantity: u32,
    /// Unit price copied when the line was first added.
    pub unit_price: i64,
    /// Cost price copied when the line was first added.
    pub cost_price: i64,
    /// `quantity * unit_price`, recomputed on every quantity change.
    pub subtotal: i64,
}

impl CartLine {
    fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            quantity,
            unit_price: product.unit_price,
            cost_price: product.cost_price,
            subtotal: product.unit_price * i64::from(quantity),
        }
    }

    /// The catalog key this line refers to.
    #[must_use]
    pub fn key(&self) -> ProductKey {
        ProductKey::new(self.name.clone(), self.category.clone())
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.subtotal = self.unit_price * i64::from(quantity);
    }
}

/// An actor's in-progress, uncommitted selection.
///
/// Reusable across sales: checkout clears it back to empty.
#[derive(Debug, Clone)]
pub struct Cart {
    actor: ActorId,
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart owned by `actor`.
    #[must_use]
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            lines: Vec::new(),
        }
    }

    /// The actor this cart belongs to.
    #[must_use]
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Adds `quantity` of `product`, merging into an existing line for the
    /// same `(name, category)` if there is one. A merge sums quantities and
    /// keeps the price snapshot taken at first add.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::InvalidQuantity`] for a zero quantity, or
    /// [`PosError::InsufficientStock`] when the line's resulting quantity
    /// would exceed the product's current stock.
    pub fn add_line(&mut self, product: &Product, quantity: u32) -> Result<(), PosError> {
        if quantity == 0 {
            return Err(PosError::InvalidQuantity(format!(
                "cannot add zero of {} to the cart",
                product.key()
            )));
        }
        match self
            .lines
            .iter_mut()
            .find(|l| l.name == product.name && l.category == product.category)
        {
            Some(line) => {
                let merged = line.quantity.checked_add(quantity);
                match merged {
                    Some(merged) if merged <= product.stock => line.set_quantity(merged),
                    _ => {
                        return Err(PosError::InsufficientStock {
                            name: product.name.clone(),
                            category: product.category.clone(),
                            requested: line.quantity.saturating_add(quantity),
                            available: product.stock,
                        });
                    }
                }
            }
            None => {
                if quantity > product.stock {
                    return Err(PosError::InsufficientStock {
                        name: product.name.clone(),
                        category: product.category.clone(),
                        requested: quantity,
                        available: product.stock,
                    });
                }
                self.lines.push(CartLine::snapshot(product, quantity));
            }
        }
        Ok(())
    }

    /// Removes `quantity` units from the line at `index`. Removing the
    /// line's full quantity — or more — deletes the line.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::LineNotFound`] for an out-of-range index, or
    /// [`PosError::InvalidQuantity`] for a zero quantity.
    pub fn remove_from_line(&mut self, index: usize, quantity: u32) -> Result<(), PosError> {
        let Some(line) = self.lines.get_mut(index) else {
            return Err(PosError::LineNotFound(index));
        };
        if quantity == 0 {
            return Err(PosError::InvalidQuantity(
                "removal quantity must be at least 1".to_owned(),
            ));
        }
        if quantity >= line.quantity {
            self.lines.remove(index);
        } else {
            line.set_quantity(line.quantity - quantity);
        }
        Ok(())
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empties the cart. Called after a successful checkout; the cart stays
    /// usable for the next sale.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
