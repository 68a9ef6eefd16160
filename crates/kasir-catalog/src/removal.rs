//! Removal audit records.

use chrono::{DateTime, Utc};
use kasir_core::actor::ActorId;
use kasir_core::ledger::Timestamped;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Audit record of a manual stock removal.
///
/// Carries a snapshot of the product as it was *before* the decrement, so
/// the audit trail stays meaningful after the product is edited or deleted.
/// Immutable once appended to the removal ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalRecord {
    /// Product name at removal time.
    pub name: String,
    /// Product category at removal time.
    pub category: String,
    /// Stock level before the removal.
    pub stock: u32,
    /// Unit price at removal time.
    pub unit_price: i64,
    /// Cost price at removal time.
    pub cost_price: i64,
    /// Units removed.
    pub quantity_removed: u32,
    /// Operator-supplied reason; never empty.
    pub reason: String,
    /// When the removal was committed.
    pub removed_at: DateTime<Utc>,
    /// Operator who performed the removal.
    pub removed_by: ActorId,
}

impl RemovalRecord {
    /// Builds a record snapshotting `product` before its stock decrement.
    #[must_use]
    pub fn snapshot(
        product: &Product,
        quantity_removed: u32,
        reason: impl Into<String>,
        removed_at: DateTime<Utc>,
        removed_by: ActorId,
    ) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            stock: product.stock,
            unit_price: product.unit_price,
            cost_price: product.cost_price,
            quantity_removed,
            reason: reason.into(),
            removed_at,
            removed_by,
        }
    }
}

impl Timestamped for RemovalRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.removed_at
    }
}
