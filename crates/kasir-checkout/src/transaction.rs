//! Committed sale records.

use std::fmt;

use chrono::{DateTime, Utc};
use kasir_cart::CartLine;
use kasir_core::actor::ActorId;
use kasir_core::ledger::Timestamped;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Physical cash; change may be due.
    Cash,
    /// QRIS or bank transfer; always pays the exact total.
    #[serde(rename = "QRIS/Transfer")]
    QrisTransfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => f.write_str("Cash"),
            Self::QrisTransfer => f.write_str("QRIS/Transfer"),
        }
    }
}

/// A committed sale. Immutable once appended to the transaction ledger.
///
/// Holds `total == Σ line.subtotal`; for cash payments
/// `change_due == amount_paid - total ≥ 0`, for QRIS/Transfer
/// `amount_paid == total` and `change_due == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier.
    pub id: Uuid,
    /// When the sale was committed.
    pub committed_at: DateTime<Utc>,
    /// The cashier who rang up the sale.
    pub cashier: ActorId,
    /// The sold lines, in cart order.
    pub lines: Vec<CartLine>,
    /// Sum of line subtotals.
    pub total: i64,
    /// Amount tendered.
    pub amount_paid: i64,
    /// Change returned to the customer.
    pub change_due: i64,
    /// Payment method.
    pub method: PaymentMethod,
}

impl Timestamped for Transaction {
    fn timestamp(&self) -> DateTime<Utc> {
        self.committed_at
    }
}
