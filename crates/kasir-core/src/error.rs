//! Domain error types.

use thiserror::Error;

/// Top-level error type for every point-of-sale operation.
///
/// Every fallible operation in the engine returns this type; no operation
/// partially applies a mutation before surfacing an error.
#[derive(Debug, Error)]
pub enum PosError {
    /// Bad or missing input (empty name, empty reason, non-positive price).
    #[error("validation error: {0}")]
    Validation(String),

    /// A product with the same `(name, category)` key already exists.
    #[error("product \"{name}\" ({category}) already exists")]
    Duplicate {
        /// Product name of the colliding key.
        name: String,
        /// Product category of the colliding key.
        category: String,
    },

    /// No product exists under the requested `(name, category)` key.
    #[error("product \"{name}\" ({category}) not found")]
    ProductNotFound {
        /// Requested product name.
        name: String,
        /// Requested product category.
        category: String,
    },

    /// A cart line index is out of range.
    #[error("cart line {0} not found")]
    LineNotFound(usize),

    /// An out-of-range quantity (zero, or a decrement below zero).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Requested quantity exceeds the stock currently available.
    #[error(
        "insufficient stock for \"{name}\" ({category}): requested {requested}, available {available}"
    )]
    InsufficientStock {
        /// Product name.
        name: String,
        /// Product category.
        category: String,
        /// Quantity the operation asked for.
        requested: u32,
        /// Stock available at the time of the check.
        available: u32,
    },

    /// Cash tendered is short of the transaction total.
    #[error("insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment {
        /// Transaction total due.
        total: i64,
        /// Amount actually tendered.
        paid: i64,
    },

    /// Checkout was attempted on a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A durable write failed; the in-memory state was left unchanged.
    #[error("persistence error: {0}")]
    Persistence(String),
}
