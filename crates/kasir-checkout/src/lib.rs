//! Kasir POS — checkout engine, transaction ledger, and sales reporting.
//!
//! Checkout converts a cart into a committed transaction: it re-validates
//! every line against live stock under an exclusive catalog scope, applies
//! all decrements and the ledger append as one all-or-nothing commit, and
//! clears the cart only after the commit is durable.

mod engine;
pub mod reports;
mod transaction;

pub use engine::CheckoutEngine;
pub use transaction::{PaymentMethod, Transaction};
