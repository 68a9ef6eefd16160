//! The checkout engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kasir_cart::Cart;
use kasir_catalog::Catalog;
use kasir_core::clock::Clock;
use kasir_core::error::PosError;
use kasir_core::ledger::Ledger;
use kasir_core::store::SnapshotStore;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::transaction::{PaymentMethod, Transaction};

/// Converts carts into committed transactions and owns the transaction
/// ledger.
pub struct CheckoutEngine {
    catalog: Arc<Catalog>,
    transactions: RwLock<Ledger<Transaction>>,
    transaction_store: Arc<dyn SnapshotStore<Transaction>>,
    clock: Arc<dyn Clock>,
}

impl CheckoutEngine {
    /// Loads the transaction ledger and binds the engine to `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if the ledger store cannot be read.
    pub async fn load(
        catalog: Arc<Catalog>,
        transaction_store: Arc<dyn SnapshotStore<Transaction>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PosError> {
        let transactions = Ledger::from_records(transaction_store.load().await?);
        Ok(Self {
            catalog,
            transactions: RwLock::new(transactions),
            transaction_store,
            clock,
        })
    }

    /// Checks out `cart`: re-validates every line against current stock,
    /// validates payment, and commits stock decrements, ledger append, and
    /// cart clearing as one atomic step. The cart was built from a
    /// potentially stale stock view, so the re-validation here is
    /// mandatory, not an optimization.
    ///
    /// On success the cart is empty and the committed [`Transaction`] is
    /// returned. On any error nothing has changed and the cart is left
    /// intact for the actor to amend and retry.
    ///
    /// # Errors
    ///
    /// - [`PosError::EmptyCart`] if the cart has no lines.
    /// - [`PosError::ProductNotFound`] if a line's product no longer
    ///   exists.
    /// - [`PosError::InsufficientStock`] if stock dropped below a line's
    ///   quantity since the cart was built.
    /// - [`PosError::InsufficientPayment`] if a cash payment is short.
    /// - [`PosError::Persistence`] if a durable write fails.
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        method: PaymentMethod,
        amount_paid: i64,
    ) -> Result<Transaction, PosError> {
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }
        let total = cart.total();

        // Ledger lock first, then the catalog scope: transaction order in
        // the ledger always equals catalog commit order.
        let mut ledger = self.transactions.write().await;
        let mut txn = self.catalog.begin().await;

        for line in cart.lines() {
            txn.decrement_stock(&line.key(), line.quantity)
                .inspect_err(|e| {
                    warn!(cashier = %cart.actor(), error = %e, "checkout rejected");
                })?;
        }

        let (amount_paid, change_due) = match method {
            PaymentMethod::Cash => {
                if amount_paid < total {
                    warn!(cashier = %cart.actor(), total, amount_paid, "cash payment short");
                    return Err(PosError::InsufficientPayment {
                        total,
                        paid: amount_paid,
                    });
                }
                (amount_paid, amount_paid - total)
            }
            // Non-cash always pays the exact total.
            PaymentMethod::QrisTransfer => (total, 0),
        };

        let transaction = Transaction {
            id: Uuid::new_v4(),
            committed_at: self.clock.now(),
            cashier: cart.actor().clone(),
            lines: cart.lines().to_vec(),
            total,
            amount_paid,
            change_due,
            method,
        };

        // Stage both stores before committing either: a failure here aborts
        // with no visible effect anywhere.
        let staged_catalog = txn.stage().await?;
        let staged_ledger = {
            let mut all = ledger.records().to_vec();
            all.push(transaction.clone());
            self.transaction_store.stage(&all).await?
        };
        staged_catalog.commit()?;
        staged_ledger.commit()?;
        txn.publish();
        ledger.append(transaction.clone());
        cart.clear();

        info!(
            id = %transaction.id,
            cashier = %transaction.cashier,
            total,
            method = %transaction.method,
            "transaction committed"
        );
        Ok(transaction)
    }

    /// The full transaction history, oldest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.records().to_vec()
    }

    /// Transactions committed within `[start, end]`, oldest first.
    pub async fn transactions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Transaction> {
        self.transactions
            .read()
            .await
            .between(start, end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use kasir_catalog::ProductKey;
    use kasir_core::actor::ActorId;
    use kasir_test_support::{
        FailingSnapshotStore, FailurePoint, FixedClock, MemorySnapshotStore,
    };

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    async fn catalog_with_pen(stock: u32) -> Arc<Catalog> {
        let catalog = Catalog::load(
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(FixedClock(fixed_now())),
        )
        .await
        .unwrap();
        catalog
            .add_product("Pen", "Stationery", stock, 2_000, 1_200)
            .await
            .unwrap();
        Arc::new(catalog)
    }

    async fn engine_with(
        catalog: Arc<Catalog>,
        store: MemorySnapshotStore<Transaction>,
    ) -> CheckoutEngine {
        CheckoutEngine::load(catalog, Arc::new(store), Arc::new(FixedClock(fixed_now())))
            .await
            .unwrap()
    }

    async fn cart_with_pens(catalog: &Catalog, quantity: u32) -> Cart {
        let mut cart = Cart::new(ActorId::new("budi"));
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        cart.add_line(&pen, quantity).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_checkout_commits_cash_sale() {
        // Arrange
        let catalog = catalog_with_pen(10).await;
        let store = MemorySnapshotStore::new();
        let engine = engine_with(Arc::clone(&catalog), store.clone()).await;
        let mut cart = cart_with_pens(&catalog, 7).await;

        // Act
        let transaction = engine
            .checkout(&mut cart, PaymentMethod::Cash, 20_000)
            .await
            .unwrap();

        // Assert
        assert_eq!(transaction.total, 14_000);
        assert_eq!(transaction.amount_paid, 20_000);
        assert_eq!(transaction.change_due, 6_000);
        assert_eq!(transaction.cashier, ActorId::new("budi"));
        assert_eq!(transaction.committed_at, fixed_now());
        assert_eq!(transaction.lines.len(), 1);

        assert!(cart.is_empty(), "commit clears the cart");
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        assert_eq!(pen.stock, 3);
        assert_eq!(store.committed(), vec![transaction]);
    }

    #[tokio::test]
    async fn test_checkout_total_matches_sum_of_subtotals() {
        let catalog = catalog_with_pen(10).await;
        catalog
            .add_product("Coffee", "Beverages", 5, 8_000, 5_000)
            .await
            .unwrap();
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;

        let mut cart = cart_with_pens(&catalog, 2).await;
        let coffee = catalog
            .find_product(&ProductKey::new("Coffee", "Beverages"))
            .await
            .unwrap();
        cart.add_line(&coffee, 3).unwrap();

        let transaction = engine
            .checkout(&mut cart, PaymentMethod::Cash, 30_000)
            .await
            .unwrap();

        let line_sum: i64 = transaction.lines.iter().map(|l| l.subtotal).sum();
        assert_eq!(transaction.total, line_sum);
        assert_eq!(transaction.total, 2 * 2_000 + 3 * 8_000);
    }

    #[tokio::test]
    async fn test_checkout_qris_forces_exact_payment() {
        let catalog = catalog_with_pen(10).await;
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;
        let mut cart = cart_with_pens(&catalog, 7).await;

        // The tendered amount is irrelevant for non-cash payments.
        let transaction = engine
            .checkout(&mut cart, PaymentMethod::QrisTransfer, 0)
            .await
            .unwrap();

        assert_eq!(transaction.amount_paid, transaction.total);
        assert_eq!(transaction.change_due, 0);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_rejected() {
        let catalog = catalog_with_pen(10).await;
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;
        let mut cart = Cart::new(ActorId::new("budi"));

        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 1_000).await;

        assert!(matches!(result, Err(PosError::EmptyCart)));
        assert!(engine.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_short_cash_payment_is_rejected() {
        // Arrange
        let catalog = catalog_with_pen(10).await;
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;
        let mut cart = cart_with_pens(&catalog, 7).await;

        // Act
        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 10_000).await;

        // Assert
        match result.unwrap_err() {
            PosError::InsufficientPayment { total, paid } => {
                assert_eq!(total, 14_000);
                assert_eq!(paid, 10_000);
            }
            other => panic!("expected InsufficientPayment, got {other:?}"),
        }
        assert_eq!(cart.lines().len(), 1, "cart stays intact for retry");
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        assert_eq!(pen.stock, 10, "stock is untouched");
    }

    #[tokio::test]
    async fn test_checkout_stale_cart_fails_and_changes_nothing() {
        // Arrange — stock drops after the cart was built.
        let catalog = catalog_with_pen(8).await;
        let store = MemorySnapshotStore::new();
        let engine = engine_with(Arc::clone(&catalog), store.clone()).await;
        let mut cart = cart_with_pens(&catalog, 6).await;
        catalog
            .remove_stock(
                &ProductKey::new("Pen", "Stationery"),
                5,
                "water damage",
                ActorId::new("sari"),
            )
            .await
            .unwrap();

        // Act
        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 20_000).await;

        // Assert
        match result.unwrap_err() {
            PosError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 6);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        assert_eq!(pen.stock, 3, "no decrement was applied");
        assert!(engine.transactions().await.is_empty());
        assert!(store.committed().is_empty());
        assert_eq!(cart.lines().len(), 1, "cart stays intact for retry");
    }

    #[tokio::test]
    async fn test_checkout_vanished_product_is_not_found() {
        let catalog = catalog_with_pen(8).await;
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;
        let mut cart = cart_with_pens(&catalog, 6).await;
        catalog
            .remove_stock(
                &ProductKey::new("Pen", "Stationery"),
                8,
                "discontinued",
                ActorId::new("sari"),
            )
            .await
            .unwrap();

        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 20_000).await;

        assert!(matches!(result, Err(PosError::ProductNotFound { .. })));
        assert!(engine.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_multi_line_failure_applies_no_partial_decrement() {
        // Arrange — first line is satisfiable, second is not.
        let catalog = catalog_with_pen(10).await;
        catalog
            .add_product("Coffee", "Beverages", 2, 8_000, 5_000)
            .await
            .unwrap();
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;

        let mut cart = cart_with_pens(&catalog, 4).await;
        let coffee = catalog
            .find_product(&ProductKey::new("Coffee", "Beverages"))
            .await
            .unwrap();
        cart.add_line(&coffee, 2).unwrap();
        catalog
            .remove_stock(
                &ProductKey::new("Coffee", "Beverages"),
                1,
                "spoiled",
                ActorId::new("sari"),
            )
            .await
            .unwrap();

        // Act
        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 50_000).await;

        // Assert
        assert!(matches!(result, Err(PosError::InsufficientStock { .. })));
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        assert_eq!(pen.stock, 10, "first line's decrement must not survive");
    }

    #[tokio::test]
    async fn test_checkout_ledger_stage_failure_leaves_everything_unchanged() {
        // Arrange
        let catalog = catalog_with_pen(10).await;
        let engine = CheckoutEngine::load(
            Arc::clone(&catalog),
            Arc::new(FailingSnapshotStore::new(FailurePoint::Stage)),
            Arc::new(FixedClock(fixed_now())),
        )
        .await
        .unwrap();
        let mut cart = cart_with_pens(&catalog, 7).await;

        // Act
        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 20_000).await;

        // Assert
        assert!(matches!(result, Err(PosError::Persistence(_))));
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        assert_eq!(pen.stock, 10);
        assert!(engine.transactions().await.is_empty());
        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_ledger_commit_failure_keeps_memory_unchanged() {
        // Arrange — stage succeeds, the atomic replace itself fails.
        let catalog = catalog_with_pen(10).await;
        let engine = CheckoutEngine::load(
            Arc::clone(&catalog),
            Arc::new(FailingSnapshotStore::new(FailurePoint::Commit)),
            Arc::new(FixedClock(fixed_now())),
        )
        .await
        .unwrap();
        let mut cart = cart_with_pens(&catalog, 7).await;

        // Act
        let result = engine.checkout(&mut cart, PaymentMethod::Cash, 20_000).await;

        // Assert
        assert!(matches!(result, Err(PosError::Persistence(_))));
        let pen = catalog
            .find_product(&ProductKey::new("Pen", "Stationery"))
            .await
            .unwrap();
        assert_eq!(pen.stock, 10, "in-memory catalog is never published");
        assert!(engine.transactions().await.is_empty());
        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_transactions_between_filters_by_commit_time() {
        // Arrange — seed the ledger store with two transactions a week apart.
        let catalog = catalog_with_pen(10).await;
        let engine = engine_with(Arc::clone(&catalog), MemorySnapshotStore::new()).await;
        let mut cart = cart_with_pens(&catalog, 1).await;
        engine
            .checkout(&mut cart, PaymentMethod::Cash, 2_000)
            .await
            .unwrap();

        // Act
        let hit = engine
            .transactions_between(
                Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 1, 15, 23, 59, 59).unwrap(),
            )
            .await;
        let miss = engine
            .transactions_between(
                Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap(),
            )
            .await;

        // Assert
        assert_eq!(hit.len(), 1);
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_checkouts_append_in_order() {
        let catalog = catalog_with_pen(10).await;
        let store = MemorySnapshotStore::new();
        let engine = engine_with(Arc::clone(&catalog), store.clone()).await;

        let mut cart = cart_with_pens(&catalog, 2).await;
        let first = engine
            .checkout(&mut cart, PaymentMethod::Cash, 4_000)
            .await
            .unwrap();
        let mut cart = cart_with_pens(&catalog, 3).await;
        let second = engine
            .checkout(&mut cart, PaymentMethod::QrisTransfer, 0)
            .await
            .unwrap();

        let history = engine.transactions().await;
        assert_eq!(history, vec![first.clone(), second.clone()]);
        assert_eq!(store.committed(), vec![first, second]);
    }
}
