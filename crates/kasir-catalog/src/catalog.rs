//! The catalog store and its exclusive mutation scope.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kasir_core::actor::ActorId;
use kasir_core::clock::Clock;
use kasir_core::error::PosError;
use kasir_core::ledger::Ledger;
use kasir_core::store::{SnapshotStore, StagedWrite};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::info;

use crate::product::{Product, ProductKey};
use crate::removal::RemovalRecord;

fn not_found(key: &ProductKey) -> PosError {
    PosError::ProductNotFound {
        name: key.name.clone(),
        category: key.category.clone(),
    }
}

/// The catalog store: owns every product record and the removal ledger.
///
/// Shared state is guarded by a single write lock over the whole product
/// map, which serializes every mutation (including the commit phase of a
/// checkout). Reads take the shared side of the lock and never block each
/// other.
pub struct Catalog {
    products: RwLock<BTreeMap<ProductKey, Product>>,
    removals: RwLock<Ledger<RemovalRecord>>,
    product_store: Arc<dyn SnapshotStore<Product>>,
    removal_store: Arc<dyn SnapshotStore<RemovalRecord>>,
    clock: Arc<dyn Clock>,
}

impl Catalog {
    /// Loads the catalog and removal ledger from their durable stores.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if either store cannot be read.
    pub async fn load(
        product_store: Arc<dyn SnapshotStore<Product>>,
        removal_store: Arc<dyn SnapshotStore<RemovalRecord>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PosError> {
        let products = product_store
            .load()
            .await?
            .into_iter()
            .map(|p| (p.key(), p))
            .collect();
        let removals = Ledger::from_records(removal_store.load().await?);
        Ok(Self {
            products: RwLock::new(products),
            removals: RwLock::new(removals),
            product_store,
            removal_store,
            clock,
        })
    }

    /// Opens an exclusive mutation scope over the product map.
    ///
    /// The scope holds the catalog write lock until it is dropped or
    /// published, so re-validation and commit inside one scope are a single
    /// atomic step with respect to every other actor.
    pub async fn begin(&self) -> CatalogTxn<'_> {
        let guard = self.products.write().await;
        let staged = guard.clone();
        CatalogTxn {
            guard,
            staged,
            store: Arc::clone(&self.product_store),
        }
    }

    /// Adds a new product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Validation`] for empty name/category, a
    /// non-positive unit price, or a negative cost price, and
    /// [`PosError::Duplicate`] if a product with the same `(name, category)`
    /// already exists. [`PosError::Persistence`] if the durable write fails;
    /// the catalog is then unchanged.
    pub async fn add_product(
        &self,
        name: impl Into<String>,
        category: impl Into<String>,
        stock: u32,
        unit_price: i64,
        cost_price: i64,
    ) -> Result<Product, PosError> {
        let product = Product::new(name, category, stock, unit_price, cost_price)?;
        let key = product.key();

        let mut txn = self.begin().await;
        if txn.get(&key).is_some() {
            return Err(PosError::Duplicate {
                name: key.name,
                category: key.category,
            });
        }
        txn.staged.insert(key.clone(), product.clone());
        txn.stage().await?.commit()?;
        txn.publish();

        info!(product = %key, stock, unit_price, "product added");
        Ok(product)
    }

    /// Applies a manual stock correction of `delta` units.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::ProductNotFound`] if the key is absent,
    /// [`PosError::InvalidQuantity`] if the adjustment would leave negative
    /// stock, and [`PosError::Persistence`] if the durable write fails.
    pub async fn adjust_stock(&self, key: &ProductKey, delta: i64) -> Result<Product, PosError> {
        let mut txn = self.begin().await;
        let mut product = txn.get(key).cloned().ok_or_else(|| not_found(key))?;

        product.stock = u32::try_from(i64::from(product.stock) + delta).map_err(|_| {
            PosError::InvalidQuantity(format!(
                "adjusting {key} by {delta} would leave stock out of range"
            ))
        })?;
        txn.staged.insert(key.clone(), product.clone());
        txn.stage().await?.commit()?;
        txn.publish();

        info!(product = %key, delta, stock = product.stock, "stock adjusted");
        Ok(product)
    }

    /// Removes `quantity` units of stock outside of a sale, with an audited
    /// reason. A removal that consumes the full remaining stock deletes the
    /// product; either way exactly one [`RemovalRecord`] is appended.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Validation`] for an empty reason,
    /// [`PosError::ProductNotFound`] if the key is absent,
    /// [`PosError::InvalidQuantity`] when `quantity` is zero or exceeds the
    /// current stock, and [`PosError::Persistence`] if a durable write
    /// fails. On any error neither the stock nor the ledger changes.
    pub async fn remove_stock(
        &self,
        key: &ProductKey,
        quantity: u32,
        reason: &str,
        removed_by: ActorId,
    ) -> Result<RemovalRecord, PosError> {
        if reason.trim().is_empty() {
            return Err(PosError::Validation(
                "a removal reason is required".to_owned(),
            ));
        }

        let mut txn = self.begin().await;
        let product = txn.get(key).cloned().ok_or_else(|| not_found(key))?;
        if quantity < 1 || quantity > product.stock {
            return Err(PosError::InvalidQuantity(format!(
                "cannot remove {quantity} of {key} with stock {}",
                product.stock
            )));
        }

        let record = RemovalRecord::snapshot(
            &product,
            quantity,
            reason,
            self.clock.now(),
            removed_by,
        );
        if quantity == product.stock {
            txn.staged.remove(key);
        } else if let Some(staged) = txn.staged.get_mut(key) {
            staged.stock -= quantity;
        }

        // Stage both stores before committing either, so a write failure
        // aborts with nothing visible.
        let mut removals = self.removals.write().await;
        let staged_catalog = txn.stage().await?;
        let staged_removals = {
            let mut all = removals.records().to_vec();
            all.push(record.clone());
            self.removal_store.stage(&all).await?
        };
        staged_catalog.commit()?;
        staged_removals.commit()?;
        txn.publish();
        removals.append(record.clone());

        info!(
            product = %key,
            quantity,
            by = %record.removed_by,
            deleted = record.stock == quantity,
            "stock removed"
        );
        Ok(record)
    }

    /// Looks up a product by key, returning a copy.
    pub async fn find_product(&self, key: &ProductKey) -> Option<Product> {
        self.products.read().await.get(key).cloned()
    }

    /// All products in a category, in name order.
    pub async fn list_by_category(&self, category: &str) -> Vec<Product> {
        self.products
            .read()
            .await
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    /// The set of categories currently in use, sorted and deduplicated.
    /// Derived from the products, never stored.
    pub async fn list_categories(&self) -> Vec<String> {
        let products = self.products.read().await;
        let mut categories: Vec<String> = products.values().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// All products in key order.
    pub async fn products(&self) -> Vec<Product> {
        self.products.read().await.values().cloned().collect()
    }

    /// The full removal history, oldest first.
    pub async fn removals(&self) -> Vec<RemovalRecord> {
        self.removals.read().await.records().to_vec()
    }

    /// Removal records committed within `[start, end]`, oldest first.
    pub async fn removals_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<RemovalRecord> {
        self.removals
            .read()
            .await
            .between(start, end)
            .cloned()
            .collect()
    }
}

/// Exclusive, all-or-nothing mutation scope over the product map.
///
/// Mutations are applied to a staged copy; nothing is visible to other
/// actors (or durable) until the staged snapshot has been committed and
/// [`publish`](CatalogTxn::publish) swaps it in. Dropping the scope without
/// publishing discards every staged change.
pub struct CatalogTxn<'a> {
    guard: RwLockWriteGuard<'a, BTreeMap<ProductKey, Product>>,
    staged: BTreeMap<ProductKey, Product>,
    store: Arc<dyn SnapshotStore<Product>>,
}

impl CatalogTxn<'_> {
    /// The staged view of a product.
    #[must_use]
    pub fn get(&self, key: &ProductKey) -> Option<&Product> {
        self.staged.get(key)
    }

    /// Validates and stages a stock decrement for one sale line.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::ProductNotFound`] if the product no longer
    /// exists, or [`PosError::InsufficientStock`] if the current stock is
    /// below `quantity`. The staged state is unchanged on error.
    pub fn decrement_stock(&mut self, key: &ProductKey, quantity: u32) -> Result<(), PosError> {
        let product = self.staged.get_mut(key).ok_or_else(|| not_found(key))?;
        if product.stock < quantity {
            return Err(PosError::InsufficientStock {
                name: key.name.clone(),
                category: key.category.clone(),
                requested: quantity,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        Ok(())
    }

    /// Durably stages the full snapshot of the staged product map.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if the snapshot cannot be written.
    pub async fn stage(&self) -> Result<Box<dyn StagedWrite>, PosError> {
        let records: Vec<Product> = self.staged.values().cloned().collect();
        self.store.stage(&records).await
    }

    /// Publishes the staged map as the visible catalog state. Call only
    /// after every staged durable write has committed.
    pub fn publish(mut self) {
        *self.guard = std::mem::take(&mut self.staged);
    }
}
