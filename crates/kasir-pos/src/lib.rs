//! Kasir POS — the assembled point-of-sale engine.
//!
//! Wires the catalog, checkout engine, and JSON file stores into one
//! ready-to-use handle. Embedding applications (terminal front ends,
//! report exporters) talk to [`Pos`]; tests and alternative backends
//! inject their own stores and clock through [`Pos::with_stores`].

use std::path::PathBuf;
use std::sync::Arc;

pub use kasir_cart::{Cart, CartLine};
pub use kasir_catalog::{Catalog, Product, ProductKey, RemovalRecord};
pub use kasir_checkout::{CheckoutEngine, PaymentMethod, Transaction, reports};
pub use kasir_core::actor::{ActorId, ActorRole};
pub use kasir_core::clock::{Clock, SystemClock};
pub use kasir_core::error::PosError;
pub use kasir_core::store::SnapshotStore;
pub use kasir_store::JsonSnapshotStore;

const PRODUCTS_FILE: &str = "products.json";
const REMOVALS_FILE: &str = "removals.json";
const TRANSACTIONS_FILE: &str = "transactions.json";

/// The assembled point-of-sale engine.
pub struct Pos {
    catalog: Arc<Catalog>,
    checkout: CheckoutEngine,
}

impl Pos {
    /// Opens (or initializes) the engine over a data directory, using the
    /// system clock. Stores that do not exist yet start empty and are
    /// created on first commit.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if an existing store cannot be
    /// read or decoded.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, PosError> {
        let dir = data_dir.into();
        Self::with_stores(
            Arc::new(JsonSnapshotStore::new(dir.join(PRODUCTS_FILE))),
            Arc::new(JsonSnapshotStore::new(dir.join(REMOVALS_FILE))),
            Arc::new(JsonSnapshotStore::new(dir.join(TRANSACTIONS_FILE))),
            Arc::new(SystemClock),
        )
        .await
    }

    /// Assembles the engine over caller-supplied stores and clock.
    ///
    /// # Errors
    ///
    /// Returns [`PosError::Persistence`] if any store cannot be read.
    pub async fn with_stores(
        product_store: Arc<dyn SnapshotStore<Product>>,
        removal_store: Arc<dyn SnapshotStore<RemovalRecord>>,
        transaction_store: Arc<dyn SnapshotStore<Transaction>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PosError> {
        let catalog = Arc::new(
            Catalog::load(product_store, removal_store, Arc::clone(&clock)).await?,
        );
        let checkout =
            CheckoutEngine::load(Arc::clone(&catalog), transaction_store, clock).await?;
        Ok(Self { catalog, checkout })
    }

    /// The catalog store.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The checkout engine and transaction history.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutEngine {
        &self.checkout
    }

    /// Creates an empty cart owned by `actor`. Carts are private to the
    /// caller; the engine only sees one again at checkout.
    #[must_use]
    pub fn new_cart(&self, actor: ActorId) -> Cart {
        Cart::new(actor)
    }
}
