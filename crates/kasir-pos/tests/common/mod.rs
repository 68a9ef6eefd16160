//! Shared setup for the end-to-end tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use kasir_pos::{Pos, Product, ProductKey, RemovalRecord, Transaction};
use kasir_test_support::{FixedClock, MemorySnapshotStore};

/// The fixed instant every in-memory test engine runs at.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Store handles kept by the test for durability assertions.
pub struct MemoryStores {
    pub products: MemorySnapshotStore<Product>,
    pub removals: MemorySnapshotStore<RemovalRecord>,
    pub transactions: MemorySnapshotStore<Transaction>,
}

/// Assembles an engine over fresh in-memory stores and a fixed clock.
pub async fn pos_with_memory_stores() -> (Pos, MemoryStores) {
    let stores = MemoryStores {
        products: MemorySnapshotStore::new(),
        removals: MemorySnapshotStore::new(),
        transactions: MemorySnapshotStore::new(),
    };
    let pos = Pos::with_stores(
        Arc::new(stores.products.clone()),
        Arc::new(stores.removals.clone()),
        Arc::new(stores.transactions.clone()),
        Arc::new(FixedClock(fixed_now())),
    )
    .await
    .unwrap();
    (pos, stores)
}

/// Seeds the standard test product and returns its key.
pub async fn seed_pen(pos: &Pos, stock: u32) -> ProductKey {
    pos.catalog()
        .add_product("Pen", "Stationery", stock, 2_000, 1_200)
        .await
        .unwrap()
        .key()
}
