#![cfg(feature = "storage-rocksdb")]

//! The services run unchanged against any store implementing the ports;
//! this exercises the whole lifecycle on the RocksDB backend.

use bookstall::application::order::OrderService;
use bookstall::application::settlement::SettlementService;
use bookstall::domain::catalog::{BookListing, StoreDoc};
use bookstall::domain::order::BasketItem;
use bookstall::domain::ports::{CatalogStore, OrderStore, UserStore};
use bookstall::domain::user::User;
use bookstall::error::OrderError;
use bookstall::infrastructure::rocksdb::RocksDbStore;
use std::num::NonZeroU32;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_full_lifecycle_on_rocksdb() {
    let dir = tempdir().unwrap();
    let store = RocksDbStore::open(dir.path()).unwrap();

    UserStore::put(&store, User::new("alice", "pw", 2000))
        .await
        .unwrap();
    UserStore::put(&store, User::new("bob", "pw2", 0))
        .await
        .unwrap();
    let mut doc = StoreDoc::new("s1", "bob");
    doc.put_book(BookListing {
        book_id: "b1".into(),
        price: 500,
        stock_level: 10,
    });
    store.put_store(doc).await.unwrap();

    let users = Arc::new(store.clone());
    let catalog = Arc::new(store.clone());
    let orders = Arc::new(store.clone());
    let placement = OrderService::new(users.clone(), catalog.clone(), orders.clone());
    let settlement = SettlementService::new(users, catalog, orders);

    let order_id = placement
        .place_order(
            "alice",
            "s1",
            &[BasketItem::new("b1", NonZeroU32::new(3).unwrap())],
        )
        .await
        .unwrap();

    let doc = store.get_store("s1").await.unwrap().unwrap();
    assert_eq!(doc.book("b1").unwrap().stock_level, 7);

    settlement.pay("alice", "pw", &order_id).await.unwrap();

    let alice = UserStore::get(&store, "alice").await.unwrap().unwrap();
    let bob = UserStore::get(&store, "bob").await.unwrap().unwrap();
    assert_eq!(alice.balance, 500);
    assert_eq!(bob.balance, 1500);
    assert!(OrderStore::get(&store, &order_id).await.unwrap().is_none());

    let err = settlement.pay("alice", "pw", &order_id).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidOrder(_)));
}
