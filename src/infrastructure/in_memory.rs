use crate::domain::catalog::StoreDoc;
use crate::domain::order::{Order, OrderLine};
use crate::domain::ports::{CatalogStore, OrderStore, UserStore};
use crate::domain::user::User;
use crate::error::StoreResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory `user` collection.
///
/// `Arc<RwLock<HashMap>>` gives shared concurrent access; holding the write
/// guard across check-and-mutate makes `debit` a genuine conditional update.
/// The default backend, and the substitutable store the service tests run
/// against.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn put(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        users.insert(user.user_id.clone(), user);
        Ok(())
    }

    async fn debit(&self, user_id: &str, amount: u64) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) if user.balance >= amount => {
                user.balance -= amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn credit(&self, user_id: &str, amount: u64) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                user.balance = user.balance.saturating_add(amount);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A thread-safe in-memory `store` collection keyed by store id.
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
    stores: Arc<RwLock<HashMap<String, StoreDoc>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_store(&self, store_id: &str) -> StoreResult<Option<StoreDoc>> {
        let stores = self.stores.read().await;
        Ok(stores.get(store_id).cloned())
    }

    async fn put_store(&self, doc: StoreDoc) -> StoreResult<()> {
        let mut stores = self.stores.write().await;
        stores.insert(doc.store_id.clone(), doc);
        Ok(())
    }

    async fn take_stock(&self, store_id: &str, book_id: &str, count: u32) -> StoreResult<bool> {
        let mut stores = self.stores.write().await;
        let listing = stores
            .get_mut(store_id)
            .and_then(|store| store.book_mut(book_id));
        match listing {
            Some(listing) if listing.stock_level >= count => {
                listing.stock_level -= count;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restock(&self, store_id: &str, book_id: &str, count: u32) -> StoreResult<bool> {
        let mut stores = self.stores.write().await;
        match stores
            .get_mut(store_id)
            .and_then(|store| store.book_mut(book_id))
        {
            Some(listing) => {
                listing.stock_level = listing.stock_level.saturating_add(count);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory `new_order` and `new_order_detail` collections. Orders and
/// their lines live under one lock so insert and remove stay atomic.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, (Order, Vec<OrderLine>)>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order, lines: &[OrderLine]) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.order_id.clone(), (order, lines.to_vec()));
        Ok(())
    }

    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).map(|(order, _)| order.clone()))
    }

    async fn lines(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(order_id)
            .map(|(_, lines)| lines.clone())
            .unwrap_or_default())
    }

    async fn remove(&self, order_id: &str) -> StoreResult<bool> {
        let mut orders = self.orders.write().await;
        Ok(orders.remove(order_id).is_some())
    }
}
