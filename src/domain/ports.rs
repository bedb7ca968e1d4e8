use super::catalog::StoreDoc;
use super::order::{Order, OrderLine};
use super::user::User;
use crate::error::StoreResult;
use async_trait::async_trait;
use std::sync::Arc;

pub type UserStoreRef = Arc<dyn UserStore>;
pub type CatalogStoreRef = Arc<dyn CatalogStore>;
pub type OrderStoreRef = Arc<dyn OrderStore>;

/// Access to the `user` collection.
///
/// `debit` and `credit` are single-document conditional updates: the store
/// re-checks the condition at write time, so two racing operations on the
/// same user cannot both succeed when only one should.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: &str) -> StoreResult<Option<User>>;
    async fn put(&self, user: User) -> StoreResult<()>;
    /// Subtracts `amount` only if the stored balance still covers it.
    /// Returns whether the debit was applied; `false` also covers a missing
    /// user.
    async fn debit(&self, user_id: &str, amount: u64) -> StoreResult<bool>;
    /// Adds `amount` to the stored balance. Returns `false` if the user does
    /// not exist.
    async fn credit(&self, user_id: &str, amount: u64) -> StoreResult<bool>;
}

/// Access to the `store` collection.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_store(&self, store_id: &str) -> StoreResult<Option<StoreDoc>>;
    async fn put_store(&self, doc: StoreDoc) -> StoreResult<()>;
    /// Decrements a listing's stock only if the stored level still covers
    /// `count`. Returns whether the decrement was applied; `false` also
    /// covers a missing store or book.
    async fn take_stock(&self, store_id: &str, book_id: &str, count: u32) -> StoreResult<bool>;
    /// Puts `count` units back on a listing. Compensation path for a
    /// placement that could not complete.
    async fn restock(&self, store_id: &str, book_id: &str, count: u32) -> StoreResult<bool>;
}

/// Access to the `new_order` and `new_order_detail` collections.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order and all of its lines.
    async fn insert(&self, order: Order, lines: &[OrderLine]) -> StoreResult<()>;
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>>;
    async fn lines(&self, order_id: &str) -> StoreResult<Vec<OrderLine>>;
    /// Removes the order and its lines. Returns whether the order existed.
    async fn remove(&self, order_id: &str) -> StoreResult<bool>;
}
