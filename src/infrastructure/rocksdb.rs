use crate::domain::catalog::StoreDoc;
use crate::domain::order::{Order, OrderLine};
use crate::domain::ports::{CatalogStore, OrderStore, UserStore};
use crate::domain::user::User;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for user records.
pub const CF_USER: &str = "user";
/// Column family for store documents.
pub const CF_STORE: &str = "store";
/// Column family for unpaid orders.
pub const CF_ORDER: &str = "new_order";
/// Column family for order lines, keyed `order_id \0 book_id`.
pub const CF_ORDER_DETAIL: &str = "new_order_detail";

/// Separator between order id and book id in detail keys. Order ids are
/// uuid-suffixed and never contain a NUL byte.
const DETAIL_SEP: u8 = 0;

/// A persistent store backed by RocksDB, one column family per collection.
///
/// RocksDB offers no compare-and-swap, so every conditional or multi-key
/// mutation runs its read-modify-write sequence behind `write_lock`. Plain
/// reads go straight to the DB. `Clone` shares the underlying handle.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at `path`, ensuring all four
    /// column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_USER, CF_STORE, CF_ORDER, CF_ORDER_DETAIL]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> StoreResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::corrupt(format!("column family {name} not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> StoreResult<Option<T>> {
        let cf = self.cf(cf)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> StoreResult<()> {
        let cf = self.cf(cf)?;
        self.db.put_cf(cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn detail_key(order_id: &str, book_id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(order_id.len() + 1 + book_id.len());
        key.extend_from_slice(order_id.as_bytes());
        key.push(DETAIL_SEP);
        key.extend_from_slice(book_id.as_bytes());
        key
    }

    fn detail_prefix(order_id: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(order_id.len() + 1);
        prefix.extend_from_slice(order_id.as_bytes());
        prefix.push(DETAIL_SEP);
        prefix
    }

    /// Collects the raw detail keys under an order's prefix.
    fn detail_keys(&self, order_id: &str) -> StoreResult<Vec<Vec<u8>>> {
        let cf = self.cf(CF_ORDER_DETAIL)?;
        let prefix = Self::detail_prefix(order_id);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut keys = Vec::new();
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            keys.push(key.to_vec());
        }
        Ok(keys)
    }
}

#[async_trait]
impl UserStore for RocksDbStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.read(CF_USER, user_id.as_bytes())
    }

    async fn put(&self, user: User) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write(CF_USER, user.user_id.as_bytes(), &user)
    }

    async fn debit(&self, user_id: &str, amount: u64) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        match self.read::<User>(CF_USER, user_id.as_bytes())? {
            Some(mut user) if user.balance >= amount => {
                user.balance -= amount;
                self.write(CF_USER, user_id.as_bytes(), &user)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn credit(&self, user_id: &str, amount: u64) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        match self.read::<User>(CF_USER, user_id.as_bytes())? {
            Some(mut user) => {
                user.balance = user.balance.saturating_add(amount);
                self.write(CF_USER, user_id.as_bytes(), &user)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CatalogStore for RocksDbStore {
    async fn get_store(&self, store_id: &str) -> StoreResult<Option<StoreDoc>> {
        self.read(CF_STORE, store_id.as_bytes())
    }

    async fn put_store(&self, doc: StoreDoc) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write(CF_STORE, doc.store_id.as_bytes(), &doc)
    }

    async fn take_stock(&self, store_id: &str, book_id: &str, count: u32) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut doc) = self.read::<StoreDoc>(CF_STORE, store_id.as_bytes())? else {
            return Ok(false);
        };
        match doc.book_mut(book_id) {
            Some(listing) if listing.stock_level >= count => {
                listing.stock_level -= count;
            }
            _ => return Ok(false),
        }
        self.write(CF_STORE, store_id.as_bytes(), &doc)?;
        Ok(true)
    }

    async fn restock(&self, store_id: &str, book_id: &str, count: u32) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut doc) = self.read::<StoreDoc>(CF_STORE, store_id.as_bytes())? else {
            return Ok(false);
        };
        match doc.book_mut(book_id) {
            Some(listing) => {
                listing.stock_level = listing.stock_level.saturating_add(count);
            }
            None => return Ok(false),
        }
        self.write(CF_STORE, store_id.as_bytes(), &doc)?;
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for RocksDbStore {
    async fn insert(&self, order: Order, lines: &[OrderLine]) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        for line in lines {
            let key = Self::detail_key(&order.order_id, &line.book_id);
            self.write(CF_ORDER_DETAIL, &key, line)?;
        }
        self.write(CF_ORDER, order.order_id.as_bytes(), &order)
    }

    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        self.read(CF_ORDER, order_id.as_bytes())
    }

    async fn lines(&self, order_id: &str) -> StoreResult<Vec<OrderLine>> {
        let cf = self.cf(CF_ORDER_DETAIL)?;
        let prefix = Self::detail_prefix(order_id);
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut lines = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            lines.push(serde_json::from_slice(&value)?);
        }
        Ok(lines)
    }

    async fn remove(&self, order_id: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.read::<Order>(CF_ORDER, order_id.as_bytes())?.is_none() {
            return Ok(false);
        }

        let order_cf = self.cf(CF_ORDER)?;
        self.db.delete_cf(order_cf, order_id.as_bytes())?;

        let detail_cf = self.cf(CF_ORDER_DETAIL)?;
        for key in self.detail_keys(order_id)? {
            self.db.delete_cf(detail_cf, &key)?;
        }
        Ok(true)
    }
}
