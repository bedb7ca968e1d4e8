use crate::domain::order::{self, BasketItem, Order, OrderLine};
use crate::domain::ports::{CatalogStoreRef, OrderStoreRef, UserStoreRef};
use crate::error::{OrderError, Result};
use tracing::{debug, warn};

/// Places orders: validates a basket against live inventory, reserves stock
/// and materializes the order with its lines.
///
/// The service is stateless; all state lives behind the injected store
/// handles, so any number of placements may run concurrently.
pub struct OrderService {
    users: UserStoreRef,
    catalog: CatalogStoreRef,
    orders: OrderStoreRef,
}

impl OrderService {
    pub fn new(users: UserStoreRef, catalog: CatalogStoreRef, orders: OrderStoreRef) -> Self {
        Self {
            users,
            catalog,
            orders,
        }
    }

    /// Creates an order for `buyer_id` against `store_id`.
    ///
    /// The basket is validated in full before any stock moves: unknown books
    /// and short stock are rejected with no side effects. The decrements
    /// themselves are conditional single-document updates; if one loses a
    /// concurrent race, the decrements already applied are restocked before
    /// the failure is returned, so a failed placement never leaves stock
    /// reserved.
    pub async fn place_order(
        &self,
        buyer_id: &str,
        store_id: &str,
        items: &[BasketItem],
    ) -> Result<String> {
        if self.users.get(buyer_id).await?.is_none() {
            return Err(OrderError::UserNotFound(buyer_id.to_string()));
        }
        let store = self
            .catalog
            .get_store(store_id)
            .await?
            .ok_or_else(|| OrderError::StoreNotFound(store_id.to_string()))?;

        // Validation pass: resolve every book and capture its price before
        // touching any stock.
        let mut lines = Vec::with_capacity(items.len());
        for (book_id, count) in order::merge_basket(items) {
            let listing = store
                .book(&book_id)
                .ok_or_else(|| OrderError::BookNotFound(book_id.clone()))?;
            if listing.stock_level < count {
                return Err(OrderError::InsufficientStock(book_id));
            }
            lines.push(OrderLine {
                book_id,
                count,
                price: listing.price,
            });
        }

        // Reservation pass. Each decrement re-checks the stock level at
        // write time; a lost race rolls back the ones already applied.
        let mut reserved: Vec<&OrderLine> = Vec::with_capacity(lines.len());
        for line in &lines {
            match self.catalog.take_stock(store_id, &line.book_id, line.count).await {
                Ok(true) => reserved.push(line),
                Ok(false) => {
                    self.release(store_id, &reserved).await;
                    return Err(OrderError::InsufficientStock(line.book_id.clone()));
                }
                Err(e) => {
                    self.release(store_id, &reserved).await;
                    return Err(e.into());
                }
            }
        }

        let order_id = order::new_order_id(buyer_id, store_id);
        let record = Order {
            order_id: order_id.clone(),
            store_id: store_id.to_string(),
            user_id: buyer_id.to_string(),
        };
        if let Err(e) = self.orders.insert(record, &lines).await {
            self.release(store_id, &reserved).await;
            return Err(e.into());
        }

        debug!(%order_id, buyer_id, store_id, lines = lines.len(), "order placed");
        Ok(order_id)
    }

    /// Returns already-reserved stock after a placement failure. Restock
    /// failures are logged rather than propagated; the placement error is the
    /// one the caller needs to see.
    async fn release(&self, store_id: &str, reserved: &[&OrderLine]) {
        for line in reserved {
            match self.catalog.restock(store_id, &line.book_id, line.count).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(store_id, book_id = %line.book_id, "restock target missing")
                }
                Err(e) => warn!(store_id, book_id = %line.book_id, error = %e, "restock failed"),
            }
        }
    }
}
