use crate::domain::ports::{CatalogStoreRef, OrderStoreRef, UserStoreRef};
use crate::error::{OrderError, Result, StoreError};
use tracing::{debug, warn};

/// Settles orders: authorizes the buyer, totals the captured line prices,
/// moves the funds and retires the order record.
///
/// Deleting the order is the commit marker. Once it is gone the order can
/// never be paid again; a retried `pay` fails cleanly with `InvalidOrder`
/// instead of double-charging.
pub struct SettlementService {
    users: UserStoreRef,
    catalog: CatalogStoreRef,
    orders: OrderStoreRef,
}

impl SettlementService {
    pub fn new(users: UserStoreRef, catalog: CatalogStoreRef, orders: OrderStoreRef) -> Self {
        Self {
            users,
            catalog,
            orders,
        }
    }

    /// Pays `order_id` on behalf of `buyer_id`.
    ///
    /// The debit is a conditional update re-checked at write time, so a
    /// concurrent settlement draining the same balance cannot overdraw it.
    /// The credit is compensated (buyer refunded) if the seller record
    /// vanished between validation and transfer, keeping the pair
    /// all-or-nothing. Two settlements of the same order race on the
    /// delete; the loser reverses its transfer and fails.
    pub async fn pay(&self, buyer_id: &str, password: &str, order_id: &str) -> Result<()> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::InvalidOrder(order_id.to_string()))?;
        if order.user_id != buyer_id {
            return Err(OrderError::AuthorizationFailed);
        }

        let buyer = self
            .users
            .get(buyer_id)
            .await?
            .ok_or_else(|| OrderError::UserNotFound(buyer_id.to_string()))?;
        if !buyer.password_matches(password) {
            return Err(OrderError::AuthorizationFailed);
        }

        let store = self
            .catalog
            .get_store(&order.store_id)
            .await?
            .ok_or_else(|| OrderError::StoreNotFound(order.store_id.clone()))?;
        let seller_id = store.owner;
        if self.users.get(&seller_id).await?.is_none() {
            return Err(OrderError::UserNotFound(seller_id));
        }

        let total = order_total(order_id, &self.orders.lines(order_id).await?)?;
        if buyer.balance < total {
            return Err(OrderError::InsufficientFunds(order_id.to_string()));
        }

        if !self.users.debit(buyer_id, total).await? {
            // Balance moved between the read above and the conditional write.
            return Err(OrderError::InsufficientFunds(order_id.to_string()));
        }
        if !self.users.credit(&seller_id, total).await? {
            warn!(order_id, %seller_id, "seller vanished mid-transfer, refunding buyer");
            if let Err(e) = self.users.credit(buyer_id, total).await {
                warn!(order_id, buyer_id, error = %e, "refund failed");
            }
            return Err(OrderError::UserNotFound(seller_id));
        }

        // Commit marker. Removal reports whether the order was still live;
        // a concurrent settlement that deleted it first has already charged
        // the buyer, so this transfer is reversed before failing.
        if !self.orders.remove(order_id).await? {
            warn!(order_id, buyer_id, "order settled concurrently, reversing transfer");
            if let Err(e) = self.users.credit(buyer_id, total).await {
                warn!(order_id, buyer_id, error = %e, "refund failed");
            }
            match self.users.debit(&seller_id, total).await {
                Ok(true) => {}
                Ok(false) => warn!(order_id, %seller_id, "seller balance short of reversal"),
                Err(e) => warn!(order_id, %seller_id, error = %e, "reversal debit failed"),
            }
            return Err(OrderError::InvalidOrder(order_id.to_string()));
        }
        debug!(order_id, buyer_id, %seller_id, total, "order settled");
        Ok(())
    }

    /// Tops up `user_id` by `amount` minor units after a credential check.
    ///
    /// A missing user reports `AuthorizationFailed`, same as a bad password;
    /// this path does not reveal whether the account exists.
    pub async fn add_funds(&self, user_id: &str, password: &str, amount: u64) -> Result<()> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or(OrderError::AuthorizationFailed)?;
        if !user.password_matches(password) {
            return Err(OrderError::AuthorizationFailed);
        }

        if !self.users.credit(user_id, amount).await? {
            return Err(OrderError::UserNotFound(user_id.to_string()));
        }
        debug!(user_id, amount, "funds added");
        Ok(())
    }
}

/// Sums `price * count` over an order's lines. Overflowing u64 means the
/// stored lines are nonsense, which surfaces as an internal error rather
/// than a wrapped total.
fn order_total(order_id: &str, lines: &[crate::domain::order::OrderLine]) -> Result<u64> {
    let mut total: u64 = 0;
    for line in lines {
        let line_total = line
            .price
            .checked_mul(u64::from(line.count))
            .and_then(|t| total.checked_add(t))
            .ok_or_else(|| StoreError::corrupt(format!("order {order_id} total overflows")))?;
        total = line_total;
    }
    Ok(total)
}
