use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use uuid::Uuid;

/// One requested basket entry. The count is non-zero by construction, so a
/// zero-quantity line is unrepresentable past the parsing edge.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BasketItem {
    pub book_id: String,
    pub count: NonZeroU32,
}

impl BasketItem {
    pub fn new(book_id: impl Into<String>, count: NonZeroU32) -> Self {
        Self {
            book_id: book_id.into(),
            count,
        }
    }
}

/// Collapses duplicate `book_id` entries by summing their counts, preserving
/// first-seen order. Keeps one line per distinct book downstream.
pub fn merge_basket(items: &[BasketItem]) -> Vec<(String, u32)> {
    let mut merged: Vec<(String, u32)> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|(id, _)| *id == item.book_id) {
            Some((_, count)) => *count = count.saturating_add(item.count.get()),
            None => merged.push((item.book_id.clone(), item.count.get())),
        }
    }
    merged
}

/// A pending, unpaid order. The existence of this record *is* the unpaid
/// state: settlement deletes it, which is what makes a paid order impossible
/// to pay twice.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Order {
    pub order_id: String,
    pub store_id: String,
    /// The buyer who placed the order; only they may pay it.
    pub user_id: String,
}

/// One line of an order: quantity and the unit price captured at placement
/// time. The captured price is what settlement charges, regardless of later
/// catalog changes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct OrderLine {
    pub book_id: String,
    pub count: u32,
    pub price: u64,
}

/// Generates an opaque, non-colliding order id. The buyer and store prefix
/// keeps ids greppable in the store; the uuid component makes them
/// unpredictable.
pub fn new_order_id(user_id: &str, store_id: &str) -> String {
    format!("{}_{}_{}", user_id, store_id, Uuid::new_v4())
}
