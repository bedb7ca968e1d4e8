use serde::{Deserialize, Serialize};

/// One book listed in a store: unit price in minor units and the remaining
/// purchasable quantity.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BookListing {
    pub book_id: String,
    pub price: u64,
    pub stock_level: u32,
}

/// A store document: the owning seller plus the embedded book listings.
///
/// The whole document is the unit of atomicity; a conditional stock update
/// targets one listing inside it. `book_id` is unique within `books`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct StoreDoc {
    pub store_id: String,
    /// The seller credited at settlement.
    pub owner: String,
    pub books: Vec<BookListing>,
}

impl StoreDoc {
    pub fn new(store_id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            owner: owner.into(),
            books: Vec::new(),
        }
    }

    pub fn book(&self, book_id: &str) -> Option<&BookListing> {
        self.books.iter().find(|b| b.book_id == book_id)
    }

    pub fn book_mut(&mut self, book_id: &str) -> Option<&mut BookListing> {
        self.books.iter_mut().find(|b| b.book_id == book_id)
    }

    /// Inserts a listing or replaces the one with the same `book_id`.
    pub fn put_book(&mut self, listing: BookListing) {
        match self.book_mut(&listing.book_id) {
            Some(existing) => *existing = listing,
            None => self.books.push(listing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(book_id: &str, price: u64, stock_level: u32) -> BookListing {
        BookListing {
            book_id: book_id.into(),
            price,
            stock_level,
        }
    }

    #[test]
    fn test_book_lookup() {
        let mut store = StoreDoc::new("s1", "bob");
        store.put_book(listing("b1", 500, 10));
        store.put_book(listing("b2", 750, 3));

        assert_eq!(store.book("b1").unwrap().price, 500);
        assert_eq!(store.book("b2").unwrap().stock_level, 3);
        assert!(store.book("b3").is_none());
    }

    #[test]
    fn test_put_book_replaces_same_id() {
        let mut store = StoreDoc::new("s1", "bob");
        store.put_book(listing("b1", 500, 10));
        store.put_book(listing("b1", 600, 4));

        assert_eq!(store.books.len(), 1);
        assert_eq!(store.book("b1").unwrap().price, 600);
        assert_eq!(store.book("b1").unwrap().stock_level, 4);
    }
}
