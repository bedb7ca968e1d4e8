use crate::domain::catalog::BookListing;
use crate::domain::order::BasketItem;
use std::io::Read;
use std::num::NonZeroU32;
use thiserror::Error;

/// Failure to read or interpret one scenario row. The runner reports these
/// and moves on to the next row.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid record: {0}")]
    Invalid(String),
}

impl ReadError {
    fn invalid(detail: impl Into<String>) -> Self {
        Self::Invalid(detail.into())
    }
}

/// One operation of a scenario file.
///
/// `SeedUser` and `SeedStock` are fixture rows written straight through the
/// ports; `Fund`, `PlaceOrder` and `Pay` exercise the services. A placement
/// may carry a label so that later `Pay` rows can reference the generated
/// order id.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Op {
    SeedUser {
        user_id: String,
        password: String,
        balance: u64,
    },
    SeedStock {
        owner: String,
        store_id: String,
        listings: Vec<BookListing>,
    },
    Fund {
        user_id: String,
        password: String,
        amount: u64,
    },
    PlaceOrder {
        user_id: String,
        store_id: String,
        items: Vec<BasketItem>,
        label: Option<String>,
    },
    Pay {
        user_id: String,
        password: String,
        /// A label from an earlier `order` row, or a literal order id.
        order: String,
    },
}

#[derive(Debug, serde::Deserialize)]
struct OpRecord {
    op: String,
    user: String,
    password: Option<String>,
    store: Option<String>,
    items: Option<String>,
    amount: Option<u64>,
    label: Option<String>,
}

fn require(field: Option<String>, name: &str, op: &str) -> Result<String, ReadError> {
    field.ok_or_else(|| ReadError::invalid(format!("{op} requires the {name} field")))
}

/// Basket syntax: `book_id:count` entries separated by `;`.
fn parse_basket(items: &str) -> Result<Vec<BasketItem>, ReadError> {
    items
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (book_id, count) = entry
                .split_once(':')
                .ok_or_else(|| ReadError::invalid(format!("basket entry {entry:?}")))?;
            let count: NonZeroU32 = count
                .parse()
                .map_err(|_| ReadError::invalid(format!("count in basket entry {entry:?}")))?;
            Ok(BasketItem::new(book_id, count))
        })
        .collect()
}

/// Listing syntax: `book_id:stock:price` entries separated by `;`.
fn parse_listings(items: &str) -> Result<Vec<BookListing>, ReadError> {
    items
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let invalid = || ReadError::invalid(format!("listing entry {entry:?}"));
            let book_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
            let stock_level = parts
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .ok_or_else(invalid)?;
            let price = parts
                .next()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(invalid)?;
            Ok(BookListing {
                book_id: book_id.to_string(),
                price,
                stock_level,
            })
        })
        .collect()
}

impl TryFrom<OpRecord> for Op {
    type Error = ReadError;

    fn try_from(record: OpRecord) -> Result<Self, Self::Error> {
        let OpRecord {
            op,
            user,
            password,
            store,
            items,
            amount,
            label,
        } = record;

        match op.as_str() {
            "user" => Ok(Op::SeedUser {
                user_id: user,
                password: require(password, "password", "user")?,
                balance: amount.unwrap_or(0),
            }),
            "stock" => Ok(Op::SeedStock {
                owner: user,
                store_id: require(store, "store", "stock")?,
                listings: parse_listings(&require(items, "items", "stock")?)?,
            }),
            "fund" => Ok(Op::Fund {
                user_id: user,
                password: require(password, "password", "fund")?,
                amount: amount
                    .ok_or_else(|| ReadError::invalid("fund requires the amount field"))?,
            }),
            "order" => Ok(Op::PlaceOrder {
                user_id: user,
                store_id: require(store, "store", "order")?,
                items: parse_basket(&require(items, "items", "order")?)?,
                label,
            }),
            "pay" => Ok(Op::Pay {
                user_id: user,
                password: require(password, "password", "pay")?,
                order: require(label, "label", "pay")?,
            }),
            other => Err(ReadError::invalid(format!("unknown op {other:?}"))),
        }
    }
}

/// Reads scenario operations from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<Op>` lazily, so large scenario
/// files stream without being held in memory. Whitespace is trimmed and
/// short records are tolerated.
pub struct OpReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OpReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn ops(self) -> impl Iterator<Item = Result<Op, ReadError>> {
        self.reader
            .into_deserialize::<OpRecord>()
            .map(|result| result.map_err(ReadError::from).and_then(Op::try_from))
    }
}
