use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure of a single order, settlement or funding operation.
///
/// Every validation failure has its own variant so callers can react to the
/// kind without parsing messages. Unexpected store-layer failures collapse
/// into `Internal`; the detail is logged at the edge and never shown to the
/// caller.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("user {0} does not exist")]
    UserNotFound(String),
    #[error("store {0} does not exist")]
    StoreNotFound(String),
    #[error("book {0} does not exist")]
    BookNotFound(String),
    #[error("insufficient stock for book {0}")]
    InsufficientStock(String),
    #[error("invalid order id {0}")]
    InvalidOrder(String),
    #[error("authorization failed")]
    AuthorizationFailed,
    #[error("insufficient funds to pay order {0}")]
    InsufficientFunds(String),
    #[error("internal error: {0}")]
    Internal(#[from] StoreError),
}

impl OrderError {
    /// Status code reported on the operation surface. `200` is reserved for
    /// success; each failure kind has a fixed non-200 code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AuthorizationFailed => 401,
            Self::Internal(_) => 500,
            Self::UserNotFound(_) => 511,
            Self::StoreNotFound(_) => 513,
            Self::BookNotFound(_) => 515,
            Self::InsufficientStock(_) => 517,
            Self::InvalidOrder(_) => 518,
            Self::InsufficientFunds(_) => 519,
        }
    }
}

/// Error raised by a store adapter.
///
/// Services never match on these; they cross the service boundary only as
/// `OrderError::Internal`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("store corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::Corrupt(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderError::AuthorizationFailed.status_code(), 401);
        assert_eq!(OrderError::UserNotFound("u".into()).status_code(), 511);
        assert_eq!(OrderError::StoreNotFound("s".into()).status_code(), 513);
        assert_eq!(OrderError::BookNotFound("b".into()).status_code(), 515);
        assert_eq!(OrderError::InsufficientStock("b".into()).status_code(), 517);
        assert_eq!(OrderError::InvalidOrder("o".into()).status_code(), 518);
        assert_eq!(OrderError::InsufficientFunds("o".into()).status_code(), 519);
        assert_eq!(
            OrderError::Internal(StoreError::corrupt("bad record")).status_code(),
            500
        );
    }

    #[test]
    fn test_messages_name_the_subject() {
        let err = OrderError::BookNotFound("b42".into());
        assert_eq!(err.to_string(), "book b42 does not exist");
    }
}
