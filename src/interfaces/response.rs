use crate::error::OrderError;
use std::fmt;
use tracing::error;

/// The `(status, message[, order_id])` line every operation resolves to.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Response {
    pub status: u16,
    pub message: String,
    pub order_id: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            status: 200,
            message: "ok".to_string(),
            order_id: None,
        }
    }

    pub fn ok_with_order(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            ..Self::ok()
        }
    }

    /// Maps an error to its surface form. Internal failures are logged here
    /// and replaced with a fixed message; the caller never sees store-layer
    /// detail.
    pub fn failure(err: &OrderError) -> Self {
        let message = match err {
            OrderError::Internal(detail) => {
                error!(%detail, "operation failed in the store layer");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        Self {
            status: err.status_code(),
            message,
            order_id: None,
        }
    }
}

impl From<crate::error::Result<()>> for Response {
    fn from(result: crate::error::Result<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failure(&e),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.status, self.message)?;
        if let Some(order_id) = &self.order_id {
            write!(f, ",{order_id}")?;
        }
        Ok(())
    }
}
