use serde::{Deserialize, Serialize};

/// A registered user. Buyers and sellers share this record; the balance is
/// held in currency minor units and can never go negative because every
/// debit is conditioned on sufficiency at write time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct User {
    /// The unique identifier for the user.
    pub user_id: String,
    /// The stored credential, compared verbatim at settlement and funding.
    pub password: String,
    /// Funds available for settling orders, in minor units.
    pub balance: u64,
}

impl User {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>, balance: u64) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            balance,
        }
    }

    /// Checks a presented credential against the stored one.
    pub fn password_matches(&self, attempt: &str) -> bool {
        self.password == attempt
    }
}
