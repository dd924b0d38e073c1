use serde::{Deserialize, Serialize};

/// The authenticated caller. `customer_id` is the tenant every backend call is
/// scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub customer_id: String,
    pub email: String,
    pub name: String,
    pub admin: bool,
    pub verified: bool,
    pub active: bool,
}

impl User {
    pub fn new(customer_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            email: email.into(),
            active: true,
            verified: true,
            ..Default::default()
        }
    }
}
