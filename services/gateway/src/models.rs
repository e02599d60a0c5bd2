use crate::users::User;
use serde::{Deserialize, Serialize};
use types::identity::Role;
use types::ids::CustomerId;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Absent on registration; the new user logs in separately.
    pub token: Option<String>,
    pub user: UserView,
}

/// Public view of a user, without credentials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            customer_id: user.customer_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub customer_id: CustomerId,
}

/// Date bounds are ISO-8601 date-times; an offset-less value is read as UTC.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub customer_id: CustomerId,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
