//! Acting identity passed explicitly into every authorized operation

use crate::ids::CustomerId;
use serde::{Deserialize, Serialize};

/// Access role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Back-office operator, may act for any customer
    Admin,
    /// Account holder, may act only for itself
    Customer,
}

/// Who is performing a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    /// Present for customers; admins are not tied to an account
    pub customer_id: Option<CustomerId>,
}

impl Identity {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            customer_id: None,
        }
    }

    pub fn customer(customer_id: CustomerId) -> Self {
        Self {
            role: Role::Customer,
            customer_id: Some(customer_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this identity may act on `customer_id`'s account.
    pub fn can_act_for(&self, customer_id: &CustomerId) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Customer => self.customer_id.as_ref() == Some(customer_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_acts_for_anyone() {
        let admin = Identity::admin();
        assert!(admin.is_admin());
        assert!(admin.can_act_for(&CustomerId::from("CUST001")));
    }

    #[test]
    fn test_customer_acts_only_for_itself() {
        let customer = Identity::customer(CustomerId::from("CUST001"));
        assert!(customer.can_act_for(&CustomerId::from("CUST001")));
        assert!(!customer.can_act_for(&CustomerId::from("CUST002")));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"CUSTOMER\"");
    }
}
