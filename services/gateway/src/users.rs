//! User directory
//!
//! Login accounts and their roles. Customers are bound to exactly one
//! `CustomerId`; administrators to none. Passwords are kept as salted
//! SHA-256 digests.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use thiserror::Error;
use types::identity::{Identity, Role};
use types::ids::CustomerId;
use uuid::Uuid;

/// Highest number a generated `CUSTnnn` id can carry
const MAX_GENERATED_CUSTOMER: u32 = 999;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Customer id already assigned: {0}")]
    CustomerIdTaken(String),

    #[error("No customer ids left to assign")]
    CustomerIdsExhausted,
}

/// A stored login account
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub role: Role,
    pub customer_id: Option<CustomerId>,
    salt: String,
    password_hash: String,
}

impl User {
    fn new(username: &str, password: &str, role: Role, customer_id: Option<CustomerId>) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let password_hash = digest(&salt, password);
        Self {
            username: username.to_string(),
            role,
            customer_id,
            salt,
            password_hash,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            role: self.role,
            customer_id: self.customer_id.clone(),
        }
    }

    fn verify_password(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.password_hash
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Concurrent username → user map with a customer id index
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
    customer_ids: DashMap<CustomerId, String>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user. A customer id, when given, must not belong to anyone.
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        customer_id: Option<CustomerId>,
    ) -> Result<User, DirectoryError> {
        let Entry::Vacant(slot) = self.users.entry(username.to_string()) else {
            return Err(DirectoryError::UsernameTaken(username.to_string()));
        };

        if let Some(id) = &customer_id {
            match self.customer_ids.entry(id.clone()) {
                Entry::Occupied(_) => return Err(DirectoryError::CustomerIdTaken(id.to_string())),
                Entry::Vacant(v) => {
                    v.insert(username.to_string());
                }
            }
        }

        let user = User::new(username, password, role, customer_id);
        slot.insert(user.clone());
        Ok(user)
    }

    /// Create a customer under the lowest free `CUSTnnn` id.
    pub fn register_customer(&self, username: &str, password: &str) -> Result<User, DirectoryError> {
        let Entry::Vacant(slot) = self.users.entry(username.to_string()) else {
            return Err(DirectoryError::UsernameTaken(username.to_string()));
        };

        let customer_id = (1..=MAX_GENERATED_CUSTOMER)
            .map(|n| CustomerId::new(format!("CUST{n:03}")))
            .find(|id| match self.customer_ids.entry(id.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(v) => {
                    v.insert(username.to_string());
                    true
                }
            })
            .ok_or(DirectoryError::CustomerIdsExhausted)?;

        let user = User::new(username, password, Role::Customer, Some(customer_id));
        slot.insert(user.clone());
        Ok(user)
    }

    /// Drop a user and free its customer id.
    pub fn remove(&self, username: &str) -> Option<User> {
        let (_, user) = self.users.remove(username)?;
        if let Some(id) = &user.customer_id {
            self.customer_ids.remove(id);
        }
        Some(user)
    }

    /// The user, if `password` matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        self.users
            .get(username)
            .filter(|user| user.verify_password(password))
            .map(|user| user.value().clone())
    }

    pub fn find(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|user| user.value().clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
