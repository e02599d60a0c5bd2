//! Error types for the settlement core
//!
//! Per-area taxonomies using thiserror, folded into `BrokerageError`.
//! The boundary layer maps `ErrorKind` to a user-facing status.

use thiserror::Error;

/// Top-level settlement error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerageError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// Order-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid order request: {0}")]
    InvalidInput(String),

    #[error("Order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("Order {order_id} does not belong to customer {customer_id}")]
    Forbidden { order_id: String, customer_id: String },

    #[error("Order {order_id} is {status}; only pending orders can change state")]
    InvalidState { order_id: String, status: String },
}

/// Asset ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Asset not found: {asset} for customer: {customer_id}")]
    AssetNotFound { customer_id: String, asset: String },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("Insufficient holdings of {asset}: required {required}, available {available}")]
    InsufficientHoldings {
        asset: String,
        required: String,
        available: String,
    },

    #[error("Customer already provisioned: {customer_id}")]
    AlreadyProvisioned { customer_id: String },

    #[error("Amount must be positive: {amount}")]
    InvalidAmount { amount: String },

    #[error("Balance invariant violated for {asset} of customer {customer_id}")]
    InvariantViolation { customer_id: String, asset: String },
}

/// Distinguishable failure kinds for the boundary layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    InsufficientFunds,
    InsufficientHoldings,
    AlreadyExists,
    InvalidInput,
    Internal,
}

impl BrokerageError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerageError::Order(err) => match err {
                OrderError::NotFound { .. } => ErrorKind::NotFound,
                OrderError::Forbidden { .. } => ErrorKind::Forbidden,
                OrderError::InvalidState { .. } => ErrorKind::InvalidState,
                OrderError::InvalidPrice(_)
                | OrderError::InvalidQuantity(_)
                | OrderError::InvalidInput(_) => ErrorKind::InvalidInput,
            },
            BrokerageError::Ledger(err) => match err {
                LedgerError::AssetNotFound { .. } => ErrorKind::NotFound,
                LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
                LedgerError::InsufficientHoldings { .. } => ErrorKind::InsufficientHoldings,
                LedgerError::AlreadyProvisioned { .. } => ErrorKind::AlreadyExists,
                LedgerError::InvalidAmount { .. } => ErrorKind::InvalidInput,
                LedgerError::InvariantViolation { .. } => ErrorKind::Internal,
            },
            BrokerageError::Storage { .. } => ErrorKind::Internal,
        }
    }
}
