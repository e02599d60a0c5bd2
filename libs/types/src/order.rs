//! Order lifecycle types
//!
//! An order is created PENDING and leaves that state exactly once, either
//! to MATCHED (settled) or CANCELED (reservation released).

use crate::errors::OrderError;
use crate::ids::{CustomerId, OrderId};
use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy the instrument, paying in the settlement currency
    BUY,
    /// Sell the instrument for the settlement currency
    SELL,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => f.write_str("BUY"),
            Side::SELL => f.write_str("SELL"),
        }
    }
}

/// Order status
///
/// MATCHED and CANCELED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted, balance reserved, awaiting settlement
    Pending,
    /// Settled at the order's own limit price (terminal)
    Matched,
    /// Canceled, reservation released (terminal)
    Canceled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Matched | OrderStatus::Canceled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => f.write_str("PENDING"),
            OrderStatus::Matched => f.write_str("MATCHED"),
            OrderStatus::Canceled => f.write_str("CANCELED"),
        }
    }
}

/// A customer's limit order for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub asset_name: String,
    #[serde(rename = "orderSide")]
    pub side: Side,
    pub size: Quantity,
    pub price: Price,
    pub status: OrderStatus,
    pub create_date: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order
    pub fn new(
        customer_id: CustomerId,
        asset_name: impl Into<String>,
        side: Side,
        size: Quantity,
        price: Price,
        create_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            customer_id,
            asset_name: asset_name.into(),
            side,
            size,
            price,
            status: OrderStatus::Pending,
            create_date,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Move a pending order to a terminal status.
    ///
    /// Fails with `InvalidState` if the order already left PENDING, or if
    /// `to` is PENDING itself.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if !self.is_pending() || !to.is_terminal() {
            return Err(OrderError::InvalidState {
                order_id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}
