//! Asset balance rows
//!
//! One row per customer and instrument. `size` is the total held,
//! `usable_size` the part not reserved by a pending order.
//!
//! Invariant: 0 <= usable_size <= size

use crate::errors::LedgerError;
use crate::ids::CustomerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance of a single asset for a single customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub customer_id: CustomerId,
    pub asset_name: String,
    pub size: Decimal,
    pub usable_size: Decimal,
}

impl Asset {
    /// Create a zero balance row
    pub fn zeroed(customer_id: CustomerId, asset_name: impl Into<String>) -> Self {
        Self {
            customer_id,
            asset_name: asset_name.into(),
            size: Decimal::ZERO,
            usable_size: Decimal::ZERO,
        }
    }

    /// Check balance invariant: 0 <= usable_size <= size
    pub fn check_invariant(&self) -> bool {
        self.usable_size >= Decimal::ZERO && self.usable_size <= self.size
    }

    /// Quantity currently held back by pending orders
    pub fn reserved(&self) -> Decimal {
        self.size - self.usable_size
    }

    /// Take `amount` out of the usable balance, leaving `size` unchanged.
    ///
    /// The row is left untouched on error.
    pub fn reserve(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let usable_size = self
            .usable_size
            .checked_sub(amount)
            .ok_or_else(|| self.violation())?;
        self.apply(self.size, usable_size)
    }

    /// Return `amount` to the usable balance.
    pub fn release(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let usable_size = self
            .usable_size
            .checked_add(amount)
            .ok_or_else(|| self.violation())?;
        self.apply(self.size, usable_size)
    }

    /// Credit `amount` to both the total and the usable balance.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let size = self.size.checked_add(amount).ok_or_else(|| self.violation())?;
        let usable_size = self
            .usable_size
            .checked_add(amount)
            .ok_or_else(|| self.violation())?;
        self.apply(size, usable_size)
    }

    fn apply(&mut self, size: Decimal, usable_size: Decimal) -> Result<(), LedgerError> {
        if usable_size < Decimal::ZERO || usable_size > size {
            return Err(self.violation());
        }
        self.size = size;
        self.usable_size = usable_size;
        Ok(())
    }

    fn violation(&self) -> LedgerError {
        LedgerError::InvariantViolation {
            customer_id: self.customer_id.to_string(),
            asset: self.asset_name.clone(),
        }
    }
}
