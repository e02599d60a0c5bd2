//! Brokerage — the surface the API layer consumes
//!
//! Ties the validator, lifecycle and ledger together over one store.
//! Authorization is the caller's job; every method trusts its arguments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use types::asset::Asset;
use types::errors::BrokerageError;
use types::ids::{CustomerId, OrderId};
use types::order::Order;

use crate::clock::{Clock, SystemClock};
use crate::ledger::AssetLedger;
use crate::lifecycle::OrderLifecycle;
use crate::store::Store;
use crate::validator::{self, PlaceOrderRequest};

/// Settlement service handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Brokerage {
    lifecycle: OrderLifecycle,
    ledger: AssetLedger,
}

impl Brokerage {
    /// Create a service over an empty store using the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a service with a custom time source
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(Store::new());
        let ledger = AssetLedger::new(store.clone());
        let lifecycle = OrderLifecycle::new(store, ledger.clone(), clock);
        Self { lifecycle, ledger }
    }

    pub fn place_order(&self, request: &PlaceOrderRequest) -> Result<Order, BrokerageError> {
        let order = validator::validate_order(request)?;
        self.lifecycle.place(
            order.customer_id,
            &order.asset_name,
            order.side,
            order.size,
            order.price,
        )
    }

    pub fn cancel_order(
        &self,
        order_id: &OrderId,
        acting_customer_id: &CustomerId,
    ) -> Result<(), BrokerageError> {
        self.lifecycle.cancel(order_id, acting_customer_id)
    }

    pub fn match_order(&self, order_id: &OrderId) -> Result<(), BrokerageError> {
        self.lifecycle.match_order(order_id)
    }

    pub fn list_orders(
        &self,
        customer_id: &CustomerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, BrokerageError> {
        self.lifecycle.list_by_customer(customer_id, start, end)
    }

    pub fn list_pending_orders(&self) -> Result<Vec<Order>, BrokerageError> {
        self.lifecycle.list_pending()
    }

    pub fn get_order(&self, order_id: &OrderId) -> Result<Order, BrokerageError> {
        self.lifecycle.get_by_id(order_id)
    }

    pub fn get_balance(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
    ) -> Result<Asset, BrokerageError> {
        self.ledger.get_balance(customer_id, asset_name)
    }

    pub fn list_balances(&self, customer_id: &CustomerId) -> Result<Vec<Asset>, BrokerageError> {
        self.ledger.list_balances(customer_id)
    }

    pub fn provision_customer(&self, customer_id: &CustomerId) -> Result<(), BrokerageError> {
        self.ledger.provision(customer_id)
    }

    pub fn deposit(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
        amount: Decimal,
    ) -> Result<Asset, BrokerageError> {
        self.ledger.deposit(customer_id, asset_name, amount)
    }
}

impl Default for Brokerage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::errors::ErrorKind;
    use types::order::Side;

    #[test]
    fn test_place_order_validates_first() {
        let brokerage = Brokerage::new();
        let request = PlaceOrderRequest {
            customer_id: CustomerId::from("CUST001"),
            asset_name: "AAPL".into(),
            side: Side::BUY,
            size: Decimal::ZERO,
            price: Decimal::from(150),
        };

        let err = brokerage.place_order(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_place_order_without_provisioning() {
        let brokerage = Brokerage::new();
        let request = PlaceOrderRequest {
            customer_id: CustomerId::from("CUST404"),
            asset_name: "AAPL".into(),
            side: Side::BUY,
            size: Decimal::ONE,
            price: Decimal::ONE,
        };

        let err = brokerage.place_order(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_handle_is_send_sync() {
        fn require_send_sync<T: Send + Sync>() {}
        require_send_sync::<Brokerage>();
    }
}
