//! Order Lifecycle — order records and their state machine
//!
//! ```text
//! PENDING ──cancel──► CANCELED
//!    │
//!    └─────match────► MATCHED
//! ```
//!
//! Each transition writes the order and calls the ledger inside one store
//! transaction: both effects commit together or neither is visible.

use chrono::{DateTime, Utc};
use std::ops::Bound;
use std::sync::Arc;
use tracing::{info, warn};
use types::errors::{BrokerageError, LedgerError, OrderError};
use types::ids::{CustomerId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, Side};

use crate::clock::Clock;
use crate::ledger::AssetLedger;
use crate::store::{Store, Transaction};

/// Order state machine over the shared store
#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    store: Arc<Store>,
    ledger: AssetLedger,
    clock: Arc<dyn Clock>,
}

impl OrderLifecycle {
    pub fn new(store: Arc<Store>, ledger: AssetLedger, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            ledger,
            clock,
        }
    }

    /// Reserve the order's balance and record it as PENDING.
    ///
    /// A failed reservation leaves no order and no partial reservation.
    pub fn place(
        &self,
        customer_id: CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
        price: Price,
    ) -> Result<Order, BrokerageError> {
        let mut tx = self.store.begin()?;

        let reserved = self.ledger.reserved_asset(side, asset_name);
        if tx.find_asset(&customer_id, reserved).is_none() {
            warn!(customer_id = %customer_id, asset = reserved, "order rejected: no asset row");
            return Err(LedgerError::AssetNotFound {
                customer_id: customer_id.to_string(),
                asset: reserved.to_string(),
            }
            .into());
        }

        self.ledger
            .reserve_in(&mut tx, &customer_id, asset_name, side, size)
            .inspect_err(|e| warn!(customer_id = %customer_id, error = %e, "order rejected"))?;

        let order = Order::new(customer_id, asset_name, side, size, price, self.clock.now());
        tx.save_order(order.clone());
        tx.commit();

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            asset = %order.asset_name,
            %side,
            %size,
            %price,
            "order placed"
        );
        Ok(order)
    }

    /// Cancel a pending order and release its reservation.
    ///
    /// `requesting_customer_id` must own the order. An administrator acting
    /// on a customer's behalf passes the owner's id.
    pub fn cancel(
        &self,
        order_id: &OrderId,
        requesting_customer_id: &CustomerId,
    ) -> Result<(), BrokerageError> {
        let mut tx = self.store.begin()?;
        let mut order = pending_order(&tx, order_id, Some(requesting_customer_id))?;

        order.transition(OrderStatus::Canceled)?;
        tx.save_order(order.clone());
        self.ledger.release_in(
            &mut tx,
            &order.customer_id,
            &order.asset_name,
            order.side,
            order.size,
        )?;
        tx.commit();

        info!(order_id = %order.id, customer_id = %order.customer_id, "order canceled");
        Ok(())
    }

    /// Settle a pending order at its own limit price.
    ///
    /// Administrative and unconditional: no counter-order is looked for.
    pub fn match_order(&self, order_id: &OrderId) -> Result<(), BrokerageError> {
        let mut tx = self.store.begin()?;
        let mut order = pending_order(&tx, order_id, None)?;

        order.transition(OrderStatus::Matched)?;
        tx.save_order(order.clone());
        self.ledger.settle_in(
            &mut tx,
            &order.customer_id,
            &order.asset_name,
            order.side,
            order.size,
            order.price,
        )?;
        tx.commit();

        info!(order_id = %order.id, customer_id = %order.customer_id, "order matched");
        Ok(())
    }

    /// Orders of a customer, optionally filtered by creation date.
    ///
    /// - both bounds: `start <= create_date <= end`
    /// - start only: `start <= create_date < now`
    /// - no start: every order of the customer
    pub fn list_by_customer(
        &self,
        customer_id: &CustomerId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, BrokerageError> {
        let range = match (start, end) {
            (Some(start), Some(end)) => Some((Bound::Included(start), Bound::Included(end))),
            (Some(start), None) => Some((Bound::Included(start), Bound::Excluded(self.clock.now()))),
            (None, _) => None,
        };
        self.store.orders_by_customer(customer_id, range)
    }

    /// Every pending order across all customers.
    pub fn list_pending(&self) -> Result<Vec<Order>, BrokerageError> {
        self.store.orders_by_status(OrderStatus::Pending)
    }

    pub fn get_by_id(&self, order_id: &OrderId) -> Result<Order, BrokerageError> {
        self.store
            .find_order(order_id)?
            .ok_or_else(|| not_found(order_id).into())
    }
}

/// Load an order for a transition, checking ownership then state.
fn pending_order(
    tx: &Transaction<'_>,
    order_id: &OrderId,
    owner: Option<&CustomerId>,
) -> Result<Order, OrderError> {
    let order = tx.find_order(order_id).cloned().ok_or_else(|| not_found(order_id))?;

    if let Some(owner) = owner {
        if &order.customer_id != owner {
            warn!(order_id = %order_id, requested_by = %owner, "cancel forbidden");
            return Err(OrderError::Forbidden {
                order_id: order_id.to_string(),
                customer_id: owner.to_string(),
            });
        }
    }

    if !order.is_pending() {
        return Err(OrderError::InvalidState {
            order_id: order_id.to_string(),
            status: order.status.to_string(),
        });
    }
    Ok(order)
}

fn not_found(order_id: &OrderId) -> OrderError {
    OrderError::NotFound {
        order_id: order_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use types::errors::ErrorKind;
    use types::SETTLEMENT_CURRENCY;

    struct Fixture {
        lifecycle: OrderLifecycle,
        ledger: AssetLedger,
        clock: Arc<ManualClock>,
    }

    fn cust(id: &str) -> CustomerId {
        CustomerId::from(id)
    }

    fn setup() -> Fixture {
        let store = Arc::new(Store::new());
        let ledger = AssetLedger::new(store.clone());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        ));
        let lifecycle = OrderLifecycle::new(store, ledger.clone(), clock.clone());

        for (id, cash) in [("CUST001", 10_000), ("CUST002", 5_000)] {
            ledger.provision(&cust(id)).unwrap();
            ledger
                .deposit(&cust(id), SETTLEMENT_CURRENCY, Decimal::from(cash))
                .unwrap();
        }
        Fixture {
            lifecycle,
            ledger,
            clock,
        }
    }

    fn buy_aapl(f: &Fixture, customer: &str) -> Order {
        f.lifecycle
            .place(
                cust(customer),
                "AAPL",
                Side::BUY,
                Quantity::from_u64(10),
                Price::from_u64(150),
            )
            .unwrap()
    }

    #[test]
    fn test_place_creates_pending_order() {
        let f = setup();
        let order = buy_aapl(&f, "CUST001");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.create_date, f.clock.now());
        assert_eq!(f.lifecycle.get_by_id(&order.id).unwrap(), order);
    }

    #[test]
    fn test_place_sell_without_holdings_row() {
        let f = setup();
        let err = f
            .lifecycle
            .place(
                cust("CUST001"),
                "AAPL",
                Side::SELL,
                Quantity::from_u64(1),
                Price::from_u64(150),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(f.lifecycle.list_pending().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_requires_ownership() {
        let f = setup();
        let order = buy_aapl(&f, "CUST002");

        let err = f.lifecycle.cancel(&order.id, &cust("CUST001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(f.lifecycle.get_by_id(&order.id).unwrap().is_pending());
    }

    #[test]
    fn test_cancel_unknown_order() {
        let f = setup();
        let err = f.lifecycle.cancel(&OrderId::new(), &cust("CUST001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_match_then_cancel_is_invalid_state() {
        let f = setup();
        let order = buy_aapl(&f, "CUST001");
        f.lifecycle.match_order(&order.id).unwrap();

        let err = f.lifecycle.cancel(&order.id, &cust("CUST001")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = f.lifecycle.match_order(&order.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_failed_settlement_rolls_back_match() {
        let f = setup();
        // A full instrument row makes the BUY settlement overflow.
        f.ledger
            .deposit(&cust("CUST001"), "AAPL", Decimal::MAX)
            .unwrap();
        let order = buy_aapl(&f, "CUST001");

        let err = f.lifecycle.match_order(&order.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(f.lifecycle.get_by_id(&order.id).unwrap().is_pending());
        let aapl = f.ledger.get_balance(&cust("CUST001"), "AAPL").unwrap();
        assert_eq!(aapl.size, Decimal::MAX);
    }

    #[test]
    fn test_list_by_customer_date_filters() {
        let f = setup();
        let start = f.clock.now();
        let first = buy_aapl(&f, "CUST001");
        f.clock.advance(Duration::days(1));
        let second = buy_aapl(&f, "CUST001");
        f.clock.advance(Duration::days(1));
        buy_aapl(&f, "CUST002");

        let all = f.lifecycle.list_by_customer(&cust("CUST001"), None, None).unwrap();
        assert_eq!(all, vec![first.clone(), second.clone()]);

        let day_one = f
            .lifecycle
            .list_by_customer(&cust("CUST001"), Some(start), Some(start + Duration::hours(1)))
            .unwrap();
        assert_eq!(day_one, vec![first.clone()]);

        let since_start = f
            .lifecycle
            .list_by_customer(&cust("CUST001"), Some(start), None)
            .unwrap();
        assert_eq!(since_start.len(), 2);

        // open start with an end behaves like no filter
        let end_only = f
            .lifecycle
            .list_by_customer(&cust("CUST001"), None, Some(start))
            .unwrap();
        assert_eq!(end_only.len(), 2);
    }

    #[test]
    fn test_start_only_excludes_now() {
        let f = setup();
        let start = f.clock.now();
        buy_aapl(&f, "CUST001");

        // Created exactly at "now": excluded by the half-open range.
        let listed = f
            .lifecycle
            .list_by_customer(&cust("CUST001"), Some(start), None)
            .unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn test_list_pending_across_customers() {
        let f = setup();
        let a = buy_aapl(&f, "CUST001");
        let b = buy_aapl(&f, "CUST002");
        f.lifecycle.match_order(&a.id).unwrap();

        let pending = f.lifecycle.list_pending().unwrap();
        assert_eq!(pending, vec![b]);
    }
}
