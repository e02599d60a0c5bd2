//! Store — transactional in-memory tables for assets and orders
//!
//! Two tables:
//! - `assets`, unique on (customer_id, asset_name)
//! - `orders`, keyed on order id
//!
//! # Concurrency
//!
//! A `Transaction` holds the store's write lock for its whole lifetime, so
//! every read-modify-write on asset rows is serialized and no update can be
//! lost to a stale read. Plain queries take the shared read lock.
//!
//! # Rollback
//!
//! Every write inside a transaction records the previous row in an undo log.
//! `commit()` discards the log. Dropping an uncommitted transaction (early
//! return through `?`, or a panic) replays the log in reverse.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::{Bound, RangeBounds};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;
use types::asset::Asset;
use types::errors::BrokerageError;
use types::ids::{CustomerId, OrderId};
use types::order::{Order, OrderStatus};

/// Inclusive/exclusive bounds on an order's creation date
pub type DateRange = (Bound<DateTime<Utc>>, Bound<DateTime<Utc>>);

type AssetKey = (CustomerId, String);

#[derive(Debug, Default)]
struct Tables {
    assets: BTreeMap<AssetKey, Asset>,
    orders: BTreeMap<OrderId, Order>,
}

impl Tables {
    fn asset(&self, customer_id: &CustomerId, asset_name: &str) -> Option<&Asset> {
        self.assets
            .get(&(customer_id.clone(), asset_name.to_string()))
    }

    fn assets_of(&self, customer_id: &CustomerId) -> Vec<Asset> {
        self.assets
            .values()
            .filter(|a| &a.customer_id == customer_id)
            .cloned()
            .collect()
    }

    fn orders_of(&self, customer_id: &CustomerId, range: Option<&DateRange>) -> Vec<Order> {
        self.orders
            .values()
            .filter(|o| &o.customer_id == customer_id)
            .filter(|o| range.map_or(true, |r| r.contains(&o.create_date)))
            .cloned()
            .collect()
    }

    fn orders_with_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect()
    }
}

/// Shared relational store
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction, blocking until the write lock is free.
    ///
    /// Async callers hold the lock on their runtime worker. Every
    /// transaction is in-memory bookkeeping with no I/O, so the wait is
    /// bounded by one short critical section.
    pub fn begin(&self) -> Result<Transaction<'_>, BrokerageError> {
        let tables = self
            .tables
            .write()
            .map_err(|_| BrokerageError::storage("store lock poisoned"))?;
        Ok(Transaction {
            tables,
            undo: Vec::new(),
            committed: false,
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, BrokerageError> {
        self.tables
            .read()
            .map_err(|_| BrokerageError::storage("store lock poisoned"))
    }

    pub fn find_asset(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
    ) -> Result<Option<Asset>, BrokerageError> {
        Ok(self.read()?.asset(customer_id, asset_name).cloned())
    }

    /// All asset rows of a customer, ordered by asset name.
    pub fn assets_by_customer(&self, customer_id: &CustomerId) -> Result<Vec<Asset>, BrokerageError> {
        Ok(self.read()?.assets_of(customer_id))
    }

    pub fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, BrokerageError> {
        Ok(self.read()?.orders.get(order_id).cloned())
    }

    /// Orders of a customer in creation order, optionally limited to a
    /// creation-date range.
    pub fn orders_by_customer(
        &self,
        customer_id: &CustomerId,
        range: Option<DateRange>,
    ) -> Result<Vec<Order>, BrokerageError> {
        Ok(self.read()?.orders_of(customer_id, range.as_ref()))
    }

    pub fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, BrokerageError> {
        Ok(self.read()?.orders_with_status(status))
    }
}

#[derive(Debug)]
enum Undo {
    AssetInserted(AssetKey),
    AssetUpdated(Asset),
    OrderInserted(OrderId),
    OrderUpdated(Order),
}

/// Exclusive unit of work over the store
#[derive(Debug)]
pub struct Transaction<'a> {
    tables: RwLockWriteGuard<'a, Tables>,
    undo: Vec<Undo>,
    committed: bool,
}

impl Transaction<'_> {
    pub fn find_asset(&self, customer_id: &CustomerId, asset_name: &str) -> Option<&Asset> {
        self.tables.asset(customer_id, asset_name)
    }

    pub fn find_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.tables.orders.get(order_id)
    }

    /// Insert or replace an asset row.
    pub fn save_asset(&mut self, asset: Asset) {
        let key = (asset.customer_id.clone(), asset.asset_name.clone());
        let undo = match self.tables.assets.insert(key.clone(), asset) {
            Some(previous) => Undo::AssetUpdated(previous),
            None => Undo::AssetInserted(key),
        };
        self.undo.push(undo);
    }

    /// Insert or replace an order row.
    pub fn save_order(&mut self, order: Order) {
        let id = order.id;
        let undo = match self.tables.orders.insert(id, order) {
            Some(previous) => Undo::OrderUpdated(previous),
            None => Undo::OrderInserted(id),
        };
        self.undo.push(undo);
    }

    /// Make every write of this transaction permanent.
    pub fn commit(mut self) {
        self.undo.clear();
        self.committed = true;
    }

    fn rollback(&mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::AssetInserted(key) => {
                    self.tables.assets.remove(&key);
                }
                Undo::AssetUpdated(previous) => {
                    let key = (previous.customer_id.clone(), previous.asset_name.clone());
                    self.tables.assets.insert(key, previous);
                }
                Undo::OrderInserted(id) => {
                    self.tables.orders.remove(&id);
                }
                Undo::OrderUpdated(previous) => {
                    self.tables.orders.insert(previous.id, previous);
                }
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.undo.is_empty() {
            warn!(writes = self.undo.len(), "rolling back uncommitted transaction");
            self.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use types::numeric::{Price, Quantity};
    use types::order::Side;

    fn cust(id: &str) -> CustomerId {
        CustomerId::from(id)
    }

    fn funded(customer: &str, asset: &str, amount: u64) -> Asset {
        let mut row = Asset::zeroed(cust(customer), asset);
        row.credit(Decimal::from(amount)).unwrap();
        row
    }

    fn order_at(customer: &str, at: DateTime<Utc>) -> Order {
        Order::new(
            cust(customer),
            "AAPL",
            Side::BUY,
            Quantity::from_u64(1),
            Price::from_u64(100),
            at,
        )
    }

    #[test]
    fn test_commit_persists_writes() {
        let store = Store::new();
        let mut tx = store.begin().unwrap();
        tx.save_asset(funded("CUST001", "TRY", 100));
        tx.commit();

        let row = store.find_asset(&cust("CUST001"), "TRY").unwrap().unwrap();
        assert_eq!(row.size, Decimal::from(100));
    }

    #[test]
    fn test_drop_rolls_back_inserts_and_updates() {
        let store = Store::new();
        let mut tx = store.begin().unwrap();
        tx.save_asset(funded("CUST001", "TRY", 100));
        tx.commit();

        let order = order_at("CUST001", Utc::now());
        {
            let mut tx = store.begin().unwrap();
            tx.save_asset(funded("CUST001", "TRY", 5));
            tx.save_asset(funded("CUST001", "AAPL", 7));
            tx.save_order(order.clone());
            // dropped without commit
        }

        let row = store.find_asset(&cust("CUST001"), "TRY").unwrap().unwrap();
        assert_eq!(row.size, Decimal::from(100));
        assert!(store.find_asset(&cust("CUST001"), "AAPL").unwrap().is_none());
        assert!(store.find_order(&order.id).unwrap().is_none());
    }

    #[test]
    fn test_rollback_restores_updated_order() {
        let store = Store::new();
        let order = order_at("CUST001", Utc::now());
        let mut tx = store.begin().unwrap();
        tx.save_order(order.clone());
        tx.commit();

        {
            let mut tx = store.begin().unwrap();
            let mut changed = tx.find_order(&order.id).cloned().unwrap();
            changed.transition(OrderStatus::Canceled).unwrap();
            tx.save_order(changed);
        }

        let stored = store.find_order(&order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[test]
    fn test_orders_by_customer_range() {
        let store = Store::new();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let early = order_at("CUST001", base);
        let late = order_at("CUST001", base + Duration::days(2));
        let other = order_at("CUST002", base);

        let mut tx = store.begin().unwrap();
        for order in [&early, &late, &other] {
            tx.save_order(order.clone());
        }
        tx.commit();

        let all = store.orders_by_customer(&cust("CUST001"), None).unwrap();
        assert_eq!(all.len(), 2);

        let range = (Bound::Included(base), Bound::Included(base + Duration::days(1)));
        let ranged = store.orders_by_customer(&cust("CUST001"), Some(range)).unwrap();
        assert_eq!(ranged, vec![early.clone()]);

        let excluded = (Bound::Included(base - Duration::days(1)), Bound::Excluded(base));
        assert!(store.orders_by_customer(&cust("CUST001"), Some(excluded)).unwrap().is_empty());
    }

    #[test]
    fn test_orders_by_status() {
        let store = Store::new();
        let pending = order_at("CUST001", Utc::now());
        let mut matched = order_at("CUST002", Utc::now());
        matched.transition(OrderStatus::Matched).unwrap();

        let mut tx = store.begin().unwrap();
        tx.save_order(pending.clone());
        tx.save_order(matched);
        tx.commit();

        assert_eq!(store.orders_by_status(OrderStatus::Pending).unwrap(), vec![pending]);
    }

    #[test]
    fn test_assets_by_customer_sorted() {
        let store = Store::new();
        let mut tx = store.begin().unwrap();
        tx.save_asset(funded("CUST001", "TRY", 1));
        tx.save_asset(funded("CUST001", "AAPL", 2));
        tx.save_asset(funded("CUST002", "TRY", 3));
        tx.commit();

        let names: Vec<String> = store
            .assets_by_customer(&cust("CUST001"))
            .unwrap()
            .into_iter()
            .map(|a| a.asset_name)
            .collect();
        assert_eq!(names, vec!["AAPL".to_string(), "TRY".to_string()]);
    }
}
