//! Asset Ledger — per-customer balances and every mutation to them
//!
//! Three order-driven movements, each with one behavior per side:
//!
//! | side | reserve (place)        | release (cancel)       | settle (match)                  |
//! |------|------------------------|------------------------|---------------------------------|
//! | BUY  | TRY.usable -= size     | TRY.usable += size     | instrument size/usable += size  |
//! | SELL | instr.usable -= size   | instr.usable += size   | TRY size/usable += size × price |
//!
//! The BUY reservation holds the order's unit size, not its notional.
//!
//! The `*_in` variants run inside a caller's transaction; the plain
//! variants open, and commit, a transaction of their own.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use types::asset::Asset;
use types::errors::{BrokerageError, LedgerError};
use types::ids::CustomerId;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::SETTLEMENT_CURRENCY;

use crate::store::{Store, Transaction};

/// Which of the order's two rows a movement touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    /// The customer's settlement currency row
    Currency,
    /// The traded instrument's row
    Instrument,
}

impl Leg {
    fn row<'a>(self, asset_name: &'a str) -> &'a str {
        match self {
            Leg::Currency => SETTLEMENT_CURRENCY,
            Leg::Instrument => asset_name,
        }
    }
}

/// How much a settlement credits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Proceeds {
    /// The order's unit size
    Units,
    /// size × price
    Notional,
}

/// Side → movement table. The only place BUY and SELL are told apart.
#[derive(Debug, Clone, Copy)]
struct Movement {
    reserved: Leg,
    settled: Leg,
    proceeds: Proceeds,
}

impl Movement {
    const fn for_side(side: Side) -> Self {
        match side {
            Side::BUY => Movement {
                reserved: Leg::Currency,
                settled: Leg::Instrument,
                proceeds: Proceeds::Units,
            },
            Side::SELL => Movement {
                reserved: Leg::Instrument,
                settled: Leg::Currency,
                proceeds: Proceeds::Notional,
            },
        }
    }
}

/// Owner of all balance mutations
#[derive(Debug, Clone)]
pub struct AssetLedger {
    store: Arc<Store>,
}

impl AssetLedger {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Name of the row a `side` order reserves from: TRY for BUY, the
    /// instrument itself for SELL.
    pub fn reserved_asset<'a>(&self, side: Side, asset_name: &'a str) -> &'a str {
        Movement::for_side(side).reserved.row(asset_name)
    }

    // ───────────────────────── Reservation ─────────────────────────

    pub fn reserve(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
    ) -> Result<(), BrokerageError> {
        let mut tx = self.store.begin()?;
        self.reserve_in(&mut tx, customer_id, asset_name, side, size)?;
        tx.commit();
        Ok(())
    }

    /// Take `size` out of the usable balance of the reserved row.
    ///
    /// Fails with `InsufficientFunds` (BUY) or `InsufficientHoldings`
    /// (SELL) when the usable balance is short; nothing is written then.
    pub fn reserve_in(
        &self,
        tx: &mut Transaction<'_>,
        customer_id: &CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
    ) -> Result<(), BrokerageError> {
        let leg = Movement::for_side(side).reserved;
        let mut row = load(tx, customer_id, leg.row(asset_name))?;
        let amount = size.as_decimal();

        if row.usable_size < amount {
            return Err(shortfall(leg, &row, amount).into());
        }
        row.reserve(amount)?;

        debug!(
            customer_id = %customer_id,
            asset = %row.asset_name,
            %side,
            %amount,
            usable_size = %row.usable_size,
            "reserved balance"
        );
        tx.save_asset(row);
        Ok(())
    }

    // ───────────────────────── Release ─────────────────────────

    pub fn release(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
    ) -> Result<(), BrokerageError> {
        let mut tx = self.store.begin()?;
        self.release_in(&mut tx, customer_id, asset_name, side, size)?;
        tx.commit();
        Ok(())
    }

    /// Return `size` to the usable balance of the reserved row.
    ///
    /// Must be called once per cancelled order; nothing here deduplicates.
    pub fn release_in(
        &self,
        tx: &mut Transaction<'_>,
        customer_id: &CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
    ) -> Result<(), BrokerageError> {
        let leg = Movement::for_side(side).reserved;
        let mut row = load(tx, customer_id, leg.row(asset_name))?;
        let amount = size.as_decimal();
        row.release(amount)?;

        debug!(
            customer_id = %customer_id,
            asset = %row.asset_name,
            %side,
            %amount,
            usable_size = %row.usable_size,
            "released reservation"
        );
        tx.save_asset(row);
        Ok(())
    }

    // ───────────────────────── Settlement ─────────────────────────

    pub fn settle(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
        price: Price,
    ) -> Result<(), BrokerageError> {
        let mut tx = self.store.begin()?;
        self.settle_in(&mut tx, customer_id, asset_name, side, size, price)?;
        tx.commit();
        Ok(())
    }

    /// Credit the proceeds of a matched order.
    ///
    /// BUY credits `size` units of the instrument, creating its row if the
    /// customer never held it. SELL credits `size × price` of TRY.
    pub fn settle_in(
        &self,
        tx: &mut Transaction<'_>,
        customer_id: &CustomerId,
        asset_name: &str,
        side: Side,
        size: Quantity,
        price: Price,
    ) -> Result<(), BrokerageError> {
        let movement = Movement::for_side(side);
        let target = movement.settled.row(asset_name);

        let amount = match movement.proceeds {
            Proceeds::Units => size.as_decimal(),
            Proceeds::Notional => size.notional(price).ok_or_else(|| {
                LedgerError::InvariantViolation {
                    customer_id: customer_id.to_string(),
                    asset: target.to_string(),
                }
            })?,
        };

        let mut row = match movement.settled {
            Leg::Instrument => tx
                .find_asset(customer_id, target)
                .cloned()
                .unwrap_or_else(|| Asset::zeroed(customer_id.clone(), target)),
            Leg::Currency => load(tx, customer_id, target)?,
        };
        row.credit(amount)?;

        debug!(
            customer_id = %customer_id,
            asset = %row.asset_name,
            %side,
            %amount,
            size = %row.size,
            "settled proceeds"
        );
        tx.save_asset(row);
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn get_balance(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
    ) -> Result<Asset, BrokerageError> {
        self.store
            .find_asset(customer_id, asset_name)?
            .ok_or_else(|| not_found(customer_id, asset_name).into())
    }

    pub fn list_balances(&self, customer_id: &CustomerId) -> Result<Vec<Asset>, BrokerageError> {
        self.store.assets_by_customer(customer_id)
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Create the zero TRY row of a new customer.
    pub fn provision(&self, customer_id: &CustomerId) -> Result<(), BrokerageError> {
        let mut tx = self.store.begin()?;
        if tx.find_asset(customer_id, SETTLEMENT_CURRENCY).is_some() {
            return Err(LedgerError::AlreadyProvisioned {
                customer_id: customer_id.to_string(),
            }
            .into());
        }
        tx.save_asset(Asset::zeroed(customer_id.clone(), SETTLEMENT_CURRENCY));
        tx.commit();

        info!(customer_id = %customer_id, "provisioned customer");
        Ok(())
    }

    /// Credit `amount` of `asset_name` to a customer, creating the row if
    /// needed. Returns the updated row.
    pub fn deposit(
        &self,
        customer_id: &CustomerId,
        asset_name: &str,
        amount: Decimal,
    ) -> Result<Asset, BrokerageError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount: amount.to_string(),
            }
            .into());
        }

        let mut tx = self.store.begin()?;
        let mut row = tx
            .find_asset(customer_id, asset_name)
            .cloned()
            .unwrap_or_else(|| Asset::zeroed(customer_id.clone(), asset_name));
        row.credit(amount)?;
        tx.save_asset(row.clone());
        tx.commit();

        info!(customer_id = %customer_id, asset = asset_name, %amount, "deposited");
        Ok(row)
    }
}

fn load(
    tx: &Transaction<'_>,
    customer_id: &CustomerId,
    asset_name: &str,
) -> Result<Asset, LedgerError> {
    tx.find_asset(customer_id, asset_name)
        .cloned()
        .ok_or_else(|| not_found(customer_id, asset_name))
}

fn not_found(customer_id: &CustomerId, asset_name: &str) -> LedgerError {
    LedgerError::AssetNotFound {
        customer_id: customer_id.to_string(),
        asset: asset_name.to_string(),
    }
}

fn shortfall(leg: Leg, row: &Asset, required: Decimal) -> LedgerError {
    match leg {
        Leg::Currency => LedgerError::InsufficientFunds {
            required: required.to_string(),
            available: row.usable_size.to_string(),
        },
        Leg::Instrument => LedgerError::InsufficientHoldings {
            asset: row.asset_name.clone(),
            required: required.to_string(),
            available: row.usable_size.to_string(),
        },
    }
}
