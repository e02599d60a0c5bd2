//! Concurrency test
//!
//! Many threads reserve against the same balance row through one shared
//! service. The store serializes each read-modify-write, so the row is
//! never oversubscribed and no update is lost.

use rust_decimal::Decimal;
use settlement::validator::PlaceOrderRequest;
use settlement::Brokerage;
use std::thread;
use types::errors::ErrorKind;
use types::ids::CustomerId;
use types::order::{OrderStatus, Side};

fn buy_one(customer: &CustomerId) -> PlaceOrderRequest {
    PlaceOrderRequest {
        customer_id: customer.clone(),
        asset_name: "AAPL".into(),
        side: Side::BUY,
        size: Decimal::ONE,
        price: Decimal::from(100),
    }
}

#[test]
fn test_concurrent_reservations_never_oversubscribe() {
    let brokerage = Brokerage::new();
    let customer = CustomerId::from("CUST001");
    brokerage.provision_customer(&customer).unwrap();
    brokerage.deposit(&customer, "TRY", Decimal::from(100)).unwrap();

    // 8 threads × 25 attempts = 200 one-unit reservations against 100 TRY
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let brokerage = brokerage.clone();
            let customer = customer.clone();
            thread::spawn(move || {
                let mut accepted = 0u32;
                for _ in 0..25 {
                    match brokerage.place_order(&buy_one(&customer)) {
                        Ok(_) => accepted += 1,
                        Err(e) => assert_eq!(e.kind(), ErrorKind::InsufficientFunds),
                    }
                }
                accepted
            })
        })
        .collect();

    let accepted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(accepted, 100);

    let cash = brokerage.get_balance(&customer, "TRY").unwrap();
    assert_eq!(cash.usable_size, Decimal::ZERO);
    assert_eq!(cash.size, Decimal::from(100));
    assert_eq!(brokerage.list_pending_orders().unwrap().len(), 100);
}

#[test]
fn test_concurrent_cancel_and_match_settle_once() {
    let brokerage = Brokerage::new();
    let customer = CustomerId::from("CUST001");
    brokerage.provision_customer(&customer).unwrap();
    brokerage.deposit(&customer, "TRY", Decimal::from(50)).unwrap();

    let orders: Vec<_> = (0..50)
        .map(|_| brokerage.place_order(&buy_one(&customer)).unwrap())
        .collect();

    // One thread cancels every order while another matches every order.
    let canceller = {
        let brokerage = brokerage.clone();
        let customer = customer.clone();
        let ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        thread::spawn(move || {
            ids.iter()
                .filter(|id| brokerage.cancel_order(id, &customer).is_ok())
                .count()
        })
    };
    let matcher = {
        let brokerage = brokerage.clone();
        let ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        thread::spawn(move || ids.iter().filter(|id| brokerage.match_order(id).is_ok()).count())
    };

    let canceled = canceller.join().unwrap();
    let matched = matcher.join().unwrap();
    assert_eq!(canceled + matched, 50);

    let statuses: Vec<_> = orders
        .iter()
        .map(|o| brokerage.get_order(&o.id).unwrap().status)
        .collect();
    assert_eq!(
        statuses.iter().filter(|s| **s == OrderStatus::Canceled).count(),
        canceled
    );

    let cash = brokerage.get_balance(&customer, "TRY").unwrap();
    assert_eq!(cash.usable_size, Decimal::from(canceled as u64));

    let aapl_size = brokerage
        .get_balance(&customer, "AAPL")
        .map(|a| a.size)
        .unwrap_or(Decimal::ZERO);
    assert_eq!(aapl_size, Decimal::from(matched as u64));
}
