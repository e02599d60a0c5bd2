//! Demo accounts created at startup

use crate::state::AppState;
use rust_decimal::Decimal;
use types::identity::Role;
use types::ids::CustomerId;
use types::SETTLEMENT_CURRENCY;

struct DemoCustomer {
    username: &'static str,
    password: &'static str,
    customer_id: &'static str,
    /// Opening TRY balance in kuruş
    opening_cents: i64,
}

const DEMO_CUSTOMERS: [DemoCustomer; 2] = [
    DemoCustomer {
        username: "customer1",
        password: "customer123",
        customer_id: "CUST001",
        opening_cents: 1_000_000,
    },
    DemoCustomer {
        username: "customer2",
        password: "customer456",
        customer_id: "CUST002",
        opening_cents: 500_000,
    },
];

/// Create the admin and the two demo customers with funded TRY rows.
///
/// Every step is independent: a failure is logged and the rest still run.
pub fn seed_demo_data(state: &AppState) {
    match state.users.create_user("admin", "admin123", Role::Admin, None) {
        Ok(_) => tracing::info!("admin user created"),
        Err(e) => tracing::warn!(error = %e, "admin user not created"),
    }

    for demo in &DEMO_CUSTOMERS {
        if let Err(e) = seed_customer(state, demo) {
            tracing::warn!(username = demo.username, error = %e, "demo customer not seeded");
        }
    }
}

fn seed_customer(state: &AppState, demo: &DemoCustomer) -> anyhow::Result<()> {
    let customer_id = CustomerId::from(demo.customer_id);
    state.users.create_user(
        demo.username,
        demo.password,
        Role::Customer,
        Some(customer_id.clone()),
    )?;
    state.brokerage.provision_customer(&customer_id)?;
    state.brokerage.deposit(
        &customer_id,
        SETTLEMENT_CURRENCY,
        Decimal::new(demo.opening_cents, 2),
    )?;

    tracing::info!(username = demo.username, customer_id = %customer_id, "demo customer created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    #[test]
    fn test_seed_creates_funded_customers() {
        let state = AppState::new(&GatewayConfig::default());
        seed_demo_data(&state);

        assert_eq!(state.users.len(), 3);
        let cash = state
            .brokerage
            .get_balance(&CustomerId::from("CUST001"), SETTLEMENT_CURRENCY)
            .unwrap();
        assert_eq!(cash.size, Decimal::from(10_000));
        assert_eq!(cash.usable_size, Decimal::from(10_000));
    }

    #[test]
    fn test_seed_twice_is_harmless() {
        let state = AppState::new(&GatewayConfig::default());
        seed_demo_data(&state);
        seed_demo_data(&state);

        assert_eq!(state.users.len(), 3);
        let cash = state
            .brokerage
            .get_balance(&CustomerId::from("CUST002"), SETTLEMENT_CURRENCY)
            .unwrap();
        assert_eq!(cash.size, Decimal::from(5_000));
    }
}
