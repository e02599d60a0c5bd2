//! Order request validation
//!
//! Checks a raw placement request before it reaches the lifecycle and
//! converts its decimals into the positive `Quantity` / `Price` newtypes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::errors::OrderError;
use types::ids::CustomerId;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::SETTLEMENT_CURRENCY;

/// Placement request as received from the API layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer_id: CustomerId,
    pub asset_name: String,
    #[serde(rename = "orderSide")]
    pub side: Side,
    pub size: Decimal,
    pub price: Decimal,
}

/// A request that passed every check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub customer_id: CustomerId,
    pub asset_name: String,
    pub side: Side,
    pub size: Quantity,
    pub price: Price,
}

/// Validate a placement request.
///
/// Checks performed (in order):
/// 1. Customer id is not blank
/// 2. Asset name is not blank and is not the settlement currency
/// 3. Size is positive
/// 4. Price is positive
/// 5. `size × price` is exactly representable, so a SELL match credits the
///    full proceeds
pub fn validate_order(request: &PlaceOrderRequest) -> Result<ValidatedOrder, OrderError> {
    if request.customer_id.as_str().trim().is_empty() {
        return Err(OrderError::InvalidInput("customer id is required".into()));
    }

    let asset_name = request.asset_name.trim();
    if asset_name.is_empty() {
        return Err(OrderError::InvalidInput("asset name is required".into()));
    }
    if asset_name == SETTLEMENT_CURRENCY {
        return Err(OrderError::InvalidInput(format!(
            "{} is the settlement currency and cannot be traded",
            SETTLEMENT_CURRENCY
        )));
    }

    let size = Quantity::try_new(request.size)
        .ok_or_else(|| OrderError::InvalidQuantity(format!("size must be positive, got {}", request.size)))?;
    let price = Price::try_new(request.price)
        .ok_or_else(|| OrderError::InvalidPrice(format!("price must be positive, got {}", request.price)))?;
    if size.notional(price).is_none() {
        return Err(OrderError::InvalidInput(format!(
            "{} x {} cannot be settled without rounding",
            size, price
        )));
    }

    Ok(ValidatedOrder {
        customer_id: request.customer_id.clone(),
        asset_name: asset_name.to_string(),
        side: request.side,
        size,
        price,
    })
}
