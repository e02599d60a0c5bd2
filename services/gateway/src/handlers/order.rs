use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::OrdersQuery;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use settlement::validator::PlaceOrderRequest;
use types::ids::OrderId;
use types::order::Order;

pub async fn create_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<PlaceOrderRequest>,
) -> Result<Json<Order>, AppError> {
    user.require_access_to(&payload.customer_id)?;

    let order = state.brokerage.place_order(&payload)?;
    Ok(Json(order))
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    user.require_access_to(&query.customer_id)?;

    let start = query.start_date.as_deref().map(parse_timestamp).transpose()?;
    let end = query.end_date.as_deref().map(parse_timestamp).transpose()?;
    let orders = state.brokerage.list_orders(&query.customer_id, start, end)?;
    Ok(Json(orders))
}

/// Customers cancel their own orders; an administrator cancels on the
/// owner's behalf.
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let order_id = parse_order_id(&order_id)?;

    let acting = if user.identity.is_admin() {
        state.brokerage.get_order(&order_id)?.customer_id
    } else {
        user.identity
            .customer_id
            .clone()
            .ok_or_else(|| AppError::Forbidden("No customer account bound to user".into()))?
    };

    state.brokerage.cancel_order(&order_id, &acting)?;
    Ok(StatusCode::OK)
}

pub async fn list_pending_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Order>>, AppError> {
    user.require_admin()?;

    let orders = state.brokerage.list_pending_orders()?;
    Ok(Json(orders))
}

pub async fn match_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    user.require_admin()?;

    let order_id = parse_order_id(&order_id)?;
    state.brokerage.match_order(&order_id)?;
    tracing::info!(order_id = %order_id, admin = %user.username, "match requested");
    Ok(StatusCode::OK)
}

fn parse_order_id(raw: &str) -> Result<OrderId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid order id: {}", raw)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::BadRequest(format!("Invalid date-time: {}", raw)))
}
