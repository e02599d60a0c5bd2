use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::ApiQuery;
use crate::models::CustomerQuery;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use types::asset::Asset;

pub async fn list_assets(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<CustomerQuery>,
) -> Result<Json<Vec<Asset>>, AppError> {
    user.require_access_to(&query.customer_id)?;

    let assets = state.brokerage.list_balances(&query.customer_id)?;
    Ok(Json(assets))
}

pub async fn get_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(asset_name): Path<String>,
    ApiQuery(query): ApiQuery<CustomerQuery>,
) -> Result<Json<Asset>, AppError> {
    user.require_access_to(&query.customer_id)?;

    let asset = state.brokerage.get_balance(&query.customer_id, &asset_name)?;
    Ok(Json(asset))
}
