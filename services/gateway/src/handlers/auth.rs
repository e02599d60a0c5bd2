use crate::error::AppError;
use crate::extract::ApiJson;
use crate::models::{LoginRequest, LoginResponse, UserView};
use crate::state::AppState;
use axum::{extract::State, Json};
use types::errors::ErrorKind;

fn check_credentials(request: &LoginRequest) -> Result<(), AppError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("Username and password are required".into()));
    }
    Ok(())
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    check_credentials(&payload)?;

    let user = state
        .users
        .authenticate(&payload.username, &payload.password)
        .ok_or_else(|| {
            tracing::warn!(username = %payload.username, "login failed");
            AppError::Unauthorized("Invalid username or password".into())
        })?;

    let token = state.jwt.issue(&user)?;
    tracing::info!(username = %user.username, role = ?user.role, "login");

    Ok(Json(LoginResponse {
        token: Some(token),
        user: UserView::from(&user),
    }))
}

/// Self-service sign-up. Always creates a customer with a fresh id and a
/// zero TRY balance.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    check_credentials(&payload)?;

    let user = state
        .users
        .register_customer(&payload.username, &payload.password)?;

    if let Some(customer_id) = &user.customer_id {
        match state.brokerage.provision_customer(customer_id) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::warn!(customer_id = %customer_id, "customer already provisioned");
            }
            Err(e) => {
                // No TRY row means the account cannot trade; do not leave it able to log in.
                state.users.remove(&user.username);
                tracing::error!(username = %user.username, customer_id = %customer_id, error = %e, "provisioning failed, registration rolled back");
                return Err(e.into());
            }
        }
    }

    tracing::info!(username = %user.username, customer_id = ?user.customer_id, "registered customer");
    Ok(Json(LoginResponse {
        token: None,
        user: UserView::from(&user),
    }))
}
