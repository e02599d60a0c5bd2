use crate::error::AppError;
use crate::state::AppState;
use crate::users::User;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use types::identity::{Identity, Role};
use types::ids::CustomerId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub iat: i64,
    pub exp: i64,
}

/// HS512 signing and verification keys derived from one shared secret
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime_ms: u64) -> Self {
        let lifetime = i64::try_from(lifetime_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS512),
            lifetime,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("token expiry out of range")))?;
        let claims = Claims {
            sub: user.username.clone(),
            role: user.role,
            customer_id: user.customer_id.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| AppError::InternalError(e.into()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Caller identity resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub identity: Identity,
}

impl AuthenticatedUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.identity.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator role required".into()))
        }
    }

    /// Customers may only act on their own account.
    pub fn require_access_to(&self, customer_id: &CustomerId) -> Result<(), AppError> {
        if self.identity.can_act_for(customer_id) {
            Ok(())
        } else {
            tracing::warn!(user = %self.username, customer_id = %customer_id, "cross-account access denied");
            Err(AppError::Forbidden(format!(
                "Access denied: cannot act for customer {}",
                customer_id
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication credentials".into()))?;
        let header = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid header string".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".into()))?;

        let claims = state.jwt.verify(token)?;

        // A customer token without its account is unusable.
        if claims.role == Role::Customer && claims.customer_id.is_none() {
            return Err(AppError::Unauthorized("Token carries no customer id".into()));
        }

        Ok(AuthenticatedUser {
            username: claims.sub,
            identity: Identity {
                role: claims.role,
                customer_id: claims.customer_id,
            },
        })
    }
}
