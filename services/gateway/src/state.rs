use crate::auth::JwtKeys;
use crate::config::GatewayConfig;
use crate::users::UserDirectory;
use settlement::Brokerage;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub brokerage: Brokerage,
    pub users: Arc<UserDirectory>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_brokerage(config, Brokerage::new())
    }

    pub fn with_brokerage(config: &GatewayConfig, brokerage: Brokerage) -> Self {
        Self {
            brokerage,
            users: Arc::new(UserDirectory::new()),
            jwt: Arc::new(JwtKeys::new(&config.jwt_secret, config.jwt_expiration_ms)),
        }
    }
}
