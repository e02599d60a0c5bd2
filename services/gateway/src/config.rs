use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Environment variable that overrides `jwt_secret`
pub const JWT_SECRET_ENV: &str = "BROKERAGE_JWT_SECRET";

/// Secret used when neither the file nor the environment provide one
pub const DEV_JWT_SECRET: &str = "brokerage-dev-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub jwt_secret: String,
    /// Token lifetime in milliseconds
    pub jwt_expiration_ms: u64,
    /// Create the demo admin and customer accounts at startup
    pub seed_demo_data: bool,
}

impl GatewayConfig {
    pub async fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
            if !secret.is_empty() {
                self.jwt_secret = secret;
            }
        }
        self
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration_ms: 900_000,
            seed_demo_data: true,
        }
    }
}
