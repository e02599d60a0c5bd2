//! HTTP gateway for the brokerage settlement service
//!
//! JWT-authenticated JSON API over `settlement::Brokerage`. The gateway
//! owns identity and authorization; the settlement core trusts the
//! customer ids it is handed.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod router;
pub mod seed;
pub mod state;
pub mod users;

pub use router::create_router;
pub use state::AppState;
