//! Settlement Service
//!
//! Governs how placing, cancelling and matching an order reserves,
//! releases or transfers customer asset balances.
//!
//! # Architecture
//!
//! ```text
//!     Brokerage (service facade)
//!          │
//!    ┌─────▼──────┐   validate    ┌──────────┐
//!    │ Lifecycle  │◄──────────────│Validator │
//!    └─────┬──────┘               └──────────┘
//!          │ same transaction
//!    ┌─────▼──────┐
//!    │   Ledger   │  reserve / release / settle
//!    └─────┬──────┘
//!    ┌─────▼──────┐
//!    │   Store    │  assets + orders, undo-on-drop
//!    └────────────┘
//! ```
//!
//! The ledger never calls back into the lifecycle.

pub mod clock;
pub mod store;
pub mod ledger;
pub mod lifecycle;
pub mod validator;
pub mod service;

pub use service::Brokerage;
