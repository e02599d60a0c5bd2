//! Types library for the brokerage settlement service
//!
//! This library provides the core type definitions shared by the settlement
//! core and the HTTP gateway.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, CustomerId)
//! - `numeric`: Positive decimal newtypes (Price, Quantity)
//! - `order`: Order lifecycle types
//! - `asset`: Per-customer asset balance rows
//! - `identity`: Acting identity and role
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod order;
pub mod asset;
pub mod identity;
pub mod errors;

/// Symbol of the settlement currency (cash balance).
pub const SETTLEMENT_CURRENCY: &str = "TRY";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::asset::*;
    pub use crate::identity::*;
    pub use crate::errors::*;
    pub use crate::SETTLEMENT_CURRENCY;
}
