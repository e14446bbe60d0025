//! Subscription management.
//!
//! # Data Flow
//! ```text
//! Command::{Read, Create, Cancel, Fund, AddConsumer, RemoveConsumer}
//!     → handlers.rs (one handler per command)
//!     → Toolkit::subscription_manager (fresh manager per call)
//!     → manager.rs (router / LINK contract calls)
//!     → SubscriptionInfo printed to the command output
//! ```
//!
//! Subscription state lives on-chain only; nothing here caches it.

pub mod contracts;
pub mod handlers;
pub mod manager;
pub mod types;

pub use manager::{RouterSubscriptionManager, SubscriptionManager};
pub use types::SubscriptionInfo;
