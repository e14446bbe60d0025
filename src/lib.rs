//! Chainlink Functions command-line toolkit.
//!
//! Manages Functions subscriptions on the router contract and prepares
//! encrypted secrets for the DON (inline, gateway-hosted, or gist-hosted).

// Command surface
pub mod cli;

// Domain
pub mod secrets;
pub mod subscriptions;
pub mod toolkit;

// Infrastructure
pub mod blockchain;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use cli::{Command, Dispatcher, Invocation};
pub use config::{Chain, Environment};
pub use error::{ExternalError, FunctionsError, FunctionsResult};
pub use toolkit::{LiveToolkit, Toolkit};
