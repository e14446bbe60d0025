//! Blockchain access.
//!
//! # Data Flow
//! ```text
//! Environment (private key, RPC URL) + ChainConfig
//!     → wallet.rs (key loading, message signing)
//!     → signer.rs (provider with wallet filler, chain verification)
//!     → contract bindings in subscriptions/ and secrets/
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from the Environment snapshot
//! - Never log private keys or sensitive data
//! - RPC reads issued by this module carry a timeout

pub mod signer;
pub mod types;
pub mod wallet;

pub use signer::{get_signer, FunctionsSigner};
pub use types::{BlockchainResult, ChainId};
pub use wallet::Wallet;
