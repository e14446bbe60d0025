//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional) + process environment
//!     → env.rs (Environment snapshot, built once in main)
//!     → passed by reference to the signer factory and the handlers
//!
//! chain identifier (command line)
//!     → network.rs (static registry)
//!     → &'static ChainConfig
//! ```
//!
//! # Design Decisions
//! - Nothing reads `std::env` after start-up; the snapshot is the only source
//! - The registry is compiled in; an unknown chain is fatal, never retried

pub mod env;
pub mod network;

pub use env::Environment;
pub use network::{Chain, ChainConfig};
