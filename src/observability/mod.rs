//! Observability.
//!
//! Logs go to standard error through `tracing`; standard output carries
//! command results only.

pub mod logging;

pub use logging::init;
