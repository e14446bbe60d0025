//! Lifecycle management.
//!
//! The CLI runs one command per process; the only timed step is the
//! deferred deletion of a published gist.

pub mod deferred;

pub use deferred::{Deferred, DeferredAction};
