//! Command-line surface.
//!
//! # Data Flow
//! ```text
//! argv (global options stripped by clap in main.rs)
//!     → command.rs (Invocation → CommandKind → arity → typed Command)
//!     → dispatcher.rs (one handler per Command variant)
//!     → subscriptions::handlers / secrets::handlers
//! ```

pub mod command;
pub mod dispatcher;

pub use command::{validate_argument_count, Command, CommandKind, Invocation};
pub use dispatcher::{Dispatcher, GIST_LIFETIME};
