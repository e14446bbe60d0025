//! Off-chain secrets: encryption, DON-hosted upload, gist publishing.
//!
//! # Data Flow
//! ```text
//! Command::{Encrypt, EncryptUpload, EncryptGist, EncryptUrls}
//!     → bundle.rs (named keys resolved from the Environment, fail-fast)
//!     → manager.rs (sign, seal to the DON key via cipher.rs)
//!     → gateway.rs (signed secrets_set to the DON gateways)
//!       or gist.rs (publish, then deferred deletion)
//! ```
//!
//! Secret values never reach the logs; only key names and counts do.

pub mod bundle;
pub mod cipher;
pub mod gateway;
pub mod gist;
pub mod handlers;
pub mod manager;
pub mod types;

pub use bundle::{build_secrets_object, parse_keys, SecretsBundle};
pub use gist::{GistClient, GithubGistClient};
pub use handlers::GistOutcome;
pub use manager::{DonSecretsManager, SecretsManager};
pub use types::{EncryptedSecrets, UploadReport, UploadRequest};
