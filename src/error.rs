//! Error taxonomy for the CLI.
//!
//! Nothing in this crate recovers from an error locally: every handler runs to
//! its first failure, which unwinds to `main`, gets logged, and ends the
//! process with status 1.

use thiserror::Error;

/// Errors surfaced to the command boundary.
#[derive(Debug, Error)]
pub enum FunctionsError {
    /// A required environment value is absent or empty.
    #[error("{variable} not provided - check your environment variables")]
    MissingConfiguration { variable: String },

    /// A configured value is present but unusable (bad key, bad URL).
    #[error("{variable} is invalid: {reason}")]
    InvalidConfiguration { variable: String, reason: String },

    /// Chain identifier not present in the network registry.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Command invoked with fewer positional parameters than it needs.
    #[error("Insufficient arguments. Minimum required is {expected}, but got {actual}")]
    InsufficientArguments { expected: usize, actual: usize },

    /// Unrecognized command name.
    #[error("Unknown command {0}")]
    UnknownCommand(String),

    /// A positional parameter could not be parsed.
    #[error("Invalid {name} '{value}': {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A secret key named on the command line has no configured value.
    #[error("The key \"{0}\" is missing from your environment variables")]
    MissingSecretValue(String),

    /// The gist outlived its deletion attempt and is still published.
    #[error("Gist {url} could not be deleted and must be removed manually: {reason}")]
    GistDeletion { url: String, reason: ExternalError },

    /// Writing command output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// Any failure reported by a delegated collaborator.
    #[error("External operation failed: {0}")]
    ExternalOperationFailure(#[from] ExternalError),
}

/// Failures reported by the chain, the DON gateways, or the gist host.
#[derive(Debug, Error)]
pub enum ExternalError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Contract call or transaction submission failed.
    #[error("Contract call {call} failed: {reason}")]
    Contract { call: &'static str, reason: String },

    /// Transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Receipt did not carry the expected event.
    #[error("Event {0} not found in transaction receipt")]
    MissingEvent(&'static str),

    /// RPC endpoint serves a different chain than the registry expects.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Signing failed.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Signer does not hold enough LINK for the requested transfer.
    #[error("Insufficient LINK balance: requested {requested} Juels, available {available} Juels")]
    InsufficientBalance { requested: String, available: String },

    /// Envelope encryption failed or the DON key is malformed.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// DON gateway rejected or failed the request.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gist host rejected or failed the request.
    #[error("Gist error: {0}")]
    Gist(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for command operations.
pub type FunctionsResult<T> = Result<T, FunctionsError>;
