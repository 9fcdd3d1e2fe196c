//! Bank loading error types.
//!
//! Defined in `analogy-core` so every loader reports the same taxonomy and
//! front ends can show a load failure inline without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the item bank.
#[derive(Debug, Error)]
pub enum BankError {
    /// The bank file could not be read.
    #[error("failed to read bank file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server answered with a non-success status.
    #[error("failed to load json: {status} ({url})")]
    Http { url: String, status: u16 },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The document is not valid bank JSON.
    #[error("failed to parse bank: {0}")]
    Parse(String),
}

impl BankError {
    /// Returns `true` for failures a reload might fix.
    ///
    /// Loaders never retry on their own; the CLI adds a retry hint.
    pub fn is_transient(&self) -> bool {
        match self {
            BankError::Network(_) | BankError::Timeout(_) => true,
            BankError::Http { status, .. } => *status >= 500,
            BankError::Io { .. } | BankError::Parse(_) => false,
        }
    }
}
