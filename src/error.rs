use crate::types::Value;
use thiserror::Error;

/// The error kinds surfaced by this crate. Callers are expected to match
/// on the variant: `Validation` means the supplied history is bad data,
/// `InsufficientFunds` is recoverable by retrying with a smaller amount
/// or waiting for confirmations, `SourceUnavailable` is an
/// infrastructure failure of the history indexer.
#[derive(Error, Debug)]
pub enum WalletError {
    /// A transaction record is missing a required field or carries a
    /// malformed value. Nothing is partially applied.
    #[error("invalid transaction record: {0}")]
    Validation(String),

    /// Confirmed unspent outputs cannot cover amount plus fee.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Value, available: Value },

    /// The history source failed; propagated unchanged, retry policy
    /// belongs to the collaborator.
    #[error("history source unavailable: {0}")]
    SourceUnavailable(#[source] anyhow::Error),
}

impl WalletError {
    /// The missing amount when selection failed, `None` for other kinds.
    pub fn shortfall(&self) -> Option<Value> {
        match self {
            WalletError::InsufficientFunds {
                required,
                available,
            } => Some(*required - *available),
            _ => None,
        }
    }
}
