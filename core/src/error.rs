use solana_sdk::{clock::Slot, message::CompileError, pubkey::Pubkey, signer::SignerError};
use thiserror::Error;

use crate::ledger::{LedgerError, LedgerErrorKind};

#[derive(Error, Debug)]
pub enum TableError {
    /// The retry with a finalized slot was rejected as stale too
    #[error("Recent slot {slot} expired before the create transaction landed")]
    StaleReferenceToken { slot: Slot },

    #[error("Lookup table {table} creation failed: {reason}")]
    TableCreationFailed { table: Pubkey, reason: String },

    #[error("Lookup table {0} not found")]
    TableNotFound(Pubkey),

    #[error("{requested} addresses exceed the lookup table capacity of {max}")]
    CapacityExceeded { requested: usize, max: usize },

    #[error("Transaction rejected during {context}: {reason}")]
    TransactionRejected { context: String, reason: String },

    #[error("Transaction not confirmed during {context}: {reason}")]
    ConfirmationTimeout { context: String, reason: String },

    #[error("Lookup table session not initialized; create the table first")]
    NotInitialized,

    #[error("Failed to compile v0 message: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to sign transaction: {0}")]
    Signing(#[from] SignerError),

    #[error("Ledger error during {context}: {source}")]
    Ledger {
        context: String,
        #[source]
        source: LedgerError,
    },
}

impl TableError {
    /// Attach the failing stage to a ledger error, promoting the kinds callers
    /// act on to their own variants.
    pub fn ledger(context: impl Into<String>, err: LedgerError) -> Self {
        let context = context.into();
        match err.kind {
            LedgerErrorKind::Rejected | LedgerErrorKind::StaleSlot => {
                TableError::TransactionRejected {
                    context,
                    reason: err.message,
                }
            }
            LedgerErrorKind::ConfirmationTimeout => TableError::ConfirmationTimeout {
                context,
                reason: err.message,
            },
            LedgerErrorKind::InvalidAccount | LedgerErrorKind::Transport => TableError::Ledger {
                context,
                source: err,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
