//! Ledger access used by the table lifecycle.
//!
//! Everything the builder and assembler need from the chain goes through
//! [`Ledger`]. Failures arrive already classified so callers branch on
//! [`LedgerErrorKind`], never on message text.

mod rpc;

pub use rpc::RpcLedger;

use std::fmt;

use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    clock::Slot, hash::Hash, message::AddressLookupTableAccount, pubkey::Pubkey,
    signature::Signature, transaction::VersionedTransaction,
};
use thiserror::Error;

/// Why a ledger call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorKind {
    /// The create-table slot is no longer in the slot hashes sysvar
    StaleSlot,
    /// Preflight or execution rejected the transaction
    Rejected,
    /// The transaction was sent but never reached the requested commitment
    ConfirmationTimeout,
    /// The account exists but is not a lookup table
    InvalidAccount,
    /// RPC transport or decoding failure
    Transport,
}

impl fmt::Display for LedgerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LedgerErrorKind::StaleSlot => "stale slot",
            LedgerErrorKind::Rejected => "rejected",
            LedgerErrorKind::ConfirmationTimeout => "confirmation timeout",
            LedgerErrorKind::InvalidAccount => "invalid account",
            LedgerErrorKind::Transport => "transport",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct LedgerError {
    pub kind: LedgerErrorKind,
    pub message: String,
}

impl LedgerError {
    pub fn new(kind: LedgerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_stale_slot(&self) -> bool {
        self.kind == LedgerErrorKind::StaleSlot
    }
}

/// Blocking request/response view of the chain.
pub trait Ledger {
    /// Current slot as seen at `commitment`
    fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, LedgerError>;

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Send with preflight enabled at `commitment` and block until the
    /// transaction is confirmed at that same level.
    fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError>;

    /// `Ok(None)` when no account exists at `table`
    fn get_lookup_table(
        &self,
        table: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, LedgerError> {
        (**self).get_slot(commitment)
    }

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        (**self).get_latest_blockhash()
    }

    fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError> {
        (**self).send_and_confirm(tx, commitment)
    }

    fn get_lookup_table(
        &self,
        table: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, LedgerError> {
        (**self).get_lookup_table(table)
    }
}
