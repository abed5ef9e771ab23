//! Compact (v0) transactions
//!
//! Account keys found in the lookup table are encoded as one-byte indexes
//! instead of 32-byte keys. Signers and invoked program ids always stay in the
//! static key list; that is a rule of the v0 format, not of this module.

use log::{debug, info};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    instruction::Instruction,
    message::{VersionedMessage, v0},
    pubkey::Pubkey,
    signature::Signature,
    signer::signers::Signers,
    transaction::VersionedTransaction,
};

use crate::error::{Result, TableError};
use crate::ledger::Ledger;

/// An unsigned v0 message compiled against one lookup table
#[derive(Debug, Clone)]
pub struct CompactTransaction {
    message: VersionedMessage,
    table: Pubkey,
}

impl CompactTransaction {
    pub fn message(&self) -> &VersionedMessage {
        &self.message
    }

    /// Lookup table the message was compiled against
    pub fn table(&self) -> &Pubkey {
        &self.table
    }

    /// Number of account keys resolved through the table
    pub fn looked_up_keys(&self) -> usize {
        self.message
            .address_table_lookups()
            .map(|lookups| {
                lookups
                    .iter()
                    .map(|l| l.writable_indexes.len() + l.readonly_indexes.len())
                    .sum()
            })
            .unwrap_or(0)
    }
}

/// Builds and submits compact transactions
pub struct CompactAssembler<'a, L: Ledger> {
    ledger: &'a L,
    commitment: CommitmentConfig,
}

impl<'a, L: Ledger> CompactAssembler<'a, L> {
    pub fn new(ledger: &'a L, commitment: CommitmentConfig) -> Self {
        Self { ledger, commitment }
    }

    /// Compile `instructions` into a v0 message that references `table`.
    ///
    /// A missing account is [`TableError::TableNotFound`]. An account that
    /// exists but is not a lookup table surfaces as [`TableError::Ledger`]
    /// with [`LedgerErrorKind::InvalidAccount`](crate::LedgerErrorKind).
    pub fn build(
        &self,
        payer: &Pubkey,
        instructions: &[Instruction],
        table: &Pubkey,
    ) -> Result<CompactTransaction> {
        let account = self
            .ledger
            .get_lookup_table(table)
            .map_err(|e| TableError::ledger(format!("fetch lookup table {}", table), e))?
            .ok_or(TableError::TableNotFound(*table))?;

        let blockhash = self
            .ledger
            .get_latest_blockhash()
            .map_err(|e| TableError::ledger("fetch blockhash", e))?;

        let message = v0::Message::try_compile(payer, instructions, &[account], blockhash)?;

        let tx = CompactTransaction {
            message: VersionedMessage::V0(message),
            table: *table,
        };

        debug!(
            "Compiled {} instructions against {} ({} keys via table)",
            instructions.len(),
            table,
            tx.looked_up_keys()
        );

        Ok(tx)
    }

    /// Sign and send `tx`, blocking until it is confirmed.
    ///
    /// Never resubmits: a rejected transfer may carry a commitment or
    /// external-data hash that has to change before a retry is safe.
    pub fn submit<T: Signers + ?Sized>(
        &self,
        tx: CompactTransaction,
        signers: &T,
    ) -> Result<Signature> {
        let table = tx.table;
        let signed = VersionedTransaction::try_new(tx.message, signers)?;

        let sig = self
            .ledger
            .send_and_confirm(&signed, self.commitment)
            .map_err(|e| {
                TableError::ledger(format!("submit compact transaction (table {})", table), e)
            })?;

        info!("Compact transaction confirmed: {}", sig);
        Ok(sig)
    }
}
