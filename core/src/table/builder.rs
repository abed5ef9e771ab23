//! Lookup table creation
//!
//! ```text
//! slot(confirmed) ──▶ CreateLookupTable ──stale?──▶ slot(finalized) ──▶ CreateLookupTable
//!                              │                                               │
//!                              └───────────────────────┬───────────────────────┘
//!                                                      ▼
//!                                               settle delay
//!                                                      ▼
//!                         ExtendLookupTable × ceil(N / 20), each confirmed before the next
//!                                                      ▼
//!                                  settle delay, then poll until the table reads back
//! ```

use std::time::Duration;

use log::{debug, info, warn};
use solana_address_lookup_table_interface::{
    instruction::{create_lookup_table, extend_lookup_table},
    state::LOOKUP_TABLE_MAX_ADDRESSES,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    clock::Slot,
    instruction::Instruction,
    message::{AddressLookupTableAccount, Message, VersionedMessage},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::VersionedTransaction,
};
use tokio::time::sleep;

use crate::error::{Result, TableError};
use crate::ledger::{Ledger, LedgerError};

/// Addresses per ExtendLookupTable transaction. Twenty keys plus the
/// table, authority, payer and system program fit a legacy transaction with
/// room to spare.
pub const EXTEND_BATCH_SIZE: usize = 20;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Commitment for preflight and confirmation of create/extend transactions
    pub commitment: CommitmentConfig,
    /// Pause after creation and after the last extension
    pub settle_delay: Duration,
    /// Pacing between extension batches; ordering relies on confirmation, not this
    pub batch_delay: Duration,
    /// Reads of the finished table before giving up
    pub readback_attempts: u32,
    pub readback_interval: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            commitment: CommitmentConfig::confirmed(),
            settle_delay: Duration::from_millis(1000),
            batch_delay: Duration::from_millis(500),
            readback_attempts: 10,
            readback_interval: Duration::from_millis(500),
        }
    }
}

/// Split `addresses` into extension batches, preserving order
pub fn extend_batches(addresses: &[Pubkey]) -> std::slice::Chunks<'_, Pubkey> {
    addresses.chunks(EXTEND_BATCH_SIZE)
}

// ============================================================================
// Builder
// ============================================================================

/// Creates and populates lookup tables.
///
/// Not safe to run twice concurrently for the same session; go through
/// [`TableSession`](crate::TableSession) for that.
pub struct TableBuilder<'a, L: Ledger> {
    ledger: &'a L,
    config: TableConfig,
}

impl<'a, L: Ledger> TableBuilder<'a, L> {
    pub fn new(ledger: &'a L, config: TableConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Create a table holding `addresses` in the given order and return its address.
    ///
    /// A table that fails part way through extension is left on chain as is and
    /// must not be used.
    pub async fn create_table(
        &self,
        addresses: &[Pubkey],
        authority: &Keypair,
        payer: &Keypair,
    ) -> Result<Pubkey> {
        if addresses.len() > LOOKUP_TABLE_MAX_ADDRESSES {
            return Err(TableError::CapacityExceeded {
                requested: addresses.len(),
                max: LOOKUP_TABLE_MAX_ADDRESSES,
            });
        }

        let table = self.create(authority, payer)?;
        info!("Created lookup table {}", table);

        sleep(self.config.settle_delay).await;

        self.extend(&table, addresses, authority, payer).await?;

        sleep(self.config.settle_delay).await;

        let account = self.read_back(&table, addresses).await?;
        info!(
            "Lookup table {} ready with {} addresses",
            table,
            account.addresses.len()
        );

        Ok(table)
    }

    /// Send CreateLookupTable, retrying once with a finalized slot if the
    /// confirmed one expired before the transaction landed.
    fn create(&self, authority: &Keypair, payer: &Keypair) -> Result<Pubkey> {
        let slot = self
            .ledger
            .get_slot(CommitmentConfig::confirmed())
            .map_err(|e| TableError::ledger("fetch recent slot", e))?;

        match self.send_create(slot, authority, payer)? {
            Ok(table) => Ok(table),
            Err(e) if e.is_stale_slot() => {
                warn!(
                    "Slot {} expired before table creation landed, retrying with a finalized slot",
                    slot
                );

                let finalized = self
                    .ledger
                    .get_slot(CommitmentConfig::finalized())
                    .map_err(|e| TableError::ledger("fetch finalized slot", e))?;

                match self.send_create(finalized, authority, payer)? {
                    Ok(table) => Ok(table),
                    Err(e) if e.is_stale_slot() => {
                        Err(TableError::StaleReferenceToken { slot: finalized })
                    }
                    Err(e) => Err(TableError::ledger("create table (finalized slot)", e)),
                }
            }
            Err(e) => Err(TableError::ledger("create table", e)),
        }
    }

    /// Outer error: could not build the transaction. Inner error: the ledger
    /// rejected it, kept unmapped so the caller can spot a stale slot.
    fn send_create(
        &self,
        slot: Slot,
        authority: &Keypair,
        payer: &Keypair,
    ) -> Result<std::result::Result<Pubkey, LedgerError>> {
        let (ix, table) = create_lookup_table(authority.pubkey(), payer.pubkey(), slot);
        debug!("Creating lookup table {} at slot {}", table, slot);

        // Creation only needs the payer's signature
        let tx = self.sign_legacy(&[ix], payer, &[])?;

        Ok(self
            .ledger
            .send_and_confirm(&tx, self.config.commitment)
            .map(|sig| {
                debug!("CreateLookupTable confirmed: {}", sig);
                table
            }))
    }

    /// Append `addresses` batch by batch. Each batch is confirmed before the
    /// next one is built, so every extension sees the previous one's state.
    async fn extend(
        &self,
        table: &Pubkey,
        addresses: &[Pubkey],
        authority: &Keypair,
        payer: &Keypair,
    ) -> Result<()> {
        let batches: Vec<&[Pubkey]> = extend_batches(addresses).collect();
        let total = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            let ix = extend_lookup_table(
                *table,
                authority.pubkey(),
                Some(payer.pubkey()),
                batch.to_vec(),
            );
            let tx = self.sign_legacy(&[ix], payer, &[authority])?;

            let sig = self
                .ledger
                .send_and_confirm(&tx, self.config.commitment)
                .map_err(|e| {
                    TableError::ledger(
                        format!("extend batch {}/{} of {}", i + 1, total, table),
                        e,
                    )
                })?;

            debug!(
                "Extended {} with batch {}/{} ({} addresses): {}",
                table,
                i + 1,
                total,
                batch.len(),
                sig
            );

            if i + 1 < total {
                sleep(self.config.batch_delay).await;
            }
        }

        Ok(())
    }

    /// Poll until the table is visible with exactly `expected`, in order.
    async fn read_back(
        &self,
        table: &Pubkey,
        expected: &[Pubkey],
    ) -> Result<AddressLookupTableAccount> {
        let attempts = self.config.readback_attempts.max(1);
        let mut last_seen = None;

        for attempt in 1..=attempts {
            let account = self
                .ledger
                .get_lookup_table(table)
                .map_err(|e| TableError::ledger(format!("read back {}", table), e))?;

            match account {
                Some(account) if account.addresses == expected => return Ok(account),
                Some(account) => {
                    debug!(
                        "Lookup table {} shows {}/{} addresses (attempt {}/{})",
                        table,
                        account.addresses.len(),
                        expected.len(),
                        attempt,
                        attempts
                    );
                    last_seen = Some(account.addresses.len());
                }
                None => {
                    debug!(
                        "Lookup table {} not visible yet (attempt {}/{})",
                        table, attempt, attempts
                    );
                }
            }

            if attempt < attempts {
                sleep(self.config.readback_interval).await;
            }
        }

        let reason = match last_seen {
            Some(n) => format!(
                "table holds {} addresses, expected {} after {} reads",
                n,
                expected.len(),
                attempts
            ),
            None => format!("table not found after {} reads", attempts),
        };

        Err(TableError::TableCreationFailed {
            table: *table,
            reason,
        })
    }

    fn sign_legacy(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        others: &[&Keypair],
    ) -> Result<VersionedTransaction> {
        let blockhash = self
            .ledger
            .get_latest_blockhash()
            .map_err(|e| TableError::ledger("fetch blockhash", e))?;

        let message = Message::new_with_blockhash(instructions, Some(&payer.pubkey()), &blockhash);

        // The same key may play several roles; each signs once
        let mut signers: Vec<&Keypair> = vec![payer];
        for kp in others {
            if !signers.iter().any(|s| s.pubkey() == kp.pubkey()) {
                signers.push(kp);
            }
        }

        Ok(VersionedTransaction::try_new(
            VersionedMessage::Legacy(message),
            signers.as_slice(),
        )?)
    }
}
