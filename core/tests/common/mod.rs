#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use solana_address_lookup_table_interface::program as alt_program;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    clock::Slot,
    hash::Hash,
    message::AddressLookupTableAccount,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use veil_core::{Ledger, LedgerError, LedgerErrorKind};

// Bincode enum tags of the lookup table program's instructions
const CREATE_TAG: u32 = 0;
const EXTEND_TAG: u32 = 2;

pub const CONFIRMED_SLOT: Slot = 1_000;
pub const FINALIZED_SLOT: Slot = 968;

#[derive(Default)]
pub struct MockState {
    pub slot_requests: Vec<CommitmentConfig>,
    /// recent_slot of every CreateLookupTable received
    pub create_attempts: Vec<Slot>,
    /// addresses of every ExtendLookupTable applied, in arrival order
    pub extend_batches: Vec<Vec<Pubkey>>,
    /// signature count of every transaction received
    pub signer_counts: Vec<usize>,
    pub sent: Vec<VersionedTransaction>,
    pub tables: HashMap<Pubkey, Vec<Pubkey>>,
    pub table_reads: usize,

    // failure injection
    /// next N creates are rejected as stale
    pub stale_creates: usize,
    pub create_error: Option<LedgerErrorKind>,
    /// (0-based batch index, kind)
    pub extend_error: Option<(usize, LedgerErrorKind)>,
    /// next N reads report the table missing
    pub hidden_reads: usize,
    /// every read drops this many trailing entries
    pub truncate_reads: Option<usize>,
    /// every read returns the entries in reverse order
    pub reverse_reads: bool,
    /// accounts that exist but are not lookup tables
    pub foreign_accounts: Vec<Pubkey>,
    pub other_error: Option<LedgerErrorKind>,
}

/// In-memory ledger that executes lookup table instructions
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn insert_table(&self, key: Pubkey, addresses: Vec<Pubkey>) {
        self.state().tables.insert(key, addresses);
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(data[at..at + 4].try_into().unwrap())
}

fn read_u64(data: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(data[at..at + 8].try_into().unwrap())
}

fn rejected(kind: LedgerErrorKind, what: &str) -> LedgerError {
    LedgerError::new(kind, format!("mock {} failure", what))
}

impl Ledger for MockLedger {
    fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, LedgerError> {
        let mut state = self.state();
        state.slot_requests.push(commitment);
        if commitment == CommitmentConfig::finalized() {
            Ok(FINALIZED_SLOT)
        } else {
            Ok(CONFIRMED_SLOT)
        }
    }

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(Hash::new_unique())
    }

    fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        _commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError> {
        let mut state = self.state();
        state.sent.push(tx.clone());

        let required = tx.message.header().num_required_signatures as usize;
        assert_eq!(tx.signatures.len(), required, "transaction not fully signed");
        state.signer_counts.push(required);

        let keys = tx.message.static_account_keys();

        for ix in tx.message.instructions() {
            let program = ix.program_id(keys);

            if *program != alt_program::id() {
                if let Some(kind) = state.other_error.take() {
                    return Err(rejected(kind, "transaction"));
                }
                continue;
            }

            let table = keys[ix.accounts[0] as usize];

            match read_u32(&ix.data, 0) {
                CREATE_TAG => {
                    state.create_attempts.push(read_u64(&ix.data, 4));

                    if state.stale_creates > 0 {
                        state.stale_creates -= 1;
                        return Err(rejected(LedgerErrorKind::StaleSlot, "create"));
                    }
                    if let Some(kind) = state.create_error.take() {
                        return Err(rejected(kind, "create"));
                    }

                    state.tables.insert(table, Vec::new());
                }
                EXTEND_TAG => {
                    let batch = state.extend_batches.len();
                    if let Some((at, kind)) = state.extend_error {
                        if at == batch {
                            return Err(rejected(kind, "extend"));
                        }
                    }

                    let count = read_u64(&ix.data, 4) as usize;
                    let addresses: Vec<Pubkey> = ix.data[12..]
                        .chunks(32)
                        .map(|c| Pubkey::new_from_array(c.try_into().unwrap()))
                        .collect();
                    assert_eq!(addresses.len(), count);

                    let Some(entries) = state.tables.get_mut(&table) else {
                        return Err(rejected(LedgerErrorKind::Rejected, "extend of missing table"));
                    };
                    entries.extend_from_slice(&addresses);
                    state.extend_batches.push(addresses);
                }
                tag => panic!("unexpected lookup table instruction {}", tag),
            }
        }

        Ok(tx.signatures[0])
    }

    fn get_lookup_table(
        &self,
        table: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, LedgerError> {
        let mut state = self.state();
        state.table_reads += 1;

        if state.hidden_reads > 0 {
            state.hidden_reads -= 1;
            return Ok(None);
        }

        if state.foreign_accounts.contains(table) {
            return Err(LedgerError::new(
                LedgerErrorKind::InvalidAccount,
                format!("{} is not a lookup table", table),
            ));
        }

        let Some(mut addresses) = state.tables.get(table).cloned() else {
            return Ok(None);
        };
        if let Some(n) = state.truncate_reads {
            addresses.truncate(addresses.len().saturating_sub(n));
        }
        if state.reverse_reads {
            addresses.reverse();
        }

        Ok(Some(AddressLookupTableAccount {
            key: *table,
            addresses,
        }))
    }
}

pub fn unique_addresses(n: usize) -> Vec<Pubkey> {
    (0..n).map(|_| Pubkey::new_unique()).collect()
}
