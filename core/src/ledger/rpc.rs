use solana_address_lookup_table_interface::{program as alt_program, state::AddressLookupTable};
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    clock::Slot,
    hash::Hash,
    instruction::InstructionError,
    message::AddressLookupTableAccount,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{TransactionError, VersionedTransaction},
};

use super::{Ledger, LedgerError, LedgerErrorKind};

/// Log line the lookup table program emits when `recent_slot` has aged out
/// of the slot hashes sysvar
const STALE_SLOT_LOG: &str = "is not a recent slot";

/// Prefix of the error the RPC client raises when confirmation polling gives up
const UNCONFIRMED_PREFIX: &str = "unable to confirm transaction";

/// [`Ledger`] over a JSON-RPC node
pub struct RpcLedger {
    rpc: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(rpc_url: impl ToString, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.to_string(), commitment),
            commitment,
        }
    }

    /// Underlying client, for calls outside the table lifecycle (balances, airdrops)
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

impl Ledger for RpcLedger {
    fn get_slot(&self, commitment: CommitmentConfig) -> Result<Slot, LedgerError> {
        self.rpc.get_slot_with_commitment(commitment).map_err(classify)
    }

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.rpc
            .get_latest_blockhash_with_commitment(self.commitment)
            .map(|(hash, _last_valid_height)| hash)
            .map_err(classify)
    }

    fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };

        self.rpc
            .send_and_confirm_transaction_with_spinner_and_config(tx, commitment, config)
            .map_err(classify)
    }

    fn get_lookup_table(
        &self,
        table: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, LedgerError> {
        let account = self
            .rpc
            .get_account_with_commitment(table, self.commitment)
            .map_err(classify)?
            .value;

        let Some(account) = account else {
            return Ok(None);
        };

        if account.owner != alt_program::id() {
            return Err(LedgerError::new(
                LedgerErrorKind::InvalidAccount,
                format!("{} is owned by {}, not the lookup table program", table, account.owner),
            ));
        }

        let state = AddressLookupTable::deserialize(&account.data).map_err(|e| {
            LedgerError::new(
                LedgerErrorKind::InvalidAccount,
                format!("{} is not a lookup table: {}", table, e),
            )
        })?;

        Ok(Some(AddressLookupTableAccount {
            key: *table,
            addresses: state.addresses.to_vec(),
        }))
    }
}

/// Map an RPC client failure onto a [`LedgerErrorKind`].
///
/// This is the only place that looks at program logs or client messages.
fn classify(err: ClientError) -> LedgerError {
    let message = err.to_string();

    let kind = match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
            ..
        }) => {
            let logs = sim.logs.as_deref().unwrap_or_default();
            if is_stale_slot(sim.err.as_ref(), logs) {
                LedgerErrorKind::StaleSlot
            } else if matches!(sim.err, Some(TransactionError::BlockhashNotFound)) {
                LedgerErrorKind::ConfirmationTimeout
            } else {
                LedgerErrorKind::Rejected
            }
        }
        ClientErrorKind::RpcError(RpcError::RpcResponseError { .. }) => LedgerErrorKind::Rejected,
        ClientErrorKind::RpcError(RpcError::ForUser(msg))
            if msg.starts_with(UNCONFIRMED_PREFIX) =>
        {
            LedgerErrorKind::ConfirmationTimeout
        }
        ClientErrorKind::TransactionError(TransactionError::BlockhashNotFound) => {
            LedgerErrorKind::ConfirmationTimeout
        }
        ClientErrorKind::TransactionError(_) => LedgerErrorKind::Rejected,
        _ => LedgerErrorKind::Transport,
    };

    LedgerError { kind, message }
}

/// The program answers a stale `recent_slot` with `InvalidInstructionData`,
/// which it also uses for malformed input; the log line disambiguates.
fn is_stale_slot(err: Option<&TransactionError>, logs: &[String]) -> bool {
    matches!(
        err,
        Some(TransactionError::InstructionError(
            _,
            InstructionError::InvalidInstructionData
        ))
    ) && logs.iter().any(|line| line.contains(STALE_SLOT_LOG))
}
