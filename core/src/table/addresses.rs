use solana_sdk::pubkey::Pubkey;
use solana_system_interface::program as system_program;

pub const GLOBAL_CONFIG_SEED: &[u8] = b"global_config";
pub const MERKLE_TREE_SEED: &[u8] = b"merkle_tree";
pub const TREE_TOKEN_SEED: &[u8] = b"tree_token";

/// Number of entries returned by [`protocol_address_set`]
pub const PROTOCOL_ADDRESS_COUNT: usize = 8;

/// Accounts every pool transaction touches, in table order.
///
/// Only accounts that are constant for a deployment belong here. Per-transfer
/// accounts (user, recipient, nullifier and commitment PDAs) change with every
/// transaction and would just waste table slots.
pub fn protocol_address_set(
    program_id: &Pubkey,
    authority: &Pubkey,
    fee_recipient: &Pubkey,
) -> Vec<Pubkey> {
    let (global_config, _) = Pubkey::find_program_address(&[GLOBAL_CONFIG_SEED], program_id);
    let (tree_account, _) = Pubkey::find_program_address(&[MERKLE_TREE_SEED], program_id);
    let (tree_token_account, _) = Pubkey::find_program_address(&[TREE_TOKEN_SEED], program_id);

    vec![
        // program accounts
        *program_id,
        tree_account,
        tree_token_account,
        global_config,
        *authority,
        *fee_recipient,
        // native programs
        system_program::id(),
        solana_compute_budget_interface::id(),
    ]
}
