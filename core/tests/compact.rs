mod common;

use common::{MockLedger, unique_addresses};
use solana_commitment_config::CommitmentConfig;
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    message::{AddressLookupTableAccount, VersionedMessage},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};
use veil_core::{CompactAssembler, LedgerErrorKind, TableError, table::lookup_index};

fn assembler(ledger: &MockLedger) -> CompactAssembler<'_, MockLedger> {
    CompactAssembler::new(ledger, CommitmentConfig::confirmed())
}

/// Instruction for `program` touching `readonly` and `writable` plus the payer as signer
fn pool_instruction(
    program: Pubkey,
    payer: &Pubkey,
    readonly: &[Pubkey],
    writable: &[Pubkey],
) -> Instruction {
    let mut accounts = vec![AccountMeta::new(*payer, true)];
    accounts.extend(readonly.iter().map(|k| AccountMeta::new_readonly(*k, false)));
    accounts.extend(writable.iter().map(|k| AccountMeta::new(*k, false)));
    Instruction {
        program_id: program,
        accounts,
        data: vec![1, 2, 3],
    }
}

#[test]
fn unknown_table_is_not_found() {
    let ledger = MockLedger::new();
    let payer = Keypair::new();
    let missing = Pubkey::new_unique();

    let err = assembler(&ledger)
        .build(&payer.pubkey(), &[], &missing)
        .unwrap_err();

    assert!(matches!(err, TableError::TableNotFound(t) if t == missing));
}

#[test]
fn non_table_account_is_invalid() {
    let ledger = MockLedger::new();
    let payer = Keypair::new();
    let wallet = Pubkey::new_unique();
    ledger.state().foreign_accounts.push(wallet);

    let err = assembler(&ledger)
        .build(&payer.pubkey(), &[], &wallet)
        .unwrap_err();

    match err {
        TableError::Ledger { source, .. } => {
            assert_eq!(source.kind, LedgerErrorKind::InvalidAccount)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn table_accounts_become_indexes() {
    let ledger = MockLedger::new();
    let payer = Keypair::new();
    let program = Pubkey::new_unique();
    let table_key = Pubkey::new_unique();
    let entries = unique_addresses(6);
    ledger.insert_table(table_key, entries.clone());

    let outside = Pubkey::new_unique();
    let ix = pool_instruction(
        program,
        &payer.pubkey(),
        &[entries[1], entries[4]],
        &[entries[2], outside],
    );

    let tx = assembler(&ledger)
        .build(&payer.pubkey(), &[ix], &table_key)
        .unwrap();

    assert_eq!(tx.table(), &table_key);

    let VersionedMessage::V0(message) = tx.message() else {
        panic!("expected a v0 message");
    };

    assert_eq!(message.address_table_lookups.len(), 1);
    let lookup = &message.address_table_lookups[0];
    assert_eq!(lookup.account_key, table_key);
    assert_eq!(lookup.writable_indexes, vec![2]);

    let mut readonly = lookup.readonly_indexes.clone();
    readonly.sort();
    assert_eq!(readonly, vec![1, 4]);
    assert_eq!(tx.looked_up_keys(), 3);

    // table entries never appear in full; the rest stay static
    for key in [entries[1], entries[2], entries[4]] {
        assert!(!message.account_keys.contains(&key));
    }
    assert!(message.account_keys.contains(&payer.pubkey()));
    assert!(message.account_keys.contains(&program));
    assert!(message.account_keys.contains(&outside));
}

#[test]
fn invoked_program_stays_static_even_if_in_table() {
    let ledger = MockLedger::new();
    let payer = Keypair::new();
    let table_key = Pubkey::new_unique();
    let budget_program = solana_compute_budget_interface::id();
    ledger.insert_table(table_key, vec![budget_program]);

    let ix = ComputeBudgetInstruction::set_compute_unit_limit(400_000);
    let tx = assembler(&ledger)
        .build(&payer.pubkey(), &[ix], &table_key)
        .unwrap();

    assert_eq!(tx.looked_up_keys(), 0);
    assert!(tx.message().static_account_keys().contains(&budget_program));
}

#[test]
fn submit_signs_and_confirms() {
    let ledger = MockLedger::new();
    let payer = Keypair::new();
    let table_key = Pubkey::new_unique();
    let entries = unique_addresses(4);
    ledger.insert_table(table_key, entries.clone());

    let ix = pool_instruction(Pubkey::new_unique(), &payer.pubkey(), &entries, &[]);
    let assembler = assembler(&ledger);
    let tx = assembler.build(&payer.pubkey(), &[ix], &table_key).unwrap();

    let sig = assembler.submit(tx, &[&payer]).unwrap();

    let state = ledger.state();
    assert_eq!(state.sent.len(), 1);
    assert_eq!(state.sent[0].signatures[0], sig);

    let account = AddressLookupTableAccount {
        key: table_key,
        addresses: entries.clone(),
    };
    assert_eq!(lookup_index(&account, &entries[3]), Some(3));
}

#[test]
fn missing_signer_is_reported() {
    let ledger = MockLedger::new();
    let payer = Keypair::new();
    let stranger = Keypair::new();
    let table_key = Pubkey::new_unique();
    ledger.insert_table(table_key, unique_addresses(2));

    let tx = assembler(&ledger)
        .build(&payer.pubkey(), &[], &table_key)
        .unwrap();

    let err = assembler(&ledger).submit(tx, &[&stranger]).unwrap_err();
    assert!(matches!(err, TableError::Signing(_)));
    assert!(ledger.state().sent.is_empty());
}

#[test]
fn rejection_is_not_resubmitted() {
    let ledger = MockLedger::new();
    ledger.state().other_error = Some(LedgerErrorKind::Rejected);
    let payer = Keypair::new();
    let table_key = Pubkey::new_unique();
    let entries = unique_addresses(2);
    ledger.insert_table(table_key, entries.clone());

    let ix = pool_instruction(Pubkey::new_unique(), &payer.pubkey(), &entries, &[]);
    let assembler = assembler(&ledger);
    let tx = assembler.build(&payer.pubkey(), &[ix], &table_key).unwrap();

    let err = assembler.submit(tx, &[&payer]).unwrap_err();

    match err {
        TableError::TransactionRejected { context, .. } => {
            assert!(context.starts_with("submit compact transaction"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(ledger.state().sent.len(), 1);
}

#[test]
fn unconfirmed_submission_times_out() {
    let ledger = MockLedger::new();
    ledger.state().other_error = Some(LedgerErrorKind::ConfirmationTimeout);
    let payer = Keypair::new();
    let table_key = Pubkey::new_unique();
    let entries = unique_addresses(2);
    ledger.insert_table(table_key, entries.clone());

    let ix = pool_instruction(Pubkey::new_unique(), &payer.pubkey(), &entries, &[]);
    let assembler = assembler(&ledger);
    let tx = assembler.build(&payer.pubkey(), &[ix], &table_key).unwrap();

    assert!(matches!(
        assembler.submit(tx, &[&payer]),
        Err(TableError::ConfirmationTimeout { .. })
    ));
}
