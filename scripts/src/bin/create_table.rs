//! Create Lookup Table Script
//!
//! Builds the protocol lookup table against a live cluster and proves it works
//! by sending one compact transaction through it:
//! 1. Load config and payer, fund the payer if needed
//! 2. Derive the protocol address set
//! 3. Create and extend the lookup table
//! 4. Submit a compact transaction referencing the table
//!
//! Usage:
//!   cargo run --bin create_table
//!   cargo run --bin create_table -- --authority <KEYPAIR_PATH>
//!   cargo run --bin create_table -- --table <PUBKEY>
//!   cargo run --bin create_table -- --config <CONFIG_PATH>
//!
//! Arguments:
//!   --config <PATH>     Config file to use instead of the default search
//!   --authority <PATH>  Separate table authority keypair (default: payer)
//!   --table <PUBKEY>    Reuse a table from an earlier run instead of creating one
//!
//! Prerequisites:
//!   A local validator or Surfpool at `solana.rpc_url`

use std::path::PathBuf;
use std::str::FromStr;

use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_sdk::{pubkey::Pubkey, signature::Signer};
use solana_system_interface::instruction as system_instruction;
use veil_config::VeilConfig;
use veil_core::{
    CompactAssembler, Ledger, RpcLedger, TableBuilder, TableSession, protocol_address_set,
    table::lookup_index,
};
use veil_scripts::harness::*;

const DEMO_COMPUTE_UNITS: u32 = 200_000;
const DEMO_MICRO_LAMPORTS: u64 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    print_header("Veil Lookup Table");

    let args: Vec<String> = std::env::args().collect();
    let arg = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    let authority_path = arg("--authority").map(PathBuf::from);
    let existing_table = arg("--table")
        .map(|s| Pubkey::from_str(&s))
        .transpose()
        .map_err(|e| anyhow::anyhow!("Invalid --table pubkey: {}", e))?;

    // Load configuration
    if let Some(path) = arg("--config") {
        let config = VeilConfig::load_from(PathBuf::from(path).as_path())?;
        if VeilConfig::set_global(config).is_err() {
            anyhow::bail!("Config already initialized");
        }
    }
    let config = VeilConfig::global();
    let table_config = config.table_config()?;
    let program_id = config.program_id()?;

    let payer = load_keypair(&config.payer_keypair_path())?;
    let authority = match authority_path {
        Some(path) => load_keypair(&path)?,
        None => payer.insecure_clone(),
    };
    let fee_recipient = config.fee_recipient_or(payer.pubkey())?;

    println!("Configuration:");
    println!("  Program: {}", program_id);
    println!("  RPC URL: {}", config.solana.rpc_url);
    println!("  Payer: {}", payer.pubkey());
    println!("  Authority: {}", authority.pubkey());
    println!("  Fee recipient: {}", fee_recipient);

    let ledger = RpcLedger::new(&config.solana.rpc_url, table_config.commitment);

    // ========================================
    // Step 1: Fund Payer
    // ========================================
    print_header("Step 1: Check Balance");

    airdrop_if_needed(
        ledger.rpc(),
        &payer.pubkey(),
        "Payer",
        config.harness.airdrop_lamports,
    )
    .await?;

    // ========================================
    // Step 2: Create Lookup Table
    // ========================================
    print_header("Step 2: Create Lookup Table");

    let addresses = protocol_address_set(&program_id, &authority.pubkey(), &fee_recipient);
    print_info(&format!("{} protocol addresses", addresses.len()));

    let builder = TableBuilder::new(&ledger, table_config.clone());
    print_info(&format!(
        "Settle delay {:?}, batch delay {:?}",
        builder.config().settle_delay,
        builder.config().batch_delay
    ));
    let session = TableSession::new();
    if let Some(table) = existing_table {
        print_info(&format!("Reusing lookup table {}", table));
        session.set(table).await;
    }

    print_waiting("Creating and extending table...");
    let table = match session
        .get_or_create(&builder, &addresses, &authority, &payer)
        .await
    {
        Ok(table) => table,
        Err(e) => {
            print_error(&format!("Lookup table creation failed: {}", e));
            return Err(e.into());
        }
    };
    print_success(&format!("Lookup table ready: {}", table));

    if let Some(account) = ledger.get_lookup_table(&table)? {
        for address in &addresses {
            if let Some(index) = lookup_index(&account, address) {
                println!("  [{:>3}] {}", index, address);
            }
        }
    }

    // ========================================
    // Step 3: Compact Transaction
    // ========================================
    print_header("Step 3: Compact Transaction");

    let rent = ledger
        .rpc()
        .get_minimum_balance_for_rent_exemption(0)?;

    let instructions = vec![
        ComputeBudgetInstruction::set_compute_unit_limit(DEMO_COMPUTE_UNITS),
        ComputeBudgetInstruction::set_compute_unit_price(DEMO_MICRO_LAMPORTS),
        system_instruction::transfer(&payer.pubkey(), &fee_recipient, rent),
    ];

    let assembler = CompactAssembler::new(&ledger, table_config.commitment);
    let tx = assembler.build(&payer.pubkey(), &instructions, &session.get().await?)?;
    print_info(&format!(
        "{} account keys resolved through the table",
        tx.looked_up_keys()
    ));

    let sig = assembler.submit(tx, &[&payer])?;
    print_success(&format!("Compact transaction confirmed: {}", sig));

    print_header("Done");
    println!("Reuse this table in later runs:");
    println!("  cargo run --bin create_table -- --table {}", table);

    Ok(())
}
