//! Keypair loading, funding and console output used across the harness scripts.

use anyhow::{Context, Result, bail};
use solana_client::rpc_client::RpcClient;
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey, signature::Keypair};
use std::path::Path;
use tokio::time::{Duration, sleep};

const AIRDROP_CONFIRM_ATTEMPTS: u32 = 30;
const AIRDROP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Load keypair from a Solana CLI JSON file
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;
    let bytes: Vec<u8> = serde_json::from_str(&data)
        .with_context(|| format!("Keypair file is not a JSON byte array: {}", path.display()))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| anyhow::anyhow!("Invalid keypair in {}: {}", path.display(), e))
}

pub fn sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Requests `lamports` from the faucet when the balance is below that amount
pub async fn airdrop_if_needed(
    rpc: &RpcClient,
    pubkey: &Pubkey,
    name: &str,
    lamports: u64,
) -> Result<()> {
    let balance = rpc.get_balance(pubkey)?;
    print_info(&format!("{}: {:.2} SOL", name, sol(balance)));

    if balance >= lamports {
        print_success("Sufficient balance available");
        return Ok(());
    }

    println!("💸 Requesting airdrop of {:.2} SOL...", sol(lamports));
    let sig = rpc
        .request_airdrop(pubkey, lamports)
        .context("Airdrop request failed")?;

    let mut confirmed = false;
    for attempt in 0..AIRDROP_CONFIRM_ATTEMPTS {
        sleep(AIRDROP_POLL_INTERVAL).await;
        if rpc.confirm_transaction(&sig)? {
            confirmed = true;
            break;
        }
        if attempt % 5 == 0 {
            print_waiting(&format!(
                "Waiting for confirmation... ({}/{})",
                attempt, AIRDROP_CONFIRM_ATTEMPTS
            ));
        }
    }

    if !confirmed {
        bail!("Airdrop {} not confirmed after 15 seconds", sig);
    }

    let new_balance = rpc.get_balance(pubkey)?;
    print_success(&format!(
        "Airdrop confirmed! New balance: {:.2} SOL",
        sol(new_balance)
    ));
    Ok(())
}

/// Print a section header
pub fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

pub fn print_success(msg: &str) {
    println!("✅ {}", msg);
}

pub fn print_error(msg: &str) {
    println!("❌ {}", msg);
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {}", msg);
}

pub fn print_waiting(msg: &str) {
    println!("⏳ {}", msg);
}
