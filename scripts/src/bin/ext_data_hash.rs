//! ExtData Hash Script
//!
//! Prints the canonical digest of a transfer's external data, the value a
//! prover binds into its public inputs.
//!
//! Usage:
//!   cargo run --bin ext_data_hash -- '<JSON>'
//!   echo '<JSON>' | cargo run --bin ext_data_hash -- -
//!
//! Input fields:
//!   recipient, fee_recipient, mint_address   base58 addresses
//!   ext_amount, fee                          integers or decimal strings
//!   encrypted_output1, encrypted_output2     optional hex payloads
//!
//! Example:
//!   {"recipient":"11111111111111111111111111111111","ext_amount":"-500",
//!    "fee":10,"fee_recipient":"...","mint_address":"..."}

use std::io::Read;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use veil_extdata::{AmountInput, ExtData, ExtDataInput};
use veil_scripts::harness::print_error;

#[derive(Deserialize, Debug)]
struct ExtDataArgs {
    recipient: String,
    ext_amount: Value,
    #[serde(default)]
    encrypted_output1: Option<String>,
    #[serde(default)]
    encrypted_output2: Option<String>,
    fee: Value,
    fee_recipient: String,
    mint_address: String,
}

fn amount(field: &str, value: &Value) -> Result<AmountInput> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(AmountInput::from)
            .or_else(|| n.as_u64().map(AmountInput::from))
            .with_context(|| format!("{} is not an integer: {}", field, n)),
        Value::String(s) => Ok(AmountInput::from(s.as_str())),
        other => bail!("{} must be a number or string, got {}", field, other),
    }
}

fn payload(field: &str, value: Option<String>) -> Result<Option<Vec<u8>>> {
    value
        .map(|h| hex::decode(h.trim_start_matches("0x")))
        .transpose()
        .with_context(|| format!("{} is not valid hex", field))
}

fn parse(json: &str) -> Result<ExtDataInput> {
    let args: ExtDataArgs = serde_json::from_str(json).context("Failed to parse ExtData JSON")?;

    Ok(ExtDataInput {
        recipient: args.recipient.into(),
        ext_amount: amount("ext_amount", &args.ext_amount)?,
        encrypted_output1: payload("encrypted_output1", args.encrypted_output1)?,
        encrypted_output2: payload("encrypted_output2", args.encrypted_output2)?,
        fee: amount("fee", &args.fee)?,
        fee_recipient: args.fee_recipient.into(),
        mint_address: args.mint_address.into(),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(source) = std::env::args().nth(1) else {
        print_error("Usage: ext_data_hash '<JSON>' | -");
        bail!("missing ExtData argument");
    };

    let json = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        source
    };

    let input = parse(&json)?;
    let data = ExtData::try_from(&input)?;
    log::debug!("Encoded ExtData is {} bytes", data.encode().len());

    println!("{}", data.hash());
    Ok(())
}
