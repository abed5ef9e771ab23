//! Address lookup table lifecycle: derive the constant account set, create and
//! extend the table, and hold on to it for the rest of the session.

pub mod addresses;
pub mod builder;
pub mod session;

use solana_sdk::{message::AddressLookupTableAccount, pubkey::Pubkey};

/// Positional index of `address` inside the table, as v0 messages encode it
pub fn lookup_index(table: &AddressLookupTableAccount, address: &Pubkey) -> Option<u8> {
    table
        .addresses
        .iter()
        .position(|a| a == address)
        .and_then(|i| u8::try_from(i).ok())
}
