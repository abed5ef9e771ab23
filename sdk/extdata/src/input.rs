//! Loosely typed external data as it arrives from callers.
//!
//! Addresses may come as raw bytes or base58 text and amounts as integers or
//! decimal strings. Everything is checked once, in [`ExtDataInput::normalize`].

use crate::error::{ExtDataError, Result};
use crate::types::{ExtData, ExtDataHash};

/// An account address before normalization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressInput {
    Bytes(Vec<u8>),
    Base58(String),
}

impl AddressInput {
    pub fn to_bytes(&self, field: &'static str) -> Result<[u8; 32]> {
        let raw = match self {
            AddressInput::Bytes(b) => b.clone(),
            AddressInput::Base58(s) => bs58::decode(s).into_vec().map_err(|e| {
                ExtDataError::MalformedAddress {
                    field,
                    reason: e.to_string(),
                }
            })?,
        };

        let len = raw.len();
        raw.try_into()
            .map_err(|_| ExtDataError::InvalidAddress { field, len })
    }
}

impl From<[u8; 32]> for AddressInput {
    fn from(b: [u8; 32]) -> Self {
        AddressInput::Bytes(b.to_vec())
    }
}

impl From<&[u8]> for AddressInput {
    fn from(b: &[u8]) -> Self {
        AddressInput::Bytes(b.to_vec())
    }
}

impl From<&str> for AddressInput {
    fn from(s: &str) -> Self {
        AddressInput::Base58(s.to_string())
    }
}

impl From<String> for AddressInput {
    fn from(s: String) -> Self {
        AddressInput::Base58(s)
    }
}

/// An amount before it is narrowed to its on-chain width
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AmountInput {
    Int(i128),
    Decimal(String),
}

impl AmountInput {
    fn to_i128(&self, field: &'static str) -> Result<i128> {
        match self {
            AmountInput::Int(v) => Ok(*v),
            AmountInput::Decimal(s) => {
                let trimmed = s.trim();
                trimmed.parse::<i128>().map_err(|e| {
                    // Digits that overflow even i128 are still an overflow, not garbage
                    if matches!(
                        e.kind(),
                        std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow
                    ) {
                        ExtDataError::ValueOverflow {
                            field,
                            value: trimmed.to_string(),
                            width: "i128",
                        }
                    } else {
                        ExtDataError::InvalidNumber {
                            field,
                            value: s.clone(),
                        }
                    }
                })
            }
        }
    }

    pub fn to_i64(&self, field: &'static str) -> Result<i64> {
        let v = self.to_i128(field)?;
        i64::try_from(v).map_err(|_| ExtDataError::ValueOverflow {
            field,
            value: v.to_string(),
            width: "i64",
        })
    }

    pub fn to_u64(&self, field: &'static str) -> Result<u64> {
        let v = self.to_i128(field)?;
        u64::try_from(v).map_err(|_| ExtDataError::ValueOverflow {
            field,
            value: v.to_string(),
            width: "u64",
        })
    }
}

macro_rules! amount_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for AmountInput {
            fn from(v: $t) -> Self {
                AmountInput::Int(v as i128)
            }
        })*
    };
}

amount_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, i128);

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        AmountInput::Decimal(s.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(s: String) -> Self {
        AmountInput::Decimal(s)
    }
}

/// External data as supplied by a caller.
///
/// Missing encrypted outputs encode as zero-length payloads, so `None` and
/// `Some(vec![])` hash identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtDataInput {
    pub recipient: AddressInput,
    pub ext_amount: AmountInput,
    pub encrypted_output1: Option<Vec<u8>>,
    pub encrypted_output2: Option<Vec<u8>>,
    pub fee: AmountInput,
    pub fee_recipient: AddressInput,
    pub mint_address: AddressInput,
}

impl ExtDataInput {
    pub fn normalize(&self) -> Result<ExtData> {
        Ok(ExtData {
            recipient: self.recipient.to_bytes("recipient")?,
            ext_amount: self.ext_amount.to_i64("ext_amount")?,
            encrypted_output1: payload(&self.encrypted_output1, "encrypted_output1")?,
            encrypted_output2: payload(&self.encrypted_output2, "encrypted_output2")?,
            fee: self.fee.to_u64("fee")?,
            fee_recipient: self.fee_recipient.to_bytes("fee_recipient")?,
            mint_address: self.mint_address.to_bytes("mint_address")?,
        })
    }

    /// Normalize, then hash
    pub fn hash(&self) -> Result<ExtDataHash> {
        Ok(self.normalize()?.hash())
    }
}

impl TryFrom<&ExtDataInput> for ExtData {
    type Error = ExtDataError;

    fn try_from(input: &ExtDataInput) -> Result<Self> {
        input.normalize()
    }
}

fn payload(bytes: &Option<Vec<u8>>, field: &'static str) -> Result<Vec<u8>> {
    let bytes = bytes.clone().unwrap_or_default();
    if u32::try_from(bytes.len()).is_err() {
        return Err(ExtDataError::ValueOverflow {
            field,
            value: bytes.len().to_string(),
            width: "u32 length prefix",
        });
    }
    Ok(bytes)
}
