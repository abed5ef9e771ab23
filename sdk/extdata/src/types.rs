use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Normalized external data, laid out exactly as the program deserializes it.
///
/// Build one from an [`ExtDataInput`](crate::ExtDataInput) when the fields come
/// from loosely typed sources; the constructor here trusts its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtData {
    pub recipient: [u8; 32],
    pub ext_amount: i64,
    pub encrypted_output1: Vec<u8>,
    pub encrypted_output2: Vec<u8>,
    pub fee: u64,
    pub fee_recipient: [u8; 32],
    pub mint_address: [u8; 32],
}

impl ExtData {
    /// Size of the encoding when both encrypted outputs are empty
    pub const FIXED_LEN: usize = 32 + 8 + 4 + 4 + 8 + 32 + 32;

    /// Canonical byte layout.
    ///
    /// ```text
    /// recipient          [u8; 32]
    /// ext_amount         i64 LE
    /// encrypted_output1  u32 LE length || bytes
    /// encrypted_output2  u32 LE length || bytes
    /// fee                u64 LE
    /// fee_recipient      [u8; 32]
    /// mint_address       [u8; 32]
    /// ```
    ///
    /// Same bytes as the Borsh encoding of the program's struct; no tag or padding.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(
            Self::FIXED_LEN + self.encrypted_output1.len() + self.encrypted_output2.len(),
        );

        data.extend_from_slice(&self.recipient);
        data.extend_from_slice(&self.ext_amount.to_le_bytes());
        put_bytes(&mut data, &self.encrypted_output1);
        put_bytes(&mut data, &self.encrypted_output2);
        data.extend_from_slice(&self.fee.to_le_bytes());
        data.extend_from_slice(&self.fee_recipient);
        data.extend_from_slice(&self.mint_address);

        data
    }

    pub fn hash(&self) -> ExtDataHash {
        hash_ext_data(self)
    }
}

// Payload lengths are checked against u32::MAX when normalizing input.
fn put_bytes(data: &mut Vec<u8>, bytes: &[u8]) {
    data.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    data.extend_from_slice(bytes);
}

/// SHA-256 of the canonical encoding
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtDataHash(pub [u8; 32]);

impl ExtDataHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for ExtDataHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<ExtDataHash> for [u8; 32] {
    fn from(h: ExtDataHash) -> Self {
        h.0
    }
}

impl fmt::Display for ExtDataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ExtDataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtDataHash({})", self.to_hex())
    }
}

pub fn hash_ext_data(ext: &ExtData) -> ExtDataHash {
    let mut hasher = Sha256::new();
    hasher.update(ext.encode());
    ExtDataHash(hasher.finalize().into())
}
