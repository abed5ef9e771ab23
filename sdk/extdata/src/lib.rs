//! External data binding for shielded transfers.
//!
//! The external data of a transfer (recipient, public amount, encrypted
//! outputs, fee, fee recipient, mint) travels outside the proof. The proof
//! commits to its hash instead, so the on-chain program re-derives the hash
//! from the instruction arguments and compares.
//!
//! ```text
//! ExtDataInput ──normalize──▶ ExtData ──encode──▶ bytes ──SHA-256──▶ ExtDataHash
//! ```

pub mod error;
pub mod input;
pub mod types;

pub use error::{ExtDataError, Result};
pub use input::{AddressInput, AmountInput, ExtDataInput};
pub use types::{ExtData, ExtDataHash, hash_ext_data};
