use thiserror::Error;

/// Input validation failures while building an [`ExtData`](crate::ExtData).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtDataError {
    /// An address field did not decode to exactly 32 bytes
    #[error("Invalid address in `{field}`: expected 32 bytes, got {len}")]
    InvalidAddress { field: &'static str, len: usize },

    /// An address field was not valid base58
    #[error("Invalid address in `{field}`: {reason}")]
    MalformedAddress { field: &'static str, reason: String },

    /// A numeric field does not fit its on-chain width
    #[error("Value overflow in `{field}`: {value} does not fit in {width}")]
    ValueOverflow {
        field: &'static str,
        value: String,
        width: &'static str,
    },

    /// A numeric field given as text is not an integer
    #[error("Invalid number in `{field}`: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ExtDataError>;
