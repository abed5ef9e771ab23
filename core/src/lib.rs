//! Veil core
//!
//! Keeps shielded-pool transactions under the packet limit by moving the
//! protocol's constant accounts into an address lookup table and compiling
//! v0 messages against it.
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌──────────────────┐   ┌──────────┐
//! │ protocol      │──▶│ TableBuilder │──▶│ TableSession     │──▶│ Compact  │
//! │ address set   │   │ create+extend│   │ (single-flight)  │   │ Assembler│
//! └───────────────┘   └──────┬───────┘   └──────────────────┘   └────┬─────┘
//!                            │                                       │
//!                            ▼                                       ▼
//!                     ┌─────────────────────── Ledger ───────────────────────┐
//!                     │ slot · blockhash · send+confirm · lookup table read  │
//!                     └──────────────────────────────────────────────────────┘
//! ```

pub mod compact;
pub mod error;
pub mod ledger;
pub mod table;

pub use compact::{CompactAssembler, CompactTransaction};
pub use error::{Result, TableError};
pub use ledger::{Ledger, LedgerError, LedgerErrorKind, RpcLedger};
pub use table::addresses::protocol_address_set;
pub use table::builder::{EXTEND_BATCH_SIZE, TableBuilder, TableConfig};
pub use table::session::TableSession;
