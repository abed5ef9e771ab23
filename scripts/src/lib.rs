//! Shared helpers for the Veil harness binaries

pub mod harness;
