use log::{debug, info};
use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use tokio::sync::Mutex;

use crate::error::{Result, TableError};
use crate::ledger::Ledger;
use crate::table::builder::TableBuilder;

/// The lookup table shared by every transaction of a test session.
///
/// Creating a table costs several confirmed transactions, so the first caller
/// builds it and everyone after reuses the handle. The lock is held for the
/// whole creation: concurrent callers wait and then see the finished table
/// instead of racing to create their own.
#[derive(Debug, Default)]
pub struct TableSession {
    table: Mutex<Option<Pubkey>>,
}

impl TableSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session table, or [`TableError::NotInitialized`] before creation
    pub async fn get(&self) -> Result<Pubkey> {
        self.table.lock().await.ok_or(TableError::NotInitialized)
    }

    /// Replace the cached handle, e.g. with a table created in an earlier run
    pub async fn set(&self, table: Pubkey) {
        *self.table.lock().await = Some(table);
    }

    pub async fn clear(&self) {
        if let Some(table) = self.table.lock().await.take() {
            info!("Cleared session lookup table {}", table);
        }
    }

    /// Return the session table, creating it from `addresses` on first use.
    ///
    /// A failed creation leaves the session empty, so the next call starts over
    /// with a fresh table.
    pub async fn get_or_create<L: Ledger>(
        &self,
        builder: &TableBuilder<'_, L>,
        addresses: &[Pubkey],
        authority: &Keypair,
        payer: &Keypair,
    ) -> Result<Pubkey> {
        let mut slot = self.table.lock().await;

        if let Some(table) = *slot {
            debug!("Reusing session lookup table {}", table);
            return Ok(table);
        }

        let table = builder.create_table(addresses, authority, payer).await?;
        *slot = Some(table);

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_session_not_initialized() {
        let session = TableSession::new();
        assert!(matches!(session.get().await, Err(TableError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_set_get_clear() {
        let session = TableSession::new();
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();

        session.set(first).await;
        assert_eq!(session.get().await.unwrap(), first);

        // last writer wins
        session.set(second).await;
        assert_eq!(session.get().await.unwrap(), second);

        session.clear().await;
        assert!(matches!(session.get().await, Err(TableError::NotInitialized)));
    }
}
