use crate::domain::{Account, Error, Transfer};

/// Everything a ledger persists between runs.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    /// In arrival order.
    pub transfers: Vec<Transfer>,
}

/// Load/save boundary for ledger state. Called once at startup and once at
/// normal exit.
pub trait LedgerStore {
    /// A store with nothing saved yet yields an empty snapshot, not an error.
    async fn load(&self) -> Result<Snapshot, Error>;

    /// Replaces whatever was saved before.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), Error>;
}
