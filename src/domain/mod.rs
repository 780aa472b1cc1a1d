pub mod account;
pub mod credential;
pub mod error;
pub mod money;
pub mod traits;
pub mod transfer;

pub use account::Account;
pub use credential::{Credential, Pin};
pub use error::Error;
pub use money::Money;
pub use traits::{LedgerStore, Snapshot};
pub use transfer::{Transfer, TransferId};
