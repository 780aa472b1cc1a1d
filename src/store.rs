use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    Account, Credential, Error, LedgerStore, Money, Snapshot, Transfer,
};

/// Keeps the ledger in a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// On-disk shape of the whole file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerFile {
    users: Option<Vec<UserRow>>,
    pending_transfers: Option<Vec<TransferRow>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    username: String,
    #[serde(rename = "PIN")]
    pin: PinValue,
    balance: Money,
}

/// Older files stored PINs as numbers.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PinValue {
    Text(String),
    Number(u64),
}

/// Parties were once written as whole user objects; only the name matters.
#[derive(Debug, Serialize, Deserialize)]
struct PartyRef {
    username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferRow {
    sender: PartyRef,
    recipient: PartyRef,
    amount: Money,
    security_question: String,
    security_answer: String,
}

impl TryFrom<UserRow> for Account {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let pin = match row.pin {
            PinValue::Text(pin) => pin,
            PinValue::Number(pin) => pin.to_string(),
        };
        Account::new(row.username, Credential::from_stored(pin), row.balance)
    }
}

impl TryFrom<TransferRow> for Transfer {
    type Error = Error;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        Transfer::new(
            row.sender.username,
            row.recipient.username,
            row.amount,
            row.security_question,
            row.security_answer,
        )
        .map_err(|e| Error::PersistenceCorrupt(format!("invalid pending e-transfer: {}", e)))
    }
}

impl From<&Account> for UserRow {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username().to_string(),
            pin: PinValue::Text(account.credential().expose().to_string()),
            balance: account.balance(),
        }
    }
}

impl From<&Transfer> for TransferRow {
    fn from(transfer: &Transfer) -> Self {
        Self {
            sender: PartyRef {
                username: transfer.sender().to_string(),
            },
            recipient: PartyRef {
                username: transfer.recipient().to_string(),
            },
            amount: transfer.amount(),
            security_question: transfer.security_question().to_string(),
            security_answer: transfer.security_answer().to_string(),
        }
    }
}

fn parse(contents: &str) -> Result<Snapshot, Error> {
    let file: LedgerFile = serde_json::from_str(contents)
        .map_err(|e| Error::PersistenceCorrupt(format!("JSON deserialization error: {}", e)))?;

    let users = file.users.unwrap_or_else(|| {
        info!("no users found in ledger file");
        Vec::new()
    });
    let transfers = file.pending_transfers.unwrap_or_else(|| {
        info!("no pending transfers found in ledger file");
        Vec::new()
    });

    Ok(Snapshot {
        accounts: users
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<_, _>>()?,
        transfers: transfers
            .into_iter()
            .map(Transfer::try_from)
            .collect::<Result<_, _>>()?,
    })
}

fn render(snapshot: &Snapshot) -> Result<String, Error> {
    let file = LedgerFile {
        users: Some(snapshot.accounts.iter().map(UserRow::from).collect()),
        pending_transfers: Some(snapshot.transfers.iter().map(TransferRow::from).collect()),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

impl LedgerStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot, Error> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "ledger file not found, starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %self.path.display(), bytes = contents.len(), "read ledger file");
        parse(&contents)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), Error> {
        let contents = render(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Replace the old file in one step so a crash never leaves half a ledger.
        let temp = self.temp_path();
        tokio::fs::write(&temp, contents).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), "wrote ledger file");
        Ok(())
    }
}
