use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::domain::{
    Account, Error, LedgerStore, Money, Pin, Snapshot, Transfer, TransferId,
};

/// Owns every account and every pending e-transfer for one run of the program.
///
/// Transfers refer to accounts by username and are resolved here at use time.
/// Each mutating operation takes `&mut self` and either fully applies or
/// leaves the ledger untouched.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: BTreeMap<String, Account>,
    pending: Vec<(TransferId, Transfer)>,
    next_transfer_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted state, checking that usernames are
    /// unique and that every transfer points at known accounts.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, Error> {
        let mut ledger = Self::new();

        for account in snapshot.accounts {
            let username = account.username().to_string();
            if ledger.accounts.insert(username.clone(), account).is_some() {
                return Err(Error::PersistenceCorrupt(format!(
                    "duplicate account {}",
                    username
                )));
            }
        }

        for transfer in snapshot.transfers {
            for party in [transfer.sender(), transfer.recipient()] {
                if !ledger.accounts.contains_key(party) {
                    return Err(Error::PersistenceCorrupt(format!(
                        "pending e-transfer references unknown account {}",
                        party
                    )));
                }
            }
            ledger.enqueue(transfer);
        }

        Ok(ledger)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            accounts: self.accounts.values().cloned().collect(),
            transfers: self.pending.iter().map(|(_, t)| t.clone()).collect(),
        }
    }

    /// Loads the ledger through `store`. Unreadable or inconsistent state is
    /// reported and replaced by an empty ledger; the program keeps running.
    pub async fn load<S: LedgerStore>(store: &S) -> Self {
        let loaded = match store.load().await {
            Ok(snapshot) => Ledger::from_snapshot(snapshot),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(ledger) => {
                info!(
                    accounts = ledger.accounts.len(),
                    pending = ledger.pending.len(),
                    "ledger loaded"
                );
                ledger
            }
            Err(e) => {
                error!(error = %e, "failed to load ledger, starting empty");
                Ledger::new()
            }
        }
    }

    pub async fn save<S: LedgerStore>(&self, store: &S) -> Result<(), Error> {
        store.save(&self.to_snapshot()).await?;
        info!(
            accounts = self.accounts.len(),
            pending = self.pending.len(),
            "ledger saved"
        );
        Ok(())
    }

    fn account_mut(&mut self, username: &str) -> Result<&mut Account, Error> {
        self.accounts
            .get_mut(username)
            .ok_or_else(|| Error::AccountNotFound(username.to_string()))
    }

    /// True only for a known username with a matching PIN. Callers cannot
    /// tell the two failure causes apart.
    pub fn authenticate(&self, username: &str, pin: &str) -> bool {
        let ok = self
            .accounts
            .get(username)
            .is_some_and(|account| account.authenticate(pin));
        if !ok {
            debug!(username, "authentication failed");
        }
        ok
    }

    pub fn balance(&self, username: &str) -> Result<Money, Error> {
        self.accounts
            .get(username)
            .map(Account::balance)
            .ok_or_else(|| Error::AccountNotFound(username.to_string()))
    }

    pub fn deposit(&mut self, username: &str, amount: Money) -> Result<Money, Error> {
        let account = self.account_mut(username)?;
        account.deposit(amount)?;
        Ok(account.balance())
    }

    pub fn withdraw(&mut self, username: &str, amount: Money) -> Result<Money, Error> {
        let account = self.account_mut(username)?;
        account.withdraw(amount)?;
        Ok(account.balance())
    }

    pub fn change_pin(&mut self, username: &str, new_pin: Pin) -> Result<(), Error> {
        self.account_mut(username)?.change_pin(new_pin);
        info!(username, "PIN changed");
        Ok(())
    }

    /// Escrows `amount` from `sender` into a new pending e-transfer for
    /// `recipient`. Amount, funds and question are all checked before the
    /// sender is debited, so a rejected send changes nothing.
    pub fn send_transfer(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Money,
        security_question: &str,
        security_answer: &str,
    ) -> Result<TransferId, Error> {
        if !self.accounts.contains_key(recipient) {
            return Err(Error::RecipientNotFound(recipient.to_string()));
        }

        let transfer = Transfer::new(
            sender,
            recipient,
            amount,
            security_question,
            security_answer,
        )?;

        let sender_account = self.account_mut(sender)?;
        sender_account.withdraw(amount)?;

        let id = self.enqueue(transfer);
        info!(%id, sender, recipient, %amount, "e-transfer sent");
        Ok(id)
    }

    /// Pending transfers addressed to `recipient`, in arrival order.
    pub fn pending_for(&self, recipient: &str) -> Vec<(TransferId, &Transfer)> {
        self.pending
            .iter()
            .filter(|(_, t)| t.is_addressed_to(recipient))
            .map(|(id, t)| (*id, t))
            .collect()
    }

    /// Releases an escrowed transfer to `recipient` if `candidate_answer`
    /// matches. The credit and the removal commit together; a wrong answer
    /// leaves the transfer pending for another try.
    pub fn accept_transfer(
        &mut self,
        recipient: &str,
        transfer_id: TransferId,
        candidate_answer: &str,
    ) -> Result<Money, Error> {
        let position = self
            .pending
            .iter()
            .position(|(id, t)| *id == transfer_id && t.is_addressed_to(recipient))
            .ok_or(Error::TransferNotFound(transfer_id))?;

        let transfer = &self.pending[position].1;
        if !transfer.accepts(candidate_answer) {
            warn!(id = %transfer_id, recipient, "incorrect security answer");
            return Err(Error::IncorrectAnswer);
        }
        let amount = transfer.amount();

        let account = self.account_mut(recipient)?;
        let credited = account.balance_after_deposit(amount)?;

        account.set_balance(credited);
        self.pending.remove(position);

        info!(id = %transfer_id, recipient, %amount, "e-transfer accepted");
        Ok(amount)
    }

    fn enqueue(&mut self, transfer: Transfer) -> TransferId {
        self.next_transfer_id += 1;
        let id = TransferId(self.next_transfer_id);
        self.pending.push((id, transfer));
        id
    }
}
