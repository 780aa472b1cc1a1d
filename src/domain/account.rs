use crate::domain::{Credential, Error, Money, Pin};

#[derive(Debug, Clone)]
pub struct Account {
    username: String,
    pin: Credential,
    balance: Money, // never negative
}

impl Account {
    /// Builds an account from persisted state.
    pub fn new(username: impl Into<String>, pin: Credential, balance: Money) -> Result<Self, Error> {
        if balance.is_negative() {
            return Err(Error::PersistenceCorrupt(
                "account balance cannot be negative".to_string(),
            ));
        }

        Ok(Self {
            username: username.into(),
            pin,
            balance,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn credential(&self) -> &Credential {
        &self.pin
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn authenticate(&self, candidate_pin: &str) -> bool {
        self.pin.verify(candidate_pin)
    }

    pub fn deposit(&mut self, amount: Money) -> Result<(), Error> {
        self.balance = self.balance_after_deposit(amount)?;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Money) -> Result<(), Error> {
        if !amount.is_positive() {
            return Err(Error::NonPositiveAmount);
        }
        if amount > self.balance {
            return Err(Error::InsufficientFunds);
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(Error::InsufficientFunds)?;
        Ok(())
    }

    pub fn change_pin(&mut self, new_pin: Pin) {
        self.pin = new_pin.into();
    }

    /// Balance a deposit of `amount` would produce, without applying it.
    pub(crate) fn balance_after_deposit(&self, amount: Money) -> Result<Money, Error> {
        if !amount.is_positive() {
            return Err(Error::NonPositiveAmount);
        }
        self.balance
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)
    }

    pub(crate) fn set_balance(&mut self, balance: Money) {
        debug_assert!(!balance.is_negative());
        self.balance = balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: i64) -> Account {
        Account::new("alice", Credential::from_stored("1234"), Money::from_minor(balance)).unwrap()
    }

    #[test]
    fn test_negative_balance_rejected() {
        assert!(matches!(
            Account::new("alice", Credential::from_stored("1234"), Money::from_minor(-1)),
            Err(Error::PersistenceCorrupt(_))
        ));
    }

    #[test]
    fn test_deposit() {
        let mut account = account(0);
        assert!(account.deposit(Money::from_minor(1000)).is_ok());
        assert_eq!(account.balance(), Money::from_minor(1000));
    }

    #[test]
    fn test_deposit_non_positive() {
        let mut account = account(500);
        assert!(matches!(
            account.deposit(Money::ZERO),
            Err(Error::NonPositiveAmount)
        ));
        assert!(matches!(
            account.deposit(Money::from_minor(-100)),
            Err(Error::NonPositiveAmount)
        ));
        assert_eq!(account.balance(), Money::from_minor(500));
    }

    #[test]
    fn test_deposit_overflow() {
        let mut account =
            Account::new("alice", Credential::from_stored("1234"), Money::MAX).unwrap();
        assert!(matches!(
            account.deposit(Money::from_minor(1)),
            Err(Error::AmountOverflow)
        ));
        assert_eq!(account.balance(), Money::MAX);
    }

    #[test]
    fn test_withdrawal() {
        let mut account = account(2000);
        assert!(account.withdraw(Money::from_minor(1000)).is_ok());
        assert_eq!(account.balance(), Money::from_minor(1000));
        assert!(account.withdraw(Money::from_minor(1000)).is_ok());
        assert_eq!(account.balance(), Money::ZERO);
    }

    #[test]
    fn test_withdrawal_insufficient_funds() {
        let mut account = account(999);
        assert!(matches!(
            account.withdraw(Money::from_minor(1000)),
            Err(Error::InsufficientFunds)
        ));
        assert_eq!(account.balance(), Money::from_minor(999));
    }

    #[test]
    fn test_withdrawal_non_positive() {
        let mut account = account(100);
        assert!(matches!(
            account.withdraw(Money::from_minor(-5)),
            Err(Error::NonPositiveAmount)
        ));
        assert_eq!(account.balance(), Money::from_minor(100));
    }

    #[test]
    fn test_deposit_withdraw_round_trip() {
        let mut account = account(1234);
        account.deposit(Money::from_minor(4321)).unwrap();
        account.withdraw(Money::from_minor(4321)).unwrap();
        assert_eq!(account.balance(), Money::from_minor(1234));
    }

    #[test]
    fn test_balance_never_negative_under_mixed_operations() {
        let mut account = account(0);
        let amounts = [300, -50, 0, 1000, 700, 250, -1, 250, 1, 5000, 49];
        for (i, amount) in amounts.iter().enumerate() {
            let amount = Money::from_minor(*amount);
            let _ = if i % 2 == 0 {
                account.deposit(amount)
            } else {
                account.withdraw(amount)
            };
            assert!(!account.balance().is_negative());
        }
    }

    #[test]
    fn test_authenticate_and_change_pin() {
        let mut account = account(0);
        assert!(account.authenticate("1234"));
        assert!(!account.authenticate("0000"));

        account.change_pin(Pin::parse("0000").unwrap());
        assert!(account.authenticate("0000"));
        assert!(!account.authenticate("1234"));
    }
}
