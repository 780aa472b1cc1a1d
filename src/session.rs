use std::fmt::Display;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::auth::{Login, LoginState};
use crate::domain::{Error, Money, Pin};
use crate::ledger::Ledger;
use crate::validation::{is_valid_amount, is_valid_pin, is_valid_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Withdraw,
    Deposit,
    ViewBalance,
    SendTransfer,
    AcceptTransfer,
    ChangePin,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 7] = [
        MenuAction::Withdraw,
        MenuAction::Deposit,
        MenuAction::ViewBalance,
        MenuAction::SendTransfer,
        MenuAction::AcceptTransfer,
        MenuAction::ChangePin,
        MenuAction::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Withdraw => "Withdraw Funds",
            MenuAction::Deposit => "Deposit Funds",
            MenuAction::ViewBalance => "View Balance",
            MenuAction::SendTransfer => "Send E-Transfer",
            MenuAction::AcceptTransfer => "Accept E-Transfer",
            MenuAction::ChangePin => "Change PIN",
            MenuAction::Exit => "Exit",
        }
    }
}

/// Accepts the menu number (`1`..=`7`) or the label, ignoring case.
impl FromStr for MenuAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or(());
        }
        Self::ALL
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Line-oriented console front end: logs one user in, then runs menu actions
/// against the ledger until they exit.
pub struct Session<R, W> {
    input: R,
    out: W,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    async fn say(&mut self, message: impl Display) -> Result<(), Error> {
        self.out.write_all(format!("{}\n", message).as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> Result<String, Error> {
        self.out.write_all(format!("{} ", prompt).as_bytes()).await?;
        self.out.flush().await?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line).await? == 0 {
            return Err(Error::InputClosed);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }

        // Undecodable bytes become U+FFFD and then fail validation like any
        // other bad input.
        match String::from_utf8(line) {
            Ok(line) => Ok(line),
            Err(e) => {
                warn!("input line is not valid UTF-8");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    /// Re-asks until `is_valid` holds.
    async fn ask_valid(
        &mut self,
        prompt: &str,
        is_valid: fn(&str) -> bool,
        error_message: &str,
    ) -> Result<String, Error> {
        loop {
            let input = self.ask(prompt).await?;
            if is_valid(&input) {
                return Ok(input);
            }
            self.say(error_message).await?;
        }
    }

    async fn ask_amount(&mut self, prompt: &str) -> Result<Money, Error> {
        let input = self
            .ask_valid(prompt, is_valid_amount, "Please enter a valid amount.")
            .await?;
        input.parse()
    }

    /// Runs the login state machine. Returns the authenticated username, or
    /// `AuthenticationExhausted` after the last allowed failure.
    pub async fn login(&mut self, ledger: &Ledger) -> Result<String, Error> {
        let mut login = Login::new();
        loop {
            let username = self.ask("Enter your username:").await?;
            let pin = self.ask("Enter your PIN:").await?;

            match login.submit(ledger, &username, &pin) {
                LoginState::Authenticated(username) => {
                    let username = username.clone();
                    info!(username = %username, "session started");
                    self.say("Authentication successful!").await?;
                    return Ok(username);
                }
                LoginState::AwaitingCredentials { .. } => {
                    self.say("Incorrect username or PIN. Try again.").await?;
                }
                LoginState::Rejected => {
                    self.say("Incorrect username or PIN. Try again.").await?;
                    self.say("Too many failed attempts. Exiting...").await?;
                    return Err(Error::AuthenticationExhausted);
                }
            }
        }
    }

    /// Serves menu actions for `username` until Exit or end of input.
    pub async fn run(&mut self, ledger: &mut Ledger, username: &str) -> Result<(), Error> {
        loop {
            self.say("Choose an action:").await?;
            for (i, action) in MenuAction::ALL.iter().enumerate() {
                self.say(format!("  {}) {}", i + 1, action.label())).await?;
            }

            let choice = match self.ask(">").await {
                Ok(choice) => choice,
                Err(Error::InputClosed) => {
                    debug!("input closed, leaving menu");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            let Ok(action) = choice.parse::<MenuAction>() else {
                self.say("Invalid choice.").await?;
                continue;
            };
            if action == MenuAction::Exit {
                return Ok(());
            }

            match self.perform(ledger, username, action).await {
                Ok(()) => {}
                Err(Error::InputClosed) => return Ok(()),
                Err(e @ (Error::IO(_) | Error::Json(_))) => return Err(e),
                Err(e) => self.say(e).await?,
            }
        }
    }

    async fn perform(
        &mut self,
        ledger: &mut Ledger,
        username: &str,
        action: MenuAction,
    ) -> Result<(), Error> {
        match action {
            MenuAction::Withdraw => {
                let amount = self.ask_amount("Enter amount to withdraw:").await?;
                let balance = ledger.withdraw(username, amount)?;
                self.say(format!("Updated balance: ${}", balance)).await
            }
            MenuAction::Deposit => {
                let amount = self.ask_amount("Enter amount to deposit:").await?;
                let balance = ledger.deposit(username, amount)?;
                self.say(format!("Updated balance: ${}", balance)).await
            }
            MenuAction::ViewBalance => {
                let balance = ledger.balance(username)?;
                self.say(format!("Your balance: ${}", balance)).await
            }
            MenuAction::SendTransfer => self.send_transfer(ledger, username).await,
            MenuAction::AcceptTransfer => self.accept_transfer(ledger, username).await,
            MenuAction::ChangePin => {
                let pin = self
                    .ask_valid("Enter a new PIN:", is_valid_pin, "PIN must be exactly 4 digits.")
                    .await?;
                ledger.change_pin(username, Pin::parse(&pin)?)?;
                self.say("PIN changed successfully!").await
            }
            MenuAction::Exit => Ok(()),
        }
    }

    async fn send_transfer(&mut self, ledger: &mut Ledger, username: &str) -> Result<(), Error> {
        let recipient = self
            .ask_valid("Enter recipient username:", is_valid_string, "Recipient must not be empty.")
            .await?;
        let amount = self.ask_amount("Enter amount to send:").await?;
        let question = self
            .ask_valid(
                "Enter a security question:",
                is_valid_string,
                "Security question must not be empty.",
            )
            .await?;
        let answer = self
            .ask_valid(
                "Enter a security answer:",
                is_valid_string,
                "Security answer must not be empty.",
            )
            .await?;

        ledger.send_transfer(username, &recipient, amount, &question, &answer)?;
        self.say(format!(
            "Transfer to {} sent. Pending transfer awaiting acceptance.",
            recipient
        ))
        .await?;
        let balance = ledger.balance(username)?;
        self.say(format!("Updated balance: ${}", balance)).await
    }

    async fn accept_transfer(&mut self, ledger: &mut Ledger, username: &str) -> Result<(), Error> {
        let choices: Vec<_> = ledger
            .pending_for(username)
            .into_iter()
            .map(|(id, transfer)| {
                (
                    id,
                    transfer.notice().to_string(),
                    transfer.security_question().to_string(),
                )
            })
            .collect();

        if choices.is_empty() {
            return self.say("No pending e-transfers.").await;
        }

        self.say("Select a transfer to accept:").await?;
        for (i, (_, notice, _)) in choices.iter().enumerate() {
            self.say(format!("  {}) {}", i + 1, notice)).await?;
        }

        let selection = loop {
            let input = self.ask(">").await?;
            match input.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => break n - 1,
                _ => self.say("Invalid choice.").await?,
            }
        };
        let (id, _, question) = &choices[selection];

        let answer = self
            .ask(&format!("Enter answer for security question: {}", question))
            .await?;

        let amount = ledger.accept_transfer(username, *id, &answer)?;
        let balance = ledger.balance(username)?;
        debug!(%amount, "credited from e-transfer");
        self.say(format!("Transfer accepted. Updated balance: ${}", balance))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, Credential, Snapshot};

    fn ledger() -> Ledger {
        Ledger::from_snapshot(Snapshot {
            accounts: vec![
                Account::new("alice", Credential::from_stored("1234"), Money::from_minor(10000))
                    .unwrap(),
                Account::new("bob", Credential::from_stored("4321"), Money::ZERO).unwrap(),
            ],
            transfers: vec![],
        })
        .unwrap()
    }

    fn session(script: &str) -> Session<&[u8], Vec<u8>> {
        Session::new(script.as_bytes(), Vec::new())
    }

    fn output(session: Session<&[u8], Vec<u8>>) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn menu_action_parsing() {
        assert_eq!("1".parse::<MenuAction>(), Ok(MenuAction::Withdraw));
        assert_eq!(" 7 ".parse::<MenuAction>(), Ok(MenuAction::Exit));
        assert_eq!("view balance".parse::<MenuAction>(), Ok(MenuAction::ViewBalance));
        assert_eq!("0".parse::<MenuAction>(), Err(()));
        assert_eq!("8".parse::<MenuAction>(), Err(()));
        assert_eq!("transfer".parse::<MenuAction>(), Err(()));
    }

    #[tokio::test]
    async fn login_succeeds() {
        let ledger = ledger();
        let mut session = session("alice\n1234\n");
        assert_eq!(session.login(&ledger).await.unwrap(), "alice");
        assert!(output(session).contains("Authentication successful!"));
    }

    #[tokio::test]
    async fn login_exhausts_after_three_failures() {
        let ledger = ledger();
        let mut session = session("alice\n0000\nmallory\n1234\nalice\n1111\nalice\n1234\n");
        assert!(matches!(
            session.login(&ledger).await,
            Err(Error::AuthenticationExhausted)
        ));
        let out = output(session);
        assert_eq!(out.matches("Incorrect username or PIN. Try again.").count(), 3);
        assert!(out.contains("Too many failed attempts. Exiting..."));
        assert!(!out.contains("Authentication successful!"));
    }

    #[tokio::test]
    async fn login_on_closed_input() {
        let ledger = ledger();
        let mut session = session("alice\n");
        assert!(matches!(session.login(&ledger).await, Err(Error::InputClosed)));
    }

    #[tokio::test]
    async fn deposit_withdraw_and_errors_return_to_menu() {
        let mut ledger = ledger();
        let mut session = session("2\n25.50\n1\nabc\n500\n1\n0\n3\n7\n");
        session.run(&mut ledger, "bob").await.unwrap();

        let out = output(session);
        assert!(out.contains("Updated balance: $25.50"));
        assert!(out.contains("Please enter a valid amount."));
        assert!(out.contains("Insufficient balance."));
        assert!(out.contains("Amount must be greater than zero."));
        assert!(out.contains("Your balance: $25.50"));
        assert_eq!(ledger.balance("bob").unwrap(), Money::from_minor(2550));
    }

    #[tokio::test]
    async fn non_utf8_input_is_rejected_and_menu_continues() {
        let mut ledger = ledger();
        let script: &[u8] = b"2\n25\n\xff\xfe\n2\n\xff\n5\n3\n7\n";
        let mut session = Session::new(script, Vec::new());
        session.run(&mut ledger, "bob").await.unwrap();

        let out = output(session);
        assert!(out.contains("Invalid choice."));
        assert!(out.contains("Please enter a valid amount."));
        assert!(out.contains("Your balance: $30.00"));
        assert_eq!(ledger.balance("bob").unwrap(), Money::from_minor(3000));
    }

    #[tokio::test]
    async fn send_and_accept_scenario() {
        let mut ledger = ledger();

        let mut alice = session("4\nbob\n40\ncity?\nParis\n4\ncarol\n1\nq\na\n7\n");
        alice.run(&mut ledger, "alice").await.unwrap();
        let out = output(alice);
        assert!(out.contains("Transfer to bob sent."));
        assert!(out.contains("Updated balance: $60.00"));
        assert!(out.contains("Recipient not found!"));
        assert_eq!(ledger.balance("alice").unwrap(), Money::from_minor(6000));

        let mut bob = session("5\n1\nLondon\n5\n2\n1\nParis\n5\n7\n");
        bob.run(&mut ledger, "bob").await.unwrap();
        let out = output(bob);
        assert!(out.contains("From: alice | Amount: $40.00 | Question: city?"));
        assert!(out.contains("Incorrect security answer."));
        assert!(out.contains("Invalid choice."));
        assert!(out.contains("Transfer accepted. Updated balance: $40.00"));
        assert!(out.contains("No pending e-transfers."));
        assert_eq!(ledger.balance("bob").unwrap(), Money::from_minor(4000));
        assert!(ledger.pending_for("bob").is_empty());
    }

    #[tokio::test]
    async fn change_pin_requires_four_digits() {
        let mut ledger = ledger();
        let mut session = session("6\n12\n9876\n");
        session.run(&mut ledger, "alice").await.unwrap();

        let out = output(session);
        assert!(out.contains("PIN must be exactly 4 digits."));
        assert!(out.contains("PIN changed successfully!"));
        assert!(ledger.authenticate("alice", "9876"));
        assert!(!ledger.authenticate("alice", "1234"));
    }
}
