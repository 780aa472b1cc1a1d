use crate::domain::{Error, Money};

/// Process-local handle for a pending e-transfer, assigned in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransferId(pub u64);

impl core::fmt::Display for TransferId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An escrowed e-transfer. The sender has already been debited; the transfer
/// only records what the recipient is owed once the challenge is answered.
#[derive(Debug, Clone)]
pub struct Transfer {
    sender: String,
    recipient: String,
    amount: Money,
    security_question: String,
    security_answer: String,
}

/// What a recipient gets to see about a transfer before answering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotice<'a> {
    pub sender: &'a str,
    pub amount: Money,
    pub security_question: &'a str,
}

impl Transfer {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Money,
        security_question: impl Into<String>,
        security_answer: impl Into<String>,
    ) -> Result<Self, Error> {
        if !amount.is_positive() {
            return Err(Error::NonPositiveAmount);
        }

        let security_question = security_question.into();
        if security_question.trim().is_empty() {
            return Err(Error::EmptyField("Security question"));
        }

        Ok(Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            security_question,
            security_answer: security_answer.into(),
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn security_question(&self) -> &str {
        &self.security_question
    }

    /// The expected answer, for persistence only.
    pub fn security_answer(&self) -> &str {
        &self.security_answer
    }

    pub fn is_addressed_to(&self, username: &str) -> bool {
        self.recipient == username
    }

    /// Exact, case-sensitive comparison. No trimming.
    pub fn accepts(&self, candidate_answer: &str) -> bool {
        candidate_answer == self.security_answer
    }

    pub fn notice(&self) -> TransferNotice<'_> {
        TransferNotice {
            sender: &self.sender,
            amount: self.amount,
            security_question: &self.security_question,
        }
    }
}

impl core::fmt::Display for TransferNotice<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "From: {} | Amount: ${} | Question: {}",
            self.sender, self.amount, self.security_question
        )
    }
}
