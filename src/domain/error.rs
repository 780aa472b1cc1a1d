use crate::domain::TransferId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Amount must be greater than zero.")]
    NonPositiveAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount is too large.")]
    AmountOverflow,

    #[error("PIN must be exactly 4 digits.")]
    InvalidPin,

    #[error("{0} must not be empty.")]
    EmptyField(&'static str),

    #[error("Insufficient balance.")]
    InsufficientFunds,

    #[error("Account {0} not found.")]
    AccountNotFound(String),

    #[error("Recipient not found!")]
    RecipientNotFound(String),

    #[error("E-transfer {0} is no longer pending.")]
    TransferNotFound(TransferId),

    #[error("Incorrect security answer.")]
    IncorrectAnswer,

    #[error("Too many failed attempts.")]
    AuthenticationExhausted,

    #[error("Saved ledger is corrupt: {0}")]
    PersistenceCorrupt(String),

    #[error("Input closed")]
    InputClosed,
}
