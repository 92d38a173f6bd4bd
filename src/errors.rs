use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("account {0} not found")]
    AccountNotFound(Uuid),
    #[error("transaction {0} not found")]
    TransactionNotFound(Uuid),
    #[error("account {0} is not active")]
    InactiveAccount(Uuid),
    #[error("account currency {account_currency} does not match transaction currency {requested}")]
    CurrencyMismatch {
        account_currency: String,
        requested: String,
    },
    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },
    #[error("source and destination accounts cannot be the same")]
    SameAccount,
    // Defensive invariant checks: these indicate a bug, not a user error.
    #[error("ledger imbalance for transaction {transaction_id}: net {net}")]
    LedgerImbalance { transaction_id: Uuid, net: Decimal },
    #[error("duplicate ledger entry for transaction {transaction_id} on account {account_id}")]
    DuplicateEntry {
        transaction_id: Uuid,
        account_id: Uuid,
    },
    #[error("journal write failed: {0}")]
    Journal(String),
}
