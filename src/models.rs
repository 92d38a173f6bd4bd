use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Business,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Business => "business",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Frozen => "frozen",
            AccountStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: String,
    pub account_type: AccountType,
    pub currency: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: impl Into<String>, account_type: AccountType, currency: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            account_type,
            currency,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// ISO-style currency code: exactly three uppercase ASCII letters.
pub fn is_valid_currency(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// Structured metadata attached to a transaction. Deposits and withdrawals
/// carry the touched account; transfers carry both legs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<Uuid>,
}

impl TransactionMetadata {
    pub fn for_account(account_id: Uuid) -> Self {
        Self {
            account_id: Some(account_id),
            ..Default::default()
        }
    }

    pub fn for_transfer(source_account_id: Uuid, destination_account_id: Uuid) -> Self {
        Self {
            source_account_id: Some(source_account_id),
            destination_account_id: Some(destination_account_id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub metadata: TransactionMetadata,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        tx_type: TransactionType,
        amount: Decimal,
        currency: String,
        description: Option<String>,
        metadata: TransactionMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx_type,
            status: TransactionStatus::Pending,
            amount,
            currency,
            description,
            metadata,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Settle the transaction. Terminal; a completed transaction is never
    /// reopened.
    pub fn complete(&mut self) {
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

/// An immutable posting of a single amount against one account for one
/// transaction. Entries are append-only: never updated or deleted once
/// written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn debit(transaction_id: Uuid, account_id: Uuid, amount: Decimal) -> Self {
        Self::new(transaction_id, account_id, EntryType::Debit, amount)
    }

    pub fn credit(transaction_id: Uuid, account_id: Uuid, amount: Decimal) -> Self {
        Self::new(transaction_id, account_id, EntryType::Credit, amount)
    }

    fn new(transaction_id: Uuid, account_id: Uuid, entry_type: EntryType, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            transaction_id,
            entry_type,
            amount,
            created_at: Utc::now(),
        }
    }

    /// Signed amount: credits increase a balance, debits decrease it.
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Credit => self.amount,
            EntryType::Debit => -self.amount,
        }
    }
}

pub fn parse_account_type(s: &str) -> Result<AccountType, anyhow::Error> {
    match s.trim().to_lowercase().as_str() {
        "checking" => Ok(AccountType::Checking),
        "savings" => Ok(AccountType::Savings),
        "business" => Ok(AccountType::Business),
        _ => anyhow::bail!("Unknown account type: {}", s),
    }
}
