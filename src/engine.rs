use crate::balance;
use crate::errors::LedgerError;
use crate::locks::AccountLocks;
use crate::models::{
    Account, LedgerEntry, Transaction, TransactionMetadata, TransactionType,
};
use crate::storage::LedgerStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Monetary precision: fixed-point with 4 fractional digits.
const MAX_AMOUNT_SCALE: u32 = 4;

/// Coordinates deposits, withdrawals and transfers. Each operation is one
/// atomic unit: preconditions are validated, the balance is read and the
/// transaction plus its entries are committed while holding the touched
/// accounts' locks, so no overdraft and no partial write is ever observable.
///
/// Failed attempts are not persisted: every error aborts before the store
/// commit and leaves no durable trace.
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    locks: Arc<AccountLocks>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            locks: Arc::new(AccountLocks::new()),
        }
    }

    pub async fn execute_deposit(
        &self,
        account_id: Uuid,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;

        let _guard = self.locks.lock(account_id).await;
        let account = self.load_active_account(account_id, currency).await?;

        let mut transaction = Transaction::new(
            TransactionType::Deposit,
            amount,
            currency.to_string(),
            description,
            TransactionMetadata::for_account(account.id),
        );
        let entry = LedgerEntry::credit(transaction.id, account.id, amount);
        transaction.complete();

        let transaction = self.store.commit(transaction, vec![entry]).await?;
        info!(
            transaction_id = %transaction.id,
            account_id = %account_id,
            amount = %amount,
            "Deposit completed"
        );
        Ok(transaction)
    }

    pub async fn execute_withdrawal(
        &self,
        account_id: Uuid,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;

        let _guard = self.locks.lock(account_id).await;
        let account = self.load_active_account(account_id, currency).await?;

        let available = balance::calculate_balance(self.store.as_ref(), account.id).await;
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                available,
                required: amount,
            });
        }

        let mut transaction = Transaction::new(
            TransactionType::Withdrawal,
            amount,
            currency.to_string(),
            description,
            TransactionMetadata::for_account(account.id),
        );
        let entry = LedgerEntry::debit(transaction.id, account.id, amount);
        transaction.complete();

        let transaction = self.store.commit(transaction, vec![entry]).await?;
        info!(
            transaction_id = %transaction.id,
            account_id = %account_id,
            amount = %amount,
            "Withdrawal completed"
        );
        Ok(transaction)
    }

    pub async fn execute_transfer(
        &self,
        source_account_id: Uuid,
        destination_account_id: Uuid,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        // Checked before any account lookup.
        if source_account_id == destination_account_id {
            return Err(LedgerError::SameAccount);
        }
        validate_amount(amount)?;

        let _guards = self
            .locks
            .lock_pair(source_account_id, destination_account_id)
            .await;

        // Source is validated fully before the destination; source errors
        // take precedence.
        let source = self.load_active_account(source_account_id, currency).await?;
        let destination = self
            .load_active_account(destination_account_id, currency)
            .await?;

        let available = balance::calculate_balance(self.store.as_ref(), source.id).await;
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                available,
                required: amount,
            });
        }

        let mut transaction = Transaction::new(
            TransactionType::Transfer,
            amount,
            currency.to_string(),
            description,
            TransactionMetadata::for_transfer(source.id, destination.id),
        );
        let entries = vec![
            LedgerEntry::debit(transaction.id, source.id, amount),
            LedgerEntry::credit(transaction.id, destination.id, amount),
        ];

        // Deferred double-entry check at the end of the unit. Structurally
        // impossible to fail with the two entries built above; guards future
        // code paths.
        let net = balance::signed_total(&entries);
        if net != Decimal::ZERO {
            error!(
                transaction_id = %transaction.id,
                net = %net,
                "Double-entry verification failed, aborting transfer"
            );
            return Err(LedgerError::LedgerImbalance {
                transaction_id: transaction.id,
                net,
            });
        }

        transaction.complete();
        let transaction = self.store.commit(transaction, entries).await?;
        info!(
            transaction_id = %transaction.id,
            source = %source_account_id,
            destination = %destination_account_id,
            amount = %amount,
            "Transfer completed"
        );
        Ok(transaction)
    }

    pub async fn get_transaction(&self, transaction_id: Uuid) -> Result<Transaction, LedgerError> {
        self.store
            .get_transaction(transaction_id)
            .await
            .ok_or(LedgerError::TransactionNotFound(transaction_id))
    }

    /// Load an account and check the preconditions shared by every
    /// operation, in fixed order: existence, active status, currency match.
    async fn load_active_account(
        &self,
        account_id: Uuid,
        currency: &str,
    ) -> Result<Account, LedgerError> {
        let account = self
            .store
            .get_account(account_id)
            .await
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        if !account.is_active() {
            return Err(LedgerError::InactiveAccount(account_id));
        }
        if account.currency != currency {
            return Err(LedgerError::CurrencyMismatch {
                account_currency: account.currency.clone(),
                requested: currency.to_string(),
            });
        }
        Ok(account)
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(LedgerError::Validation(format!(
            "amount supports at most {} fractional digits, got {}",
            MAX_AMOUNT_SCALE, amount
        )));
    }
    Ok(())
}
