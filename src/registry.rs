use crate::balance;
use crate::errors::LedgerError;
use crate::models::{is_valid_currency, Account, AccountStatus, AccountType, LedgerEntry};
use crate::storage::LedgerStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AccountWithBalance {
    pub account: Account,
    pub balance: Decimal,
}

/// Creates and looks up accounts, and enforces currency validity and the
/// account status lifecycle. Balances are always delegated to the balance
/// calculator, never stored.
#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn LedgerStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn create_account(
        &self,
        user_id: impl Into<String>,
        account_type: AccountType,
        currency: &str,
    ) -> Result<Account, LedgerError> {
        if !is_valid_currency(currency) {
            return Err(LedgerError::Validation(format!(
                "currency must be a 3-letter uppercase code, got {:?}",
                currency
            )));
        }

        let account = Account::new(user_id, account_type, currency.to_string());
        let account = self.store.insert_account(account).await?;
        info!(
            account_id = %account.id,
            user_id = %account.user_id,
            currency = %account.currency,
            "Account created"
        );
        Ok(account)
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<Account, LedgerError> {
        self.store
            .get_account(account_id)
            .await
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    pub async fn get_account_with_balance(
        &self,
        account_id: Uuid,
    ) -> Result<AccountWithBalance, LedgerError> {
        let account = self.get_account(account_id).await?;
        let balance = balance::calculate_balance(self.store.as_ref(), account_id).await;
        Ok(AccountWithBalance { account, balance })
    }

    /// A user's accounts in creation order. Snapshot at call time.
    pub async fn list_accounts_for_user(&self, user_id: &str) -> Vec<Account> {
        self.store.accounts_for_user(user_id).await
    }

    /// Full entry history for an account, newest first.
    pub async fn get_account_ledger(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        // Distinguish a missing account from one with no postings.
        self.get_account(account_id).await?;
        Ok(self.store.entries_for_account(account_id).await)
    }

    /// Freeze, unfreeze or close an account. Closed is terminal; the account
    /// record itself is never deleted because entries reference it.
    pub async fn set_account_status(
        &self,
        account_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let account = self.store.update_account_status(account_id, status).await?;
        info!(account_id = %account.id, status = ?account.status, "Account status changed");
        Ok(account)
    }
}
