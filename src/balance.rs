use crate::models::LedgerEntry;
use crate::storage::LedgerStore;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Net of a set of entries: sum of credits minus sum of debits, in exact
/// decimal arithmetic.
pub fn signed_total(entries: &[LedgerEntry]) -> Decimal {
    entries.iter().map(LedgerEntry::signed_amount).sum()
}

/// Current balance of an account, derived from its ledger entries alone.
/// Zero for an account with no entries. The store read is a consistent
/// snapshot, so a commit racing with this call is either fully reflected or
/// not at all.
pub async fn calculate_balance(store: &dyn LedgerStore, account_id: Uuid) -> Decimal {
    let entries = store.entries_for_account(account_id).await;
    signed_total(&entries)
}
