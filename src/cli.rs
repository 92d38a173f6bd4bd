use crate::csv_io::{stream_operations, write_summaries, AccountSummary, Operation, OperationRow};
use crate::engine::LedgerEngine;
use crate::journal::JournaledStore;
use crate::models::{parse_account_type, AccountStatus};
use crate::registry::AccountRegistry;
use crate::storage::{InMemoryStore, LedgerStore};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::BufReader;
use uuid::Uuid;

/// Process a ledger command file and print the final account table to
/// stdout. With a journal path the run is durable and resumes from any
/// state journaled by previous runs.
pub async fn run(input_path: PathBuf, journal_path: Option<PathBuf>) -> Result<()> {
    let store: Arc<dyn LedgerStore> = match journal_path {
        Some(path) => Arc::new(JournaledStore::open(path).await?),
        None => Arc::new(InMemoryStore::new()),
    };

    let registry = AccountRegistry::new(store.clone());
    let engine = LedgerEngine::new(store);

    // File-local account labels to generated ids.
    let mut labels: HashMap<String, Uuid> = HashMap::new();

    let file = File::open(&input_path).await?;
    let reader = BufReader::new(file);
    let mut stream = stream_operations(reader);

    while let Some(result) = stream.next().await {
        match result {
            Ok(row) => {
                if let Err(e) = apply_operation(&registry, &engine, &mut labels, &row).await {
                    tracing::warn!(op = ?row.op, account = %row.account, error = %e, "Operation rejected");
                }
            }
            Err(e) => {
                tracing::warn!("CSV parse error: {}", e);
            }
        }
    }

    let mut ordered: Vec<(&String, &Uuid)> = labels.iter().collect();
    ordered.sort_by_key(|(label, _)| label.clone());

    let mut summaries = Vec::new();
    for (label, id) in ordered {
        let with_balance = registry.get_account_with_balance(*id).await?;
        summaries.push(AccountSummary {
            label: label.clone(),
            user_id: with_balance.account.user_id,
            account_type: with_balance.account.account_type,
            currency: with_balance.account.currency,
            status: with_balance.account.status,
            balance: with_balance.balance,
        });
    }

    write_summaries(tokio::io::stdout(), summaries).await?;

    Ok(())
}

async fn apply_operation(
    registry: &AccountRegistry,
    engine: &LedgerEngine,
    labels: &mut HashMap<String, Uuid>,
    row: &OperationRow,
) -> Result<()> {
    match row.op {
        Operation::Open => {
            if labels.contains_key(&row.account) {
                anyhow::bail!("account label {} already in use", row.account);
            }
            let user = row.user.as_deref().context("open requires a user")?;
            let kind = row.kind.as_deref().context("open requires an account type")?;
            let currency = row.currency.as_deref().context("open requires a currency")?;

            let account = registry
                .create_account(user, parse_account_type(kind)?, currency)
                .await?;
            labels.insert(row.account.clone(), account.id);
        }
        Operation::Deposit => {
            let account_id = resolve(labels, &row.account)?;
            let amount = row.amount.context("deposit requires an amount")?;
            let currency = row.currency.as_deref().context("deposit requires a currency")?;
            engine
                .execute_deposit(account_id, amount, currency, row.description.clone())
                .await?;
        }
        Operation::Withdraw => {
            let account_id = resolve(labels, &row.account)?;
            let amount = row.amount.context("withdraw requires an amount")?;
            let currency = row
                .currency
                .as_deref()
                .context("withdraw requires a currency")?;
            engine
                .execute_withdrawal(account_id, amount, currency, row.description.clone())
                .await?;
        }
        Operation::Transfer => {
            let source = resolve(labels, &row.account)?;
            let dest_label = row.to.as_deref().context("transfer requires a destination")?;
            let destination = resolve(labels, dest_label)?;
            let amount = row.amount.context("transfer requires an amount")?;
            let currency = row
                .currency
                .as_deref()
                .context("transfer requires a currency")?;
            engine
                .execute_transfer(source, destination, amount, currency, row.description.clone())
                .await?;
        }
        Operation::Freeze => {
            let account_id = resolve(labels, &row.account)?;
            registry
                .set_account_status(account_id, AccountStatus::Frozen)
                .await?;
        }
        Operation::Unfreeze => {
            let account_id = resolve(labels, &row.account)?;
            registry
                .set_account_status(account_id, AccountStatus::Active)
                .await?;
        }
        Operation::Close => {
            let account_id = resolve(labels, &row.account)?;
            registry
                .set_account_status(account_id, AccountStatus::Closed)
                .await?;
        }
    }

    Ok(())
}

fn resolve(labels: &HashMap<String, Uuid>, label: &str) -> Result<Uuid> {
    labels
        .get(label)
        .copied()
        .with_context(|| format!("unknown account label {}", label))
}
