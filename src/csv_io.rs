use crate::models::{AccountStatus, AccountType};
use csv_async::AsyncReaderBuilder;
use futures::stream::Stream;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::compat::TokioAsyncReadCompatExt;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Open,
    Deposit,
    Withdraw,
    Transfer,
    Freeze,
    Unfreeze,
    Close,
}

/// One line of a ledger command file. Accounts are referred to by
/// file-local labels; the CLI maps them to the generated account ids.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRow {
    pub op: Operation,
    pub account: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Stream operations from an async reader.
pub fn stream_operations<R: AsyncRead + Unpin + Send + 'static>(
    reader: R,
) -> impl Stream<Item = Result<OperationRow, csv_async::Error>> {
    let compat_reader = reader.compat();
    let csv_reader = AsyncReaderBuilder::new()
        .trim(csv_async::Trim::All)
        .flexible(true)
        .create_deserializer(compat_reader);

    csv_reader.into_deserialize::<OperationRow>()
}

#[derive(Debug)]
pub struct AccountSummary {
    pub label: String,
    pub user_id: String,
    pub account_type: AccountType,
    pub currency: String,
    pub status: AccountStatus,
    pub balance: Decimal,
}

pub async fn write_summaries<W: AsyncWrite + Unpin>(
    mut writer: W,
    summaries: Vec<AccountSummary>,
) -> Result<(), anyhow::Error> {
    writer
        .write_all(b"account,user,type,currency,status,balance\n")
        .await?;

    for summary in summaries {
        let line = format!(
            "{},{},{},{},{},{:.4}\n",
            summary.label,
            summary.user_id,
            summary.account_type.as_str(),
            summary.currency,
            summary.status.as_str(),
            summary.balance
        );
        writer.write_all(line.as_bytes()).await?;
    }

    writer.flush().await?;
    Ok(())
}
