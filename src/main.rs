use anyhow::Result;
use clap::Parser;
use financial_ledger::cli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "financial-ledger")]
#[command(about = "Process double-entry ledger operations")]
struct Cli {
    /// CSV command file to process
    input: PathBuf,

    /// Journal file for durable state across runs
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Log to stderr (stdout stays clean for the account table)
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
            )
            .init();
    }

    cli::run(args.input, args.journal).await
}
