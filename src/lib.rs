pub mod balance;
pub mod cli;
pub mod csv_io;
pub mod engine;
pub mod errors;
pub mod journal;
pub mod locks;
pub mod models;
pub mod registry;
pub mod storage;

pub use engine::LedgerEngine;
pub use errors::LedgerError;
pub use models::{
    Account, AccountStatus, AccountType, EntryType, LedgerEntry, Transaction, TransactionStatus,
    TransactionType,
};
pub use registry::{AccountRegistry, AccountWithBalance};
pub use storage::{InMemoryStore, LedgerStore};
