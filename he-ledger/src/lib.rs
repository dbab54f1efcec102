pub mod codec;
pub mod config;
pub mod dispatch;
pub mod encoding;
pub mod errors;
pub mod keypair;
pub mod preset;
pub mod report;
pub mod store;

pub use config::LedgerConfig;
pub use dispatch::Ledger;
pub use errors::LedgerError;
pub use keypair::{KeyPair, PublicKey, SecretKey};
pub use report::{Report, manager::ReportManager};
pub use store::{MemoryStore, ReportStore, StateEntry, StoreError};
