pub mod account_types;
pub mod messages;
pub mod proto;
pub mod queries;
pub mod registry;
pub mod tx_builder;
pub mod wallet;

pub use account_types::{Account, AccountInfo};
pub use messages::{Argument, ArgumentType, SqlValue, TxMessage};
pub use registry::ModuleRegistry;
pub use tx_builder::{SignMode, SignedTx, SignerData, TxDraft};
pub use wallet::{KeyAlgorithm, Wallet};
