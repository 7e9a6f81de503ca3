//! Chain-facing client: transaction pipeline, SQL reads and writes.

pub mod endpoint;
pub mod gas;
pub mod lcd;
pub mod options;
pub mod querier;
pub mod scan;
pub mod write;

#[cfg(test)]
pub(crate) mod mock;

pub use endpoint::{GasInfo, RestEndpoint, TxEndpoint, TxResponse};
pub use gas::GasPrice;
pub use lcd::{CreateTxOptions, LcdClient};
pub use options::{ClientOptions, SettlePolicy, DEFAULT_CHAIN_ENDPOINT};
pub use querier::{ListTablesFilter, ResultSet, SqlQueryResponse};
pub use scan::{FromColumn, ScanMode, Scannable};
pub use write::GrantRole;
