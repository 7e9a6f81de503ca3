//! Chain node access over Tendermint JSON-RPC, Cosmos gRPC and websocket
//! subscriptions.

pub mod remote;
pub mod rpc;
pub mod subscription;
pub mod types;

use std::time::Duration;

use tokio::sync::mpsc;

use crate::chain::proto::{Coin, PageRequest, Pool, Validator, ValidatorSigningInfo};
use crate::chain::queries::{
    Consumer, Cpdt, Dataset, QueryConsumersResponse, QueryCpdtsResponse,
    QueryDatasetExpirationsResponse, QueryDatesetsResponse, QueryReleasingCpdtsResponse,
    ReleasingCpdt,
};
use crate::chain::account_types::AccountInfo;
use crate::chain::registry::ModuleRegistry;
use crate::error::{Error, Result};

pub use remote::{tx_hashes, RemoteNode};
pub use rpc::{HttpRpcClient, RpcClient, RpcTransport};
pub use subscription::{SubscriptionHandle, NEW_BLOCK_QUERY};
pub use types::*;

pub const DEFAULT_RPC_MAX_CONNECTIONS: usize = 10;
pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub address: String,
    pub max_connections: usize,
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:26657".to_string(),
            max_connections: DEFAULT_RPC_MAX_CONNECTIONS,
            timeout: DEFAULT_NODE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub address: String,
    pub timeout: Duration,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:9090".to_string(),
            timeout: DEFAULT_NODE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub rpc: RpcConfig,
    pub grpc: GrpcConfig,
}

#[derive(Debug, Clone, Default)]
pub enum NodeConfig {
    Remote(RemoteConfig),
    #[default]
    None,
}

/// Either a connected node or nothing; the empty variant answers
/// `Unavailable` to every call.
#[derive(Debug)]
pub enum Node {
    Remote(RemoteNode),
    None,
}

/// Must be called inside a tokio runtime when the config is `Remote`
pub fn build_node(config: &NodeConfig, registry: ModuleRegistry) -> Result<Node> {
    match config {
        NodeConfig::Remote(remote) => Ok(Node::Remote(RemoteNode::connect(remote, registry)?)),
        NodeConfig::None => Ok(Node::None),
    }
}

impl Node {
    fn remote(&self) -> Result<&RemoteNode> {
        match self {
            Node::Remote(node) => Ok(node),
            Node::None => Err(Error::Unavailable("no node configured".to_string())),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Node::Remote(_))
    }

    pub async fn status(&self) -> Result<Status> {
        self.remote()?.status().await
    }

    pub async fn latest_height(&self) -> Result<i64> {
        self.remote()?.latest_height().await
    }

    pub async fn chain_id(&self) -> Result<String> {
        self.remote()?.chain_id().await
    }

    pub async fn genesis(&self) -> Result<GenesisDoc> {
        self.remote()?.genesis().await
    }

    pub async fn consensus_state(&self) -> Result<RoundStateSimple> {
        self.remote()?.consensus_state().await
    }

    pub async fn block(&self, height: i64) -> Result<BlockResult> {
        self.remote()?.block(height).await
    }

    pub async fn block_results(&self, height: i64) -> Result<BlockResults> {
        self.remote()?.block_results(height).await
    }

    pub async fn validators(&self, height: i64) -> Result<Validators> {
        self.remote()?.validators(height).await
    }

    pub async fn tx(&self, hash: &str) -> Result<ChainTx> {
        self.remote()?.tx(hash).await
    }

    pub async fn txs(&self, block: &BlockResult) -> Result<Vec<ChainTx>> {
        self.remote()?.txs(block).await
    }

    pub async fn tx_search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
        order_by: &str,
    ) -> Result<TxSearch> {
        self.remote()?.tx_search(query, page, per_page, order_by).await
    }

    pub async fn subscribe_events(
        &self,
        query: &str,
    ) -> Result<(mpsc::Receiver<ResultEvent>, SubscriptionHandle)> {
        self.remote()?.subscribe_events(query).await
    }

    pub async fn subscribe_new_blocks(
        &self,
    ) -> Result<(mpsc::Receiver<ResultEvent>, SubscriptionHandle)> {
        self.remote()?.subscribe_new_blocks().await
    }

    pub async fn account(&self, address: &str) -> Result<AccountInfo> {
        self.remote()?.account(address).await
    }

    pub async fn all_validators(&self) -> Result<Vec<Validator>> {
        self.remote()?.all_validators().await
    }

    pub async fn all_signing_infos(&self) -> Result<Vec<ValidatorSigningInfo>> {
        self.remote()?.all_signing_infos().await
    }

    pub async fn token_supply(&self, denom: &str) -> Result<u128> {
        self.remote()?.token_supply(denom).await
    }

    pub async fn staking_pool(&self) -> Result<Pool> {
        self.remote()?.staking_pool().await
    }

    pub async fn balance(&self, address: &str, denom: &str) -> Result<Coin> {
        self.remote()?.balance(address, denom).await
    }

    pub async fn query_dataset(&self, dataset_name: &str) -> Result<Option<Dataset>> {
        self.remote()?.query_dataset(dataset_name).await
    }

    pub async fn query_datasets(&self, pagination: Option<PageRequest>) -> Result<QueryDatesetsResponse> {
        self.remote()?.query_datasets(pagination).await
    }

    pub async fn query_dataset_expirations(
        &self,
        pagination: Option<PageRequest>,
    ) -> Result<QueryDatasetExpirationsResponse> {
        self.remote()?.query_dataset_expirations(pagination).await
    }

    pub async fn query_cpdt(&self, address: &str) -> Result<Option<Cpdt>> {
        self.remote()?.query_cpdt(address).await
    }

    pub async fn query_cpdts(&self, pagination: Option<PageRequest>) -> Result<QueryCpdtsResponse> {
        self.remote()?.query_cpdts(pagination).await
    }

    pub async fn query_consumer(&self, dataset_name: &str, address: &str) -> Result<Option<Consumer>> {
        self.remote()?.query_consumer(dataset_name, address).await
    }

    pub async fn query_consumers(
        &self,
        dataset_name: &str,
        pagination: Option<PageRequest>,
    ) -> Result<QueryConsumersResponse> {
        self.remote()?.query_consumers(dataset_name, pagination).await
    }

    pub async fn query_releasing_cpdt(&self, address: &str) -> Result<Vec<ReleasingCpdt>> {
        self.remote()?.query_releasing_cpdt(address).await
    }

    pub async fn query_releasing_cpdts(
        &self,
        pagination: Option<PageRequest>,
    ) -> Result<QueryReleasingCpdtsResponse> {
        self.remote()?.query_releasing_cpdts(pagination).await
    }

    pub fn stop(&self) -> Result<()> {
        self.remote()?.stop()
    }
}
