use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};
use tokio::sync::{mpsc, watch};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;

use super::rpc::{HttpRpcClient, RpcClient, RpcTransport};
use super::subscription::{self, SubscriptionHandle, NEW_BLOCK_QUERY};
use super::types::{
    Block, BlockResult, BlockResults, ChainTx, GenesisDoc, ResultEvent, RoundStateSimple, Status,
    TxSearch, Validators,
};
use super::RemoteConfig;
use crate::chain::account_types::{Account, AccountInfo};
use crate::chain::proto::{
    AuthQueryClient, BankQueryClient, Coin, GetTxRequest, PageRequest, Pool, QueryAccountRequest,
    QueryBalanceRequest, QueryPoolRequest, QuerySigningInfosRequest, QuerySupplyOfRequest,
    QueryValidatorsRequest, ServiceClient, SlashingQueryClient, StakingQueryClient, Validator,
    ValidatorSigningInfo,
};
use crate::chain::queries::*;
use crate::chain::registry::ModuleRegistry;
use crate::error::{Error, Result};

/// Page size used when listing every staking validator or signing info
const ALL_PAGE_LIMIT: u64 = 10_000;

fn stopped() -> Error {
    Error::Unavailable("node has been stopped".to_string())
}

/// `http(s)://host:port` → `ws(s)://host:port/websocket`
pub(crate) fn websocket_url(rpc_address: &str) -> String {
    let trimmed = rpc_address.trim_end_matches('/');
    let base = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        trimmed.to_string()
    } else {
        format!("ws://{trimmed}")
    };
    format!("{base}/websocket")
}

/// Hashes of a block's transactions as the chain indexes them: upper-case
/// hex sha256 of the raw bytes.
pub fn tx_hashes(block: &Block) -> Result<Vec<String>> {
    block
        .data
        .txs
        .iter()
        .map(|encoded| {
            let raw = BASE64.decode(encoded)?;
            Ok(hex::encode_upper(Sha256::digest(&raw)))
        })
        .collect()
}

/// A live connection to one chain node: JSON-RPC over HTTP, a gRPC channel,
/// and websocket subscriptions opened on demand.
pub struct RemoteNode {
    rpc: RpcClient,
    channel: Mutex<Option<Channel>>,
    stopped: AtomicBool,
    registry: ModuleRegistry,
    ws_url: String,
    shutdown: watch::Sender<bool>,
}

impl std::fmt::Debug for RemoteNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteNode")
            .field("ws_url", &self.ws_url)
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish()
    }
}

impl RemoteNode {
    /// Must be called inside a tokio runtime; the gRPC channel connects lazily.
    pub fn connect(config: &RemoteConfig, registry: ModuleRegistry) -> Result<Self> {
        let transport = HttpRpcClient::new(
            &config.rpc.address,
            config.rpc.timeout,
            config.rpc.max_connections,
        )?;
        let channel = Endpoint::from_shared(config.grpc.address.clone())?
            .timeout(config.grpc.timeout)
            .connect_timeout(config.grpc.timeout)
            .connect_lazy();

        log::info!(
            "node configured: rpc {} grpc {}",
            config.rpc.address,
            config.grpc.address
        );

        Ok(Self::from_parts(
            Arc::new(transport),
            channel,
            registry,
            websocket_url(&config.rpc.address),
        ))
    }

    pub fn from_parts(
        transport: Arc<dyn RpcTransport>,
        channel: Channel,
        registry: ModuleRegistry,
        ws_url: String,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            rpc: RpcClient::new(transport),
            channel: Mutex::new(Some(channel)),
            stopped: AtomicBool::new(false),
            registry,
            ws_url,
            shutdown,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    fn rpc(&self) -> Result<&RpcClient> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(stopped());
        }
        Ok(&self.rpc)
    }

    fn channel(&self) -> Result<Channel> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(stopped());
        }
        let guard = self
            .channel
            .lock()
            .map_err(|_| Error::Unavailable("grpc channel lock poisoned".to_string()))?;
        guard.clone().ok_or_else(stopped)
    }

    /// Unary call to a service with no generated client
    async fn invoke<Req, Resp>(&self, path: &'static str, request: Req) -> Result<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel()?);
        grpc.ready()
            .await
            .map_err(|e| Error::Unavailable(format!("grpc service not ready: {e}")))?;
        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        let response = grpc
            .unary(tonic::Request::new(request), PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }

    // ---- Tendermint RPC ----

    pub async fn status(&self) -> Result<Status> {
        self.rpc()?.status().await
    }

    pub async fn latest_height(&self) -> Result<i64> {
        Ok(self.status().await?.sync_info.latest_block_height)
    }

    pub async fn chain_id(&self) -> Result<String> {
        Ok(self.status().await?.node_info.network)
    }

    pub async fn genesis(&self) -> Result<GenesisDoc> {
        self.rpc()?.genesis().await
    }

    pub async fn consensus_state(&self) -> Result<RoundStateSimple> {
        self.rpc()?.consensus_state().await
    }

    /// Height 0 asks for the latest block
    pub async fn block(&self, height: i64) -> Result<BlockResult> {
        self.rpc()?.block(height).await
    }

    pub async fn block_results(&self, height: i64) -> Result<BlockResults> {
        self.rpc()?.block_results(height).await
    }

    pub async fn validators(&self, height: i64) -> Result<Validators> {
        self.rpc()?.validators(height).await
    }

    pub async fn tx_search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
        order_by: &str,
    ) -> Result<TxSearch> {
        self.rpc()?.tx_search(query, page, per_page, order_by).await
    }

    // ---- transactions ----

    pub async fn tx(&self, hash: &str) -> Result<ChainTx> {
        let mut client = ServiceClient::new(self.channel()?);
        let response = client
            .get_tx(GetTxRequest { hash: hash.to_string() })
            .await?
            .into_inner();

        let tx = response
            .tx
            .ok_or_else(|| Error::Query(format!("tx {hash} has no body in response")))?;
        let tx_response = response
            .tx_response
            .ok_or_else(|| Error::Query(format!("tx {hash} has no result in response")))?;

        let messages = match tx.body.as_ref() {
            Some(body) => body
                .messages
                .iter()
                .map(|any| self.registry.unpack(any))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(ChainTx {
            hash: tx_response.txhash.clone(),
            height: tx_response.height,
            tx,
            response: tx_response,
            messages,
        })
    }

    /// Every transaction in a block, fetched one by one by hash
    pub async fn txs(&self, block: &BlockResult) -> Result<Vec<ChainTx>> {
        let hashes = tx_hashes(&block.block)?;
        let mut txs = Vec::with_capacity(hashes.len());
        for hash in hashes {
            txs.push(self.tx(&hash).await?);
        }
        Ok(txs)
    }

    // ---- subscriptions ----

    pub async fn subscribe_events(
        &self,
        query: &str,
    ) -> Result<(mpsc::Receiver<ResultEvent>, SubscriptionHandle)> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(stopped());
        }
        subscription::subscribe(&self.ws_url, query, self.shutdown.subscribe()).await
    }

    pub async fn subscribe_new_blocks(
        &self,
    ) -> Result<(mpsc::Receiver<ResultEvent>, SubscriptionHandle)> {
        self.subscribe_events(NEW_BLOCK_QUERY).await
    }

    // ---- cosmos modules ----

    pub async fn account(&self, address: &str) -> Result<AccountInfo> {
        let mut client = AuthQueryClient::new(self.channel()?);
        let response = client
            .account(QueryAccountRequest { address: address.to_string() })
            .await;

        let any = match response {
            Ok(response) => response
                .into_inner()
                .account
                .ok_or_else(|| Error::AccountNotFound(address.to_string()))?,
            Err(status) if status.code() == Code::NotFound => {
                return Err(Error::AccountNotFound(address.to_string()));
            }
            Err(status) => return Err(status.into()),
        };

        let account = Account::decode_any(&any.type_url, &any.value)?;
        account.get_account_info().ok_or_else(|| {
            Error::Encoding(format!(
                "account {address} of type {} has no base account",
                account.account_type()
            ))
        })
    }

    pub async fn all_validators(&self) -> Result<Vec<Validator>> {
        let mut client = StakingQueryClient::new(self.channel()?);
        let response = client
            .validators(QueryValidatorsRequest {
                status: String::new(),
                pagination: Some(PageRequest {
                    limit: ALL_PAGE_LIMIT,
                    ..Default::default()
                }),
            })
            .await?;
        Ok(response.into_inner().validators)
    }

    pub async fn all_signing_infos(&self) -> Result<Vec<ValidatorSigningInfo>> {
        let mut client = SlashingQueryClient::new(self.channel()?);
        let response = client
            .signing_infos(QuerySigningInfosRequest {
                pagination: Some(PageRequest {
                    limit: ALL_PAGE_LIMIT,
                    ..Default::default()
                }),
            })
            .await?;
        Ok(response.into_inner().info)
    }

    /// Total supply of `denom`; a response without an amount reads as zero
    pub async fn token_supply(&self, denom: &str) -> Result<u128> {
        let mut client = BankQueryClient::new(self.channel()?);
        let response = client
            .supply_of(QuerySupplyOfRequest { denom: denom.to_string() })
            .await?
            .into_inner();
        match response.amount {
            Some(coin) => parse_amount(&coin),
            None => Ok(0),
        }
    }

    pub async fn staking_pool(&self) -> Result<Pool> {
        let mut client = StakingQueryClient::new(self.channel()?);
        let response = client.pool(QueryPoolRequest {}).await?.into_inner();
        response
            .pool
            .ok_or_else(|| Error::Query("staking pool missing from response".to_string()))
    }

    pub async fn balance(&self, address: &str, denom: &str) -> Result<Coin> {
        let mut client = BankQueryClient::new(self.channel()?);
        let response = client
            .balance(QueryBalanceRequest {
                address: address.to_string(),
                denom: denom.to_string(),
            })
            .await?
            .into_inner();
        Ok(response.balance.unwrap_or_else(|| Coin {
            denom: denom.to_string(),
            amount: "0".to_string(),
        }))
    }

    // ---- glitter index and consumer modules ----

    pub async fn query_dataset(&self, dataset_name: &str) -> Result<Option<Dataset>> {
        let response: QueryDatesetResponse = self
            .invoke(
                QUERY_DATASET,
                QueryDatesetRequest { dataset_name: dataset_name.to_string() },
            )
            .await?;
        Ok(response.dataset)
    }

    pub async fn query_datasets(&self, pagination: Option<PageRequest>) -> Result<QueryDatesetsResponse> {
        self.invoke(QUERY_DATASETS, QueryDatesetsRequest { pagination }).await
    }

    pub async fn query_dataset_expirations(
        &self,
        pagination: Option<PageRequest>,
    ) -> Result<QueryDatasetExpirationsResponse> {
        self.invoke(
            QUERY_DATASET_EXPIRATIONS,
            QueryDatasetExpirationsRequest { pagination },
        )
        .await
    }

    pub async fn query_cpdt(&self, address: &str) -> Result<Option<Cpdt>> {
        let response: QueryCpdtResponse = self
            .invoke(QUERY_CPDT, QueryCpdtRequest { address: address.to_string() })
            .await?;
        Ok(response.cpdt)
    }

    pub async fn query_cpdts(&self, pagination: Option<PageRequest>) -> Result<QueryCpdtsResponse> {
        self.invoke(QUERY_CPDTS, QueryCpdtsRequest { pagination }).await
    }

    pub async fn query_consumer(&self, dataset_name: &str, address: &str) -> Result<Option<Consumer>> {
        let response: QueryConsumerResponse = self
            .invoke(
                QUERY_CONSUMER,
                QueryConsumerRequest {
                    dataset_name: dataset_name.to_string(),
                    address: address.to_string(),
                },
            )
            .await?;
        Ok(response.consumer)
    }

    pub async fn query_consumers(
        &self,
        dataset_name: &str,
        pagination: Option<PageRequest>,
    ) -> Result<QueryConsumersResponse> {
        self.invoke(
            QUERY_CONSUMERS,
            QueryConsumersRequest {
                dataset_name: dataset_name.to_string(),
                pagination,
            },
        )
        .await
    }

    pub async fn query_releasing_cpdt(&self, address: &str) -> Result<Vec<ReleasingCpdt>> {
        let response: QueryReleasingCpdtResponse = self
            .invoke(
                QUERY_RELEASING_CPDT,
                QueryReleasingCpdtRequest { address: address.to_string() },
            )
            .await?;
        Ok(response.releasing)
    }

    pub async fn query_releasing_cpdts(
        &self,
        pagination: Option<PageRequest>,
    ) -> Result<QueryReleasingCpdtsResponse> {
        self.invoke(QUERY_RELEASING_CPDTS, QueryReleasingCpdtsRequest { pagination })
            .await
    }

    /// Close the gRPC channel and end every live subscription. Later calls,
    /// including a second `stop`, fail with `Unavailable`.
    pub fn stop(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return Err(Error::Unavailable("node already stopped".to_string()));
        }
        self.shutdown.send_replace(true);
        let channel = self
            .channel
            .lock()
            .map_err(|_| Error::Unavailable("grpc channel lock poisoned".to_string()))?
            .take();
        drop(channel);
        log::info!("node stopped");
        Ok(())
    }
}

fn parse_amount(coin: &Coin) -> Result<u128> {
    if coin.amount.is_empty() {
        return Ok(0);
    }
    coin.amount.parse::<u128>().map_err(|e| {
        Error::Encoding(format!("invalid {} amount {:?}: {e}", coin.denom, coin.amount))
    })
}
