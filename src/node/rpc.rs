//! Tendermint JSON-RPC over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::types::{
    BlockResult, BlockResults, ConsensusStateResult, GenesisChunk, GenesisDoc, GenesisResult,
    RoundStateSimple, Status, TxSearch, Validators,
};
use crate::error::{Error, Result};

/// Tendermint caps `per_page` at 100
pub const VALIDATORS_PER_PAGE: u32 = 100;

/// Sends one JSON-RPC request and returns its `result`
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

impl From<RpcErrorBody> for Error {
    fn from(e: RpcErrorBody) -> Self {
        let data = match e.data {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        };
        Error::Rpc { code: e.code, message: e.message, data }
    }
}

/// JSON-RPC client bound to one node address
pub struct HttpRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(address: &str, timeout: Duration, max_connections: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(max_connections)
            .build()?;
        Ok(Self {
            client,
            url: address.trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        let response = self.client.post(&self.url).json(&request).send().await?;

        // errors come back as 500 with a JSON-RPC body
        let status = response.status();
        let body = response.text().await?;
        let envelope: RpcEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(Error::Http { status: status.as_u16(), body });
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        envelope
            .result
            .ok_or_else(|| Error::Encoding(format!("{method}: response has neither result nor error")))
    }
}

/// Typed Tendermint calls over any transport
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
}

fn height_params(height: i64) -> Map<String, Value> {
    let mut params = Map::new();
    if height > 0 {
        params.insert("height".into(), Value::String(height.to_string()));
    }
    params
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let result = self.transport.call(method, params).await?;
        serde_json::from_value(result).map_err(|e| Error::Encoding(format!("{method}: {e}")))
    }

    pub async fn status(&self) -> Result<Status> {
        self.call("status", json!({})).await
    }

    /// Genesis document, falling back to chunked download for large genesis files
    pub async fn genesis(&self) -> Result<GenesisDoc> {
        match self.call::<GenesisResult>("genesis", json!({})).await {
            Ok(result) => Ok(result.genesis),
            Err(e) if e.wants_chunked_genesis() => {
                log::info!("genesis too large for a single response, fetching chunks");
                let bytes = self.genesis_chunked_bytes().await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn genesis_chunk(&self, chunk: u32) -> Result<GenesisChunk> {
        self.call("genesis_chunked", json!({"chunk": chunk.to_string()})).await
    }

    /// Fetch chunks 0, 1, ... in order and concatenate the decoded bytes
    pub async fn genesis_chunked_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut index = 0u32;
        loop {
            let chunk = self.genesis_chunk(index).await.map_err(|e| {
                Error::Query(format!("error while getting genesis chunk {index}: {e}"))
            })?;
            if chunk.total == 0 {
                return Err(Error::Query("genesis_chunked reported zero chunks".into()));
            }
            let data = BASE64.decode(chunk.data.as_bytes()).map_err(|e| {
                Error::Encoding(format!("error while decoding genesis chunk {index} out of {}: {e}", chunk.total))
            })?;
            bytes.extend_from_slice(&data);

            if index >= chunk.total - 1 {
                return Ok(bytes);
            }
            index += 1;
        }
    }

    pub async fn consensus_state(&self) -> Result<RoundStateSimple> {
        let result: ConsensusStateResult = self.call("consensus_state", json!({})).await?;
        Ok(result.round_state)
    }

    pub async fn block(&self, height: i64) -> Result<BlockResult> {
        self.call("block", Value::Object(height_params(height))).await
    }

    pub async fn block_results(&self, height: i64) -> Result<BlockResults> {
        self.call("block_results", Value::Object(height_params(height))).await
    }

    pub async fn validators_page(&self, height: i64, page: u32, per_page: u32) -> Result<Validators> {
        let mut params = height_params(height);
        params.insert("page".into(), Value::String(page.to_string()));
        params.insert("per_page".into(), Value::String(per_page.to_string()));
        self.call("validators", Value::Object(params)).await
    }

    /// Every validator at `height`, paging until `total` have been collected.
    /// A latest-height request pins later pages to the height page 1 reported.
    pub async fn validators(&self, height: i64) -> Result<Validators> {
        let mut all = Validators {
            block_height: height,
            ..Validators::default()
        };
        let mut pinned = height;
        let mut page = 1u32;
        loop {
            let result = self.validators_page(pinned, page, VALIDATORS_PER_PAGE).await?;
            if page == 1 && result.block_height > 0 {
                all.block_height = result.block_height;
                pinned = result.block_height;
            }
            all.total = result.total;
            let empty = result.validators.is_empty();
            all.validators.extend(result.validators);
            all.count = all.validators.len() as u64;

            if all.count >= all.total {
                break;
            }
            if empty {
                return Err(Error::Query(format!(
                    "validators page {page} was empty with {} of {} collected",
                    all.count, all.total
                )));
            }
            page += 1;
        }
        Ok(all)
    }

    pub async fn tx_search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
        order_by: &str,
    ) -> Result<TxSearch> {
        let mut params = Map::new();
        params.insert("query".into(), Value::String(query.to_string()));
        params.insert("prove".into(), Value::Bool(false));
        if let Some(page) = page {
            params.insert("page".into(), Value::String(page.to_string()));
        }
        if let Some(per_page) = per_page {
            params.insert("per_page".into(), Value::String(per_page.to_string()));
        }
        if !order_by.is_empty() {
            params.insert("order_by".into(), Value::String(order_by.to_string()));
        }
        self.call("tx_search", Value::Object(params)).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use proptest::prelude::*;

    use super::*;

    type Handler = Box<dyn Fn(&str, &Value) -> Result<Value> + Send + Sync>;

    /// Answers every call through a closure and records the calls made
    pub(crate) struct MockTransport {
        handler: Handler,
        pub calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockTransport {
        pub fn new(handler: impl Fn(&str, &Value) -> Result<Value> + Send + Sync + 'static) -> Self {
            Self { handler: Box::new(handler), calls: Mutex::new(Vec::new()) }
        }

        pub fn methods(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl RpcTransport for MockTransport {
        async fn call(&self, method: &str, params: Value) -> Result<Value> {
            self.calls.lock().unwrap().push((method.to_string(), params.clone()));
            (self.handler)(method, &params)
        }
    }

    fn too_large() -> Error {
        Error::Rpc {
            code: -32603,
            message: "Internal error".into(),
            data: "genesis response is large, please use the genesis_chunked API instead".into(),
        }
    }

    fn chunked_transport(payload: Vec<u8>, pieces: usize) -> MockTransport {
        let size = (payload.len() + pieces - 1) / pieces.max(1);
        let chunks: Vec<Vec<u8>> = payload.chunks(size.max(1)).map(<[u8]>::to_vec).collect();
        MockTransport::new(move |method, params| match method {
            "genesis" => Err(too_large()),
            "genesis_chunked" => {
                let index: usize = params["chunk"].as_str().unwrap().parse().unwrap();
                Ok(json!({
                    "chunk": index.to_string(),
                    "total": chunks.len().to_string(),
                    "data": BASE64.encode(&chunks[index]),
                }))
            }
            _ => unreachable!(),
        })
    }

    #[tokio::test]
    async fn test_genesis_falls_back_to_chunks() {
        let doc = json!({"chain_id": "glitter_12000-2", "initial_height": "1", "app_state": {"bank": {}}});
        let transport = Arc::new(chunked_transport(serde_json::to_vec(&doc).unwrap(), 3));
        let rpc = RpcClient::new(transport.clone());

        let genesis = rpc.genesis().await.unwrap();
        assert_eq!(genesis.chain_id, "glitter_12000-2");
        assert_eq!(genesis.initial_height, 1);
        assert_eq!(transport.methods(), ["genesis", "genesis_chunked", "genesis_chunked", "genesis_chunked"]);
    }

    #[tokio::test]
    async fn test_zero_chunks_is_an_error() {
        let rpc = RpcClient::new(Arc::new(MockTransport::new(|_, _| {
            Ok(json!({"chunk": "0", "total": "0", "data": ""}))
        })));
        assert!(matches!(rpc.genesis_chunked_bytes().await, Err(Error::Query(_))));
    }

    #[tokio::test]
    async fn test_failed_chunk_fails_the_fetch() {
        let rpc = RpcClient::new(Arc::new(MockTransport::new(|_, params| {
            if params["chunk"] == "1" {
                return Err(Error::Rpc { code: -1, message: "gone".into(), data: String::new() });
            }
            Ok(json!({"chunk": "0", "total": "2", "data": BASE64.encode(b"{}")}))
        })));
        assert!(rpc.genesis_chunked_bytes().await.is_err());
    }

    #[tokio::test]
    async fn test_other_genesis_errors_pass_through() {
        let rpc = RpcClient::new(Arc::new(MockTransport::new(|_, _| {
            Err(Error::Rpc { code: -32601, message: "Method not found".into(), data: String::new() })
        })));
        assert!(matches!(rpc.genesis().await, Err(Error::Rpc { code: -32601, .. })));
    }

    fn validator_transport(total: usize) -> MockTransport {
        MockTransport::new(move |_, params| {
            let page: usize = params["page"].as_str().unwrap().parse().unwrap();
            let per_page: usize = params["per_page"].as_str().unwrap().parse().unwrap();
            let start = (page - 1) * per_page;
            let end = (start + per_page).min(total);
            let vals: Vec<Value> = (start..end)
                .map(|i| json!({"address": format!("{i:040X}"), "voting_power": "1", "proposer_priority": "0"}))
                .collect();
            Ok(json!({
                "block_height": "77",
                "validators": vals,
                "count": (end - start).to_string(),
                "total": total.to_string(),
            }))
        })
    }

    #[tokio::test]
    async fn test_validators_are_paged() {
        let transport = Arc::new(validator_transport(250));
        let rpc = RpcClient::new(transport.clone());
        let vals = rpc.validators(77).await.unwrap();
        assert_eq!(vals.validators.len(), 250);
        assert_eq!(vals.count, 250);
        assert_eq!(transport.methods().len(), 3);

        let params = &transport.calls.lock().unwrap()[0].1;
        assert_eq!(params["height"], "77");
        assert_eq!(params["per_page"], "100");
    }

    #[tokio::test]
    async fn test_latest_validators_pin_later_pages() {
        // the set shifts by one validator after every request unless a height is given
        let requests = Arc::new(AtomicU64::new(0));
        let seen = requests.clone();
        let transport = Arc::new(MockTransport::new(move |_, params| {
            let shift = if params.get("height").is_some() {
                0
            } else {
                seen.fetch_add(1, Ordering::SeqCst) as usize
            };
            let page: usize = params["page"].as_str().unwrap().parse().unwrap();
            let start = (page - 1) * 100 + shift;
            let end = (start + 100).min(150 + shift);
            let vals: Vec<Value> = (start..end)
                .map(|i| json!({"address": format!("{i:040X}"), "voting_power": "1", "proposer_priority": "0"}))
                .collect();
            Ok(json!({
                "block_height": "500",
                "validators": vals,
                "count": (end - start).to_string(),
                "total": "150",
            }))
        }));
        let rpc = RpcClient::new(transport.clone());

        let vals = rpc.validators(0).await.unwrap();
        assert_eq!(vals.block_height, 500);
        assert_eq!(vals.count, 150);
        let mut addrs: Vec<_> = vals.validators.iter().map(|v| v.address.clone()).collect();
        addrs.sort();
        addrs.dedup();
        assert_eq!(addrs.len(), 150);

        let calls = transport.calls.lock().unwrap();
        assert!(calls[0].1.get("height").is_none());
        assert_eq!(calls[1].1["height"], "500");
    }

    #[tokio::test]
    async fn test_validator_count_follows_received_entries() {
        // a node that overstates `count` must not end paging early
        let transport = Arc::new(MockTransport::new(|_, params| {
            let page: usize = params["page"].as_str().unwrap().parse().unwrap();
            let start = (page - 1) * 100;
            let end = (start + 100).min(120);
            let vals: Vec<Value> = (start..end)
                .map(|i| json!({"address": format!("{i:040X}"), "voting_power": "1", "proposer_priority": "0"}))
                .collect();
            Ok(json!({"block_height": "9", "validators": vals, "count": "120", "total": "120"}))
        }));
        let rpc = RpcClient::new(transport.clone());
        let vals = rpc.validators(9).await.unwrap();
        assert_eq!(vals.validators.len(), 120);
        assert_eq!(vals.count, 120);
        assert_eq!(transport.methods().len(), 2);
    }

    #[tokio::test]
    async fn test_short_validator_page_is_an_error() {
        let rpc = RpcClient::new(Arc::new(MockTransport::new(|_, _| {
            Ok(json!({"validators": [], "count": "0", "total": "5"}))
        })));
        assert!(matches!(rpc.validators(1).await, Err(Error::Query(_))));
    }

    #[tokio::test]
    async fn test_tx_search_params() {
        let transport = Arc::new(MockTransport::new(|_, _| Ok(json!({"txs": [], "total_count": "0"}))));
        let rpc = RpcClient::new(transport.clone());
        rpc.tx_search("tx.height=5", Some(1), Some(30), "desc").await.unwrap();
        let params = &transport.calls.lock().unwrap()[0].1;
        assert_eq!(params["prove"], false);
        assert_eq!(params["page"], "1");
        assert_eq!(params["order_by"], "desc");
    }

    #[test]
    fn test_rpc_error_conversion() {
        let body: RpcEnvelope = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32603,"message":"Internal error","data":"use the genesis_chunked API instead"}}"#,
        )
        .unwrap();
        let err: Error = body.error.unwrap().into();
        assert!(err.wants_chunked_genesis());
    }

    proptest! {
        #[test]
        fn prop_chunk_reassembly(payload in proptest::collection::vec(any::<u8>(), 1..2048), pieces in 1usize..12) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let rpc = RpcClient::new(Arc::new(chunked_transport(payload.clone(), pieces)));
            let bytes = rt.block_on(rpc.genesis_chunked_bytes()).unwrap();
            prop_assert_eq!(bytes, payload);
        }

        #[test]
        fn prop_validator_pagination(total in 1usize..450) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let rpc = RpcClient::new(Arc::new(validator_transport(total)));
            let vals = rt.block_on(rpc.validators(1)).unwrap();
            let mut addrs: Vec<_> = vals.validators.iter().map(|v| v.address.clone()).collect();
            prop_assert_eq!(addrs.len(), total);
            addrs.dedup();
            prop_assert_eq!(addrs.len(), total);
        }
    }
}
