use serde::Deserialize;
use serde_json::Value;

use super::GatewayClient;
use crate::error::Result;
use crate::node::{BlockResult, Status, TxSearch};
use crate::utils::num::{i64_from_any, u64_from_any};

const URL_CHAIN_STATUS: &str = "/v1/chain/status";
const URL_CHAIN_TX_SEARCH: &str = "/v1/chain/tx_search";
const URL_CHAIN_BLOCK_SEARCH: &str = "/v1/chain/block_search";
const URL_CHAIN_BLOCK: &str = "/v1/chain/block";
const URL_CHAIN_NET_INFO: &str = "/v1/chain/net_info";
const URL_CHAIN_BLOCKCHAIN: &str = "/v1/chain/blockchain";
const URL_CHAIN_HEALTH: &str = "/v1/chain/health";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlockSearch {
    #[serde(default)]
    pub blocks: Vec<BlockResult>,
    #[serde(default, deserialize_with = "u64_from_any")]
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlockchainInfo {
    #[serde(default, deserialize_with = "i64_from_any")]
    pub last_height: i64,
    #[serde(default)]
    pub block_metas: Vec<Value>,
}

fn paging(params: &mut Vec<(&'static str, String)>, page: Option<u32>, per_page: Option<u32>) {
    if let Some(page) = page {
        params.push(("page", page.to_string()));
    }
    if let Some(per_page) = per_page {
        params.push(("per_page", per_page.to_string()));
    }
}

/// Chain reads proxied by the gateway
pub struct Chain<'a> {
    client: &'a GatewayClient,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(client: &'a GatewayClient) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> Result<Status> {
        self.client.get_chain(URL_CHAIN_STATUS, &[]).await
    }

    pub async fn tx_search(
        &self,
        query: &str,
        prove: bool,
        page: Option<u32>,
        per_page: Option<u32>,
        order_by: &str,
    ) -> Result<TxSearch> {
        let mut params = vec![
            ("query", query.to_string()),
            ("prove", prove.to_string()),
            ("order_by", order_by.to_string()),
        ];
        paging(&mut params, page, per_page);
        self.client.get_chain(URL_CHAIN_TX_SEARCH, &params).await
    }

    /// Blocks matched by their begin/end block events
    pub async fn block_search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
        order_by: &str,
    ) -> Result<BlockSearch> {
        let mut params = vec![("query", query.to_string()), ("order_by", order_by.to_string())];
        paging(&mut params, page, per_page);
        self.client.get_chain(URL_CHAIN_BLOCK_SEARCH, &params).await
    }

    /// `None` asks for the latest block
    pub async fn block(&self, height: Option<i64>) -> Result<BlockResult> {
        let params: Vec<_> = height.map(|h| ("height", h.to_string())).into_iter().collect();
        self.client.get_chain(URL_CHAIN_BLOCK, &params).await
    }

    /// Empty on success
    pub async fn health(&self) -> Result<Value> {
        self.client.get_chain(URL_CHAIN_HEALTH, &[]).await
    }

    pub async fn net_info(&self) -> Result<Value> {
        self.client.get_chain(URL_CHAIN_NET_INFO, &[]).await
    }

    pub async fn blockchain_info(&self, min_height: i64, max_height: i64) -> Result<BlockchainInfo> {
        let params = [
            ("minHeight", min_height.to_string()),
            ("maxHeight", max_height.to_string()),
        ];
        self.client.get_chain(URL_CHAIN_BLOCKCHAIN, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gateway::tests::{client_for, serve};

    #[tokio::test]
    async fn test_tx_search_query_params() {
        let (addr, mut requests) =
            serve(r#"{"jsonrpc":"2.0","id":-1,"result":{"txs":[],"total_count":"0"}}"#).await;
        let client = client_for(&addr);
        let found = client
            .chain()
            .tx_search("tx.height=5", false, Some(1), Some(30), "desc")
            .await
            .unwrap();
        assert_eq!(found.total_count, 0);

        let line = requests.recv().await.unwrap().request_line().to_string();
        assert!(line.starts_with("GET /v1/chain/tx_search?"));
        assert!(line.contains("prove=false"));
        assert!(line.contains("order_by=desc"));
        assert!(line.contains("page=1"));
        assert!(line.contains("per_page=30"));
    }

    #[tokio::test]
    async fn test_block_error_envelope() {
        let (addr, _requests) = serve(
            r#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32603,"message":"Internal error","data":"height 99 must be less than or equal to the current blockchain height 5"}}"#,
        )
        .await;
        let client = client_for(&addr);
        let err = client.chain().block(Some(99)).await.unwrap_err();
        assert!(matches!(err, Error::Rpc { ref data, .. } if data.contains("current blockchain height")));
    }

    #[tokio::test]
    async fn test_health_is_empty_object() {
        let (addr, _requests) = serve(r#"{"jsonrpc":"2.0","id":-1,"result":{}}"#).await;
        let client = client_for(&addr);
        assert_eq!(client.chain().health().await.unwrap(), serde_json::json!({}));
    }
}
