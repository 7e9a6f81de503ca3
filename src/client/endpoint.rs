use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::account_types::{account_info_from_json, AccountInfo};
use crate::error::{Error, Result};
use crate::utils::num::{i64_from_any, u32_from_any, u64_from_any};

/// gRPC status code the auth module answers for an unknown address
const CODE_NOT_FOUND: i64 = 5;

/// Result of a simulate call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct GasInfo {
    #[serde(default, deserialize_with = "u64_from_any")]
    pub gas_wanted: u64,
    #[serde(default, deserialize_with = "u64_from_any")]
    pub gas_used: u64,
}

/// Chain answer to a broadcast, as rendered by the REST gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxResponse {
    #[serde(default, deserialize_with = "i64_from_any")]
    pub height: i64,
    #[serde(default)]
    pub txhash: String,
    #[serde(default)]
    pub codespace: String,
    #[serde(default, deserialize_with = "u32_from_any")]
    pub code: u32,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub gas_wanted: i64,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub gas_used: i64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub logs: Value,
}

impl TxResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// The three chain calls the transaction pipeline depends on
#[async_trait]
pub trait TxEndpoint: Send + Sync {
    async fn load_account(&self, address: &str) -> Result<AccountInfo>;

    /// Dry-run raw tx bytes and report gas consumption
    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasInfo>;

    /// Submit signed tx bytes in sync mode
    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<TxResponse>;
}

#[derive(Serialize)]
struct TxBytesRequest<'a> {
    tx_bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'a str>,
}

#[derive(Deserialize)]
struct SimulateResponse {
    #[serde(default)]
    gas_info: Option<GasInfo>,
}

#[derive(Deserialize)]
struct BroadcastResponse {
    tx_response: TxResponse,
}

/// REST (LCD) gateway of a chain node
#[derive(Debug, Clone)]
pub struct RestEndpoint {
    client: Client,
    base_url: String,
}

impl RestEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.client.get(self.url(path)).query(query).send().await?;
        read_json(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        read_json(response).await
    }
}

/// Non-200 becomes `Error::Http` carrying the body text
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await?;
        return Err(Error::Http { status: status.as_u16(), body });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl TxEndpoint for RestEndpoint {
    async fn load_account(&self, address: &str) -> Result<AccountInfo> {
        let path = format!("/cosmos/auth/v1beta1/accounts/{address}");
        let response = self.client.get(self.url(&path)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            if status == StatusCode::NOT_FOUND || is_not_found_body(&body) {
                return Err(Error::AccountNotFound(address.to_string()));
            }
            return Err(Error::Http { status: status.as_u16(), body });
        }

        let value: Value = serde_json::from_str(&body)?;
        let (type_url, info) = account_info_from_json(&value)?;
        log::debug!(
            "loaded account {} ({}): number={} sequence={}",
            address,
            type_url,
            info.account_number,
            info.sequence
        );
        Ok(info)
    }

    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasInfo> {
        let request = TxBytesRequest { tx_bytes: BASE64.encode(tx_bytes), mode: None };
        let response = self
            .client
            .post(self.url("/cosmos/tx/v1beta1/simulate"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            return Err(Error::Simulation { status: status.as_u16(), body });
        }

        let simulated: SimulateResponse = response.json().await?;
        simulated
            .gas_info
            .ok_or_else(|| Error::Encoding("simulate response has no gas_info".into()))
    }

    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<TxResponse> {
        let request = TxBytesRequest {
            tx_bytes: BASE64.encode(tx_bytes),
            mode: Some("BROADCAST_MODE_SYNC"),
        };
        let response: BroadcastResponse = self.post_json("/cosmos/tx/v1beta1/txs", &request).await?;
        Ok(response.tx_response)
    }
}

/// `{"code": 5, "message": "...not found..."}` as returned by the grpc gateway
fn is_not_found_body(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_i64))
        == Some(CODE_NOT_FOUND)
}
